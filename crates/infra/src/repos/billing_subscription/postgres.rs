use super::IBillingSubscriptionRepo;
use chrono::NaiveDate;
use kinobot_domain::{BillingPeriod, BillingSubscription, UserId, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresBillingSubscriptionRepo {
    pool: PgPool,
}

impl PostgresBillingSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BillingSubscriptionRaw {
    subscription_uid: Uuid,
    payer: i64,
    price_minor: i64,
    period: String,
    next_payment_date: NaiveDate,
    payment_token: Option<String>,
    is_active: bool,
}

impl From<BillingSubscriptionRaw> for BillingSubscription {
    fn from(raw: BillingSubscriptionRaw) -> Self {
        Self {
            id: raw.subscription_uid.into(),
            payer: UserId(raw.payer),
            price_minor: raw.price_minor,
            period: match raw.period.as_str() {
                "yearly" => BillingPeriod::Yearly,
                _ => BillingPeriod::Monthly,
            },
            next_payment_date: raw.next_payment_date,
            payment_token: raw.payment_token,
            is_active: raw.is_active,
        }
    }
}

#[async_trait::async_trait]
impl IBillingSubscriptionRepo for PostgresBillingSubscriptionRepo {
    async fn insert(&self, subscription: &BillingSubscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO billing_subscriptions
            (subscription_uid, payer, price_minor, period, next_payment_date, payment_token, is_active)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(subscription.id.inner_ref())
        .bind(subscription.payer.0)
        .bind(subscription.price_minor)
        .bind(subscription.period.as_str())
        .bind(subscription.next_payment_date)
        .bind(&subscription.payment_token)
        .bind(subscription.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, subscription: &BillingSubscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE billing_subscriptions SET
                payer = $2,
                price_minor = $3,
                period = $4,
                next_payment_date = $5,
                payment_token = $6,
                is_active = $7
            WHERE subscription_uid = $1
            "#,
        )
        .bind(subscription.id.inner_ref())
        .bind(subscription.payer.0)
        .bind(subscription.price_minor)
        .bind(subscription.period.as_str())
        .bind(subscription.next_payment_date)
        .bind(&subscription.payment_token)
        .bind(subscription.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, subscription_id: &ID) -> Option<BillingSubscription> {
        sqlx::query_as::<_, BillingSubscriptionRaw>(
            r#"
            SELECT * FROM billing_subscriptions
            WHERE subscription_uid = $1
            "#,
        )
        .bind(subscription_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|subscription| subscription.into())
    }

    async fn find_active_due_on(&self, date: NaiveDate) -> Vec<BillingSubscription> {
        sqlx::query_as::<_, BillingSubscriptionRaw>(
            r#"
            SELECT * FROM billing_subscriptions
            WHERE is_active = TRUE AND next_payment_date = $1
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|subscription| subscription.into())
        .collect()
    }
}
