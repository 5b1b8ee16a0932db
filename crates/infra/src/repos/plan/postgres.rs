use super::IPlanRepo;
use kinobot_domain::{ChatId, Plan, UserId, WatchKind, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresPlanRepo {
    pool: PgPool,
}

impl PostgresPlanRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PlanRaw {
    plan_uid: Uuid,
    chat_id: i64,
    film_id: i64,
    film_title: String,
    kind: String,
    trigger_at: i64,
    user_id: i64,
    ticket_ref: Option<String>,
    notification_sent: bool,
    ticket_notification_sent: bool,
}

impl From<PlanRaw> for Plan {
    fn from(raw: PlanRaw) -> Self {
        Self {
            id: raw.plan_uid.into(),
            chat_id: ChatId(raw.chat_id),
            film_id: raw.film_id,
            film_title: raw.film_title,
            kind: match raw.kind.as_str() {
                "cinema" => WatchKind::Cinema,
                _ => WatchKind::Home,
            },
            trigger_at: raw.trigger_at,
            user_id: UserId(raw.user_id),
            ticket_ref: raw.ticket_ref,
            notification_sent: raw.notification_sent,
            ticket_notification_sent: raw.ticket_notification_sent,
        }
    }
}

#[async_trait::async_trait]
impl IPlanRepo for PostgresPlanRepo {
    async fn insert(&self, plan: &Plan) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plans
            (plan_uid, chat_id, film_id, film_title, kind, trigger_at, user_id, ticket_ref, notification_sent, ticket_notification_sent)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(plan.id.inner_ref())
        .bind(plan.chat_id.0)
        .bind(plan.film_id)
        .bind(&plan.film_title)
        .bind(plan.kind.as_str())
        .bind(plan.trigger_at)
        .bind(plan.user_id.0)
        .bind(&plan.ticket_ref)
        .bind(plan.notification_sent)
        .bind(plan.ticket_notification_sent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, plan: &Plan) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE plans SET
                chat_id = $2,
                film_id = $3,
                film_title = $4,
                kind = $5,
                trigger_at = $6,
                user_id = $7,
                ticket_ref = $8,
                notification_sent = $9,
                ticket_notification_sent = $10
            WHERE plan_uid = $1
            "#,
        )
        .bind(plan.id.inner_ref())
        .bind(plan.chat_id.0)
        .bind(plan.film_id)
        .bind(&plan.film_title)
        .bind(plan.kind.as_str())
        .bind(plan.trigger_at)
        .bind(plan.user_id.0)
        .bind(&plan.ticket_ref)
        .bind(plan.notification_sent)
        .bind(plan.ticket_notification_sent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, plan_id: &ID) -> Option<Plan> {
        sqlx::query_as::<_, PlanRaw>(
            r#"
            SELECT * FROM plans
            WHERE plan_uid = $1
            "#,
        )
        .bind(plan_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|plan| plan.into())
    }

    async fn find_by_trigger_between(&self, from: i64, to: i64) -> Vec<Plan> {
        sqlx::query_as::<_, PlanRaw>(
            r#"
            SELECT * FROM plans
            WHERE trigger_at >= $1 AND trigger_at <= $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|plan| plan.into())
        .collect()
    }

    async fn find_past_due_cinema(&self, before: i64) -> Vec<Plan> {
        sqlx::query_as::<_, PlanRaw>(
            r#"
            SELECT * FROM plans
            WHERE kind = 'cinema' AND trigger_at < $1
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|plan| plan.into())
        .collect()
    }

    async fn find_by_chat_and_film(&self, chat_id: ChatId, film_id: i64) -> Vec<Plan> {
        sqlx::query_as::<_, PlanRaw>(
            r#"
            SELECT * FROM plans
            WHERE chat_id = $1 AND film_id = $2
            "#,
        )
        .bind(chat_id.0)
        .bind(film_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|plan| plan.into())
        .collect()
    }

    async fn delete(&self, plan_id: &ID) -> Option<Plan> {
        sqlx::query_as::<_, PlanRaw>(
            r#"
            DELETE FROM plans
            WHERE plan_uid = $1
            RETURNING *
            "#,
        )
        .bind(plan_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|plan| plan.into())
    }
}
