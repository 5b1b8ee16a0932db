use super::IReminderPolicyRepo;
use chrono_tz::UTC;
use kinobot_domain::{ChatId, ReminderPolicy};
use sqlx::{FromRow, PgPool};

pub struct PostgresReminderPolicyRepo {
    pool: PgPool,
}

impl PostgresReminderPolicyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderPolicyRaw {
    chat_id: i64,
    timezone: String,
    weekday_hour: i32,
    weekday_minute: i32,
    weekend_hour: i32,
    weekend_minute: i32,
    separate_weekends: bool,
    ticket_lead_minutes: i64,
}

impl From<ReminderPolicyRaw> for ReminderPolicy {
    fn from(raw: ReminderPolicyRaw) -> Self {
        Self {
            chat_id: ChatId(raw.chat_id),
            timezone: raw.timezone.parse().unwrap_or(UTC),
            weekday_hour: raw.weekday_hour as u32,
            weekday_minute: raw.weekday_minute as u32,
            weekend_hour: raw.weekend_hour as u32,
            weekend_minute: raw.weekend_minute as u32,
            separate_weekends: raw.separate_weekends,
            ticket_lead_minutes: raw.ticket_lead_minutes,
        }
    }
}

#[async_trait::async_trait]
impl IReminderPolicyRepo for PostgresReminderPolicyRepo {
    async fn upsert(&self, policy: &ReminderPolicy) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminder_policies
            (chat_id, timezone, weekday_hour, weekday_minute, weekend_hour, weekend_minute, separate_weekends, ticket_lead_minutes)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (chat_id) DO UPDATE SET
                timezone = $2,
                weekday_hour = $3,
                weekday_minute = $4,
                weekend_hour = $5,
                weekend_minute = $6,
                separate_weekends = $7,
                ticket_lead_minutes = $8
            "#,
        )
        .bind(policy.chat_id.0)
        .bind(policy.timezone.name())
        .bind(policy.weekday_hour as i32)
        .bind(policy.weekday_minute as i32)
        .bind(policy.weekend_hour as i32)
        .bind(policy.weekend_minute as i32)
        .bind(policy.separate_weekends)
        .bind(policy.ticket_lead_minutes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, chat_id: ChatId) -> Option<ReminderPolicy> {
        sqlx::query_as::<_, ReminderPolicyRaw>(
            r#"
            SELECT * FROM reminder_policies
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id.0)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|policy| policy.into())
    }
}
