use super::ISeriesSubscriptionRepo;
use kinobot_domain::{ChatId, SeriesSubscription, UserId};
use sqlx::{FromRow, PgPool};

pub struct PostgresSeriesSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSeriesSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SeriesSubscriptionRaw {
    chat_id: i64,
    show_id: i64,
    show_title: String,
    user_id: i64,
    subscribed: bool,
}

impl From<SeriesSubscriptionRaw> for SeriesSubscription {
    fn from(raw: SeriesSubscriptionRaw) -> Self {
        Self {
            chat_id: ChatId(raw.chat_id),
            show_id: raw.show_id,
            show_title: raw.show_title,
            user_id: UserId(raw.user_id),
            subscribed: raw.subscribed,
        }
    }
}

#[async_trait::async_trait]
impl ISeriesSubscriptionRepo for PostgresSeriesSubscriptionRepo {
    async fn upsert(&self, subscription: &SeriesSubscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO series_subscriptions
            (chat_id, show_id, show_title, user_id, subscribed)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (chat_id, show_id, user_id) DO UPDATE SET
                show_title = $3,
                subscribed = $5
            "#,
        )
        .bind(subscription.chat_id.0)
        .bind(subscription.show_id)
        .bind(&subscription.show_title)
        .bind(subscription.user_id.0)
        .bind(subscription.subscribed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(
        &self,
        chat_id: ChatId,
        show_id: i64,
        user_id: UserId,
    ) -> Option<SeriesSubscription> {
        sqlx::query_as::<_, SeriesSubscriptionRaw>(
            r#"
            SELECT * FROM series_subscriptions
            WHERE chat_id = $1 AND show_id = $2 AND user_id = $3
            "#,
        )
        .bind(chat_id.0)
        .bind(show_id)
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|subscription| subscription.into())
    }

    async fn find_active_by_show(
        &self,
        chat_id: ChatId,
        show_id: i64,
    ) -> Vec<SeriesSubscription> {
        sqlx::query_as::<_, SeriesSubscriptionRaw>(
            r#"
            SELECT * FROM series_subscriptions
            WHERE chat_id = $1 AND show_id = $2 AND subscribed = TRUE
            "#,
        )
        .bind(chat_id.0)
        .bind(show_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|subscription| subscription.into())
        .collect()
    }

    async fn find_active_shows(&self) -> Vec<(ChatId, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT DISTINCT chat_id, show_id FROM series_subscriptions
            WHERE subscribed = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|(chat_id, show_id)| (ChatId(chat_id), show_id))
        .collect()
    }
}
