use super::IRatingRepo;
use kinobot_domain::ChatId;
use sqlx::{FromRow, PgPool};

pub struct PostgresRatingRepo {
    pool: PgPool,
}

impl PostgresRatingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RatingCountRaw {
    count: i64,
}

#[async_trait::async_trait]
impl IRatingRepo for PostgresRatingRepo {
    async fn count_for_film(&self, chat_id: ChatId, film_id: i64) -> anyhow::Result<i64> {
        let raw = sqlx::query_as::<_, RatingCountRaw>(
            r#"
            SELECT COUNT(*) AS count FROM ratings
            WHERE chat_id = $1 AND film_id = $2
            "#,
        )
        .bind(chat_id.0)
        .bind(film_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(raw.count)
    }
}
