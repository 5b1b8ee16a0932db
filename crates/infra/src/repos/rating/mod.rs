mod inmemory;
mod postgres;

pub use inmemory::InMemoryRatingRepo;
use kinobot_domain::ChatId;
pub use postgres::PostgresRatingRepo;

/// Read-only view of the rating table owned by the statistics layer.
/// The vote lifecycle only needs to know whether anyone rated a film:
/// a recorded rating is proof of retained interest and keeps the plan
/// out of the weekly retention vote.
#[async_trait::async_trait]
pub trait IRatingRepo: Send + Sync {
    async fn count_for_film(&self, chat_id: ChatId, film_id: i64) -> anyhow::Result<i64>;
}
