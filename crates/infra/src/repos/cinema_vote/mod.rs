mod inmemory;
mod postgres;

pub use inmemory::InMemoryCinemaVoteRepo;
use kinobot_domain::{ChatId, CinemaVote};
pub use postgres::PostgresCinemaVoteRepo;

#[async_trait::async_trait]
pub trait ICinemaVoteRepo: Send + Sync {
    async fn insert(&self, vote: &CinemaVote) -> anyhow::Result<()>;
    async fn save(&self, vote: &CinemaVote) -> anyhow::Result<()>;
    async fn find(&self, chat_id: ChatId, film_id: i64) -> Option<CinemaVote>;
    /// Votes whose deadline is at or before `before`
    async fn find_past_deadline(&self, before: i64) -> Vec<CinemaVote>;
    async fn delete(&self, chat_id: ChatId, film_id: i64) -> Option<CinemaVote>;
}
