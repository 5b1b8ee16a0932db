mod inmemory;
mod postgres;

pub use inmemory::InMemorySeriesSubscriptionRepo;
use kinobot_domain::{ChatId, SeriesSubscription, UserId};
pub use postgres::PostgresSeriesSubscriptionRepo;

#[async_trait::async_trait]
pub trait ISeriesSubscriptionRepo: Send + Sync {
    /// Subscriptions are never deleted; (un)subscribing flips the soft
    /// flag, so writes are upsert-only
    async fn upsert(&self, subscription: &SeriesSubscription) -> anyhow::Result<()>;
    async fn find(
        &self,
        chat_id: ChatId,
        show_id: i64,
        user_id: UserId,
    ) -> Option<SeriesSubscription>;
    async fn find_active_by_show(&self, chat_id: ChatId, show_id: i64)
        -> Vec<SeriesSubscription>;
    /// Every (chat, show) pair with at least one active subscriber;
    /// the boot-time chain restore iterates these
    async fn find_active_shows(&self) -> Vec<(ChatId, i64)>;
}
