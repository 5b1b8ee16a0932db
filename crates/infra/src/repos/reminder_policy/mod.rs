mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderPolicyRepo;
use kinobot_domain::{ChatId, ReminderPolicy};
pub use postgres::PostgresReminderPolicyRepo;

#[async_trait::async_trait]
pub trait IReminderPolicyRepo: Send + Sync {
    /// Policies are created lazily and never deleted, so writes are
    /// upsert-only
    async fn upsert(&self, policy: &ReminderPolicy) -> anyhow::Result<()>;
    async fn find(&self, chat_id: ChatId) -> Option<ReminderPolicy>;
}
