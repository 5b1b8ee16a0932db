mod inmemory;
mod postgres;

use chrono::NaiveDate;
pub use inmemory::InMemoryBillingSubscriptionRepo;
use kinobot_domain::{BillingSubscription, ID};
pub use postgres::PostgresBillingSubscriptionRepo;

#[async_trait::async_trait]
pub trait IBillingSubscriptionRepo: Send + Sync {
    async fn insert(&self, subscription: &BillingSubscription) -> anyhow::Result<()>;
    async fn save(&self, subscription: &BillingSubscription) -> anyhow::Result<()>;
    async fn find(&self, subscription_id: &ID) -> Option<BillingSubscription>;
    /// Active subscriptions whose next payment date is exactly `date`
    async fn find_active_due_on(&self, date: NaiveDate) -> Vec<BillingSubscription>;
}
