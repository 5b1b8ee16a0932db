use super::IBillingSubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::NaiveDate;
use kinobot_domain::{BillingSubscription, ID};

pub struct InMemoryBillingSubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<BillingSubscription>>,
}

impl InMemoryBillingSubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryBillingSubscriptionRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IBillingSubscriptionRepo for InMemoryBillingSubscriptionRepo {
    async fn insert(&self, subscription: &BillingSubscription) -> anyhow::Result<()> {
        insert(subscription, &self.subscriptions);
        Ok(())
    }

    async fn save(&self, subscription: &BillingSubscription) -> anyhow::Result<()> {
        save(subscription, &self.subscriptions);
        Ok(())
    }

    async fn find(&self, subscription_id: &ID) -> Option<BillingSubscription> {
        find(subscription_id, &self.subscriptions)
    }

    async fn find_active_due_on(&self, date: NaiveDate) -> Vec<BillingSubscription> {
        find_by(&self.subscriptions, |s| {
            s.is_active && s.next_payment_date == date
        })
    }
}
