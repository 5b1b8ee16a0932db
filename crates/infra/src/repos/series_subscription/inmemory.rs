use super::ISeriesSubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use kinobot_domain::{ChatId, SeriesSubscription, UserId};

pub struct InMemorySeriesSubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<SeriesSubscription>>,
}

impl InMemorySeriesSubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemorySeriesSubscriptionRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ISeriesSubscriptionRepo for InMemorySeriesSubscriptionRepo {
    async fn upsert(&self, subscription: &SeriesSubscription) -> anyhow::Result<()> {
        delete_by(&self.subscriptions, |s| {
            s.chat_id == subscription.chat_id
                && s.show_id == subscription.show_id
                && s.user_id == subscription.user_id
        });
        insert(subscription, &self.subscriptions);
        Ok(())
    }

    async fn find(
        &self,
        chat_id: ChatId,
        show_id: i64,
        user_id: UserId,
    ) -> Option<SeriesSubscription> {
        find_by(&self.subscriptions, |s| {
            s.chat_id == chat_id && s.show_id == show_id && s.user_id == user_id
        })
        .into_iter()
        .next()
    }

    async fn find_active_by_show(
        &self,
        chat_id: ChatId,
        show_id: i64,
    ) -> Vec<SeriesSubscription> {
        find_by(&self.subscriptions, |s| {
            s.chat_id == chat_id && s.show_id == show_id && s.subscribed
        })
    }

    async fn find_active_shows(&self) -> Vec<(ChatId, i64)> {
        let mut shows: Vec<_> = find_by(&self.subscriptions, |s| s.subscribed)
            .into_iter()
            .map(|s| (s.chat_id, s.show_id))
            .collect();
        shows.sort_by_key(|(chat_id, show_id)| (chat_id.0, *show_id));
        shows.dedup();
        shows
    }
}
