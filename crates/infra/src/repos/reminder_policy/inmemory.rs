use super::IReminderPolicyRepo;
use crate::repos::shared::inmemory_repo::*;
use kinobot_domain::{ChatId, ReminderPolicy};

pub struct InMemoryReminderPolicyRepo {
    policies: std::sync::Mutex<Vec<ReminderPolicy>>,
}

impl InMemoryReminderPolicyRepo {
    pub fn new() -> Self {
        Self {
            policies: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryReminderPolicyRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderPolicyRepo for InMemoryReminderPolicyRepo {
    async fn upsert(&self, policy: &ReminderPolicy) -> anyhow::Result<()> {
        delete_by(&self.policies, |p| p.chat_id == policy.chat_id);
        insert(policy, &self.policies);
        Ok(())
    }

    async fn find(&self, chat_id: ChatId) -> Option<ReminderPolicy> {
        find_by(&self.policies, |p| p.chat_id == chat_id)
            .into_iter()
            .next()
    }
}
