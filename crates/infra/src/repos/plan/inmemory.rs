use super::IPlanRepo;
use crate::repos::shared::inmemory_repo::*;
use kinobot_domain::{ChatId, Plan, WatchKind, ID};

pub struct InMemoryPlanRepo {
    plans: std::sync::Mutex<Vec<Plan>>,
}

impl InMemoryPlanRepo {
    pub fn new() -> Self {
        Self {
            plans: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPlanRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPlanRepo for InMemoryPlanRepo {
    async fn insert(&self, plan: &Plan) -> anyhow::Result<()> {
        insert(plan, &self.plans);
        Ok(())
    }

    async fn save(&self, plan: &Plan) -> anyhow::Result<()> {
        save(plan, &self.plans);
        Ok(())
    }

    async fn find(&self, plan_id: &ID) -> Option<Plan> {
        find(plan_id, &self.plans)
    }

    async fn find_by_trigger_between(&self, from: i64, to: i64) -> Vec<Plan> {
        find_by(&self.plans, |plan| {
            plan.trigger_at >= from && plan.trigger_at <= to
        })
    }

    async fn find_past_due_cinema(&self, before: i64) -> Vec<Plan> {
        find_by(&self.plans, |plan| {
            plan.kind == WatchKind::Cinema && plan.trigger_at < before
        })
    }

    async fn find_by_chat_and_film(&self, chat_id: ChatId, film_id: i64) -> Vec<Plan> {
        find_by(&self.plans, |plan| {
            plan.chat_id == chat_id && plan.film_id == film_id
        })
    }

    async fn delete(&self, plan_id: &ID) -> Option<Plan> {
        delete(plan_id, &self.plans)
    }
}
