mod inmemory;
mod postgres;

pub use inmemory::InMemoryPlanRepo;
use kinobot_domain::{ChatId, Plan, ID};
pub use postgres::PostgresPlanRepo;

#[async_trait::async_trait]
pub trait IPlanRepo: Send + Sync {
    async fn insert(&self, plan: &Plan) -> anyhow::Result<()>;
    async fn save(&self, plan: &Plan) -> anyhow::Result<()>;
    async fn find(&self, plan_id: &ID) -> Option<Plan>;
    /// Plans with `trigger_at` inside `[from, to]`, the catch-up
    /// reconciler's window
    async fn find_by_trigger_between(&self, from: i64, to: i64) -> Vec<Plan>;
    /// Cinema plans whose viewing instant already passed
    async fn find_past_due_cinema(&self, before: i64) -> Vec<Plan>;
    async fn find_by_chat_and_film(&self, chat_id: ChatId, film_id: i64) -> Vec<Plan>;
    async fn delete(&self, plan_id: &ID) -> Option<Plan>;
}
