mod billing_subscription;
mod cinema_vote;
mod plan;
mod rating;
mod reminder_policy;
mod series_subscription;
mod shared;

use billing_subscription::{InMemoryBillingSubscriptionRepo, PostgresBillingSubscriptionRepo};
pub use billing_subscription::IBillingSubscriptionRepo;
use cinema_vote::{InMemoryCinemaVoteRepo, PostgresCinemaVoteRepo};
pub use cinema_vote::ICinemaVoteRepo;
use plan::{InMemoryPlanRepo, PostgresPlanRepo};
pub use plan::IPlanRepo;
pub use rating::InMemoryRatingRepo;
use rating::PostgresRatingRepo;
pub use rating::IRatingRepo;
use reminder_policy::{InMemoryReminderPolicyRepo, PostgresReminderPolicyRepo};
pub use reminder_policy::IReminderPolicyRepo;
use series_subscription::{InMemorySeriesSubscriptionRepo, PostgresSeriesSubscriptionRepo};
pub use series_subscription::ISeriesSubscriptionRepo;
pub use shared::repo::DeleteResult;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub plans: Arc<dyn IPlanRepo>,
    pub reminder_policies: Arc<dyn IReminderPolicyRepo>,
    pub cinema_votes: Arc<dyn ICinemaVoteRepo>,
    pub series_subscriptions: Arc<dyn ISeriesSubscriptionRepo>,
    pub billing_subscriptions: Arc<dyn IBillingSubscriptionRepo>,
    pub ratings: Arc<dyn IRatingRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            plans: Arc::new(PostgresPlanRepo::new(pool.clone())),
            reminder_policies: Arc::new(PostgresReminderPolicyRepo::new(pool.clone())),
            cinema_votes: Arc::new(PostgresCinemaVoteRepo::new(pool.clone())),
            series_subscriptions: Arc::new(PostgresSeriesSubscriptionRepo::new(pool.clone())),
            billing_subscriptions: Arc::new(PostgresBillingSubscriptionRepo::new(pool.clone())),
            ratings: Arc::new(PostgresRatingRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            plans: Arc::new(InMemoryPlanRepo::new()),
            reminder_policies: Arc::new(InMemoryReminderPolicyRepo::new()),
            cinema_votes: Arc::new(InMemoryCinemaVoteRepo::new()),
            series_subscriptions: Arc::new(InMemorySeriesSubscriptionRepo::new()),
            billing_subscriptions: Arc::new(InMemoryBillingSubscriptionRepo::new()),
            ratings: Arc::new(InMemoryRatingRepo::new()),
        }
    }
}
