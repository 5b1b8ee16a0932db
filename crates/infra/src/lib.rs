mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
use kinobot_domain::IJobScheduler;
pub use repos::{
    DeleteResult, IBillingSubscriptionRepo, ICinemaVoteRepo, IPlanRepo, IRatingRepo,
    IReminderPolicyRepo, ISeriesSubscriptionRepo, InMemoryRatingRepo, Repos,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tokio::sync::Mutex;

/// Everything the use cases need: repositories, external services, the
/// clock, the job scheduler handle and the process-wide store lock.
///
/// `store_lock` is the single serialization point for read-decide-write
/// sequences on durable state (sent-flags, charge advancement). It is
/// deliberately coarse: correctness depends only on this single-writer
/// discipline, not on store transactions.
#[derive(Clone)]
pub struct KinobotContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub scheduler: Arc<dyn IJobScheduler>,
    pub store_lock: Arc<Mutex<()>>,
    pub notifier: Arc<dyn INotifier>,
    pub series_metadata: Arc<dyn ISeriesMetadataService>,
    pub payments: Arc<dyn IPaymentGateway>,
}

struct ContextParams {
    pub postgres_connection_string: String,
    pub scheduler: Arc<dyn IJobScheduler>,
}

impl KinobotContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        let config = Config::new();
        let notifier = Arc::new(BotApiNotifier::new(&config)?);
        let series_metadata = Arc::new(SeriesMetadataRestApi::new(&config)?);
        let payments = Arc::new(PaymentGatewayRestApi::new(&config)?);
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            scheduler: params.scheduler,
            store_lock: Arc::new(Mutex::new(())),
            notifier,
            series_metadata,
            payments,
        })
    }

    /// Context backed entirely by inmemory repos and service doubles.
    pub fn create_inmemory(scheduler: Arc<dyn IJobScheduler>) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            scheduler,
            store_lock: Arc::new(Mutex::new(())),
            notifier: Arc::new(InMemoryNotifier::new()),
            series_metadata: Arc::new(InMemorySeriesMetadataService::new()),
            payments: Arc::new(InMemoryPaymentGateway::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context(scheduler: Arc<dyn IJobScheduler>) -> anyhow::Result<KinobotContext> {
    KinobotContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
        scheduler,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .map_err(|_| anyhow::anyhow!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let connection_string = get_psql_connection_string()
        .expect("DATABASE_URL env var to be present");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
