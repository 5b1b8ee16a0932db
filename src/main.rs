mod telemetry;

use kinobot_infra::{run_migration, setup_context};
use kinobot_reminders::{
    execute, job_executor, register_periodic_jobs, RestartSeriesChainsUseCase, TokioJobScheduler,
};
use std::sync::Arc;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("kinobot".into(), "info".into());
    init_subscriber(subscriber);

    run_migration().await?;

    // The scheduler exists before the context so the context can hold
    // a handle to it; the executor closing over the context is
    // installed right after
    let scheduler = Arc::new(TokioJobScheduler::new());
    let context = setup_context(scheduler.clone()).await?;
    scheduler.set_executor(job_executor(context.clone()));
    register_periodic_jobs(&context);
    let _ = execute(RestartSeriesChainsUseCase, &context).await;

    info!("kinobot reminder engine is running");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
