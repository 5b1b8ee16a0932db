mod billing;
mod policy;
mod reminders;
mod scheduler;
mod series;
mod shared;
mod votes;

pub use billing::{ChargeDueSubscriptionsUseCase, SendChargeNoticesUseCase};
pub use policy::SetReminderPolicyUseCase;
pub use reminders::{CatchUpSweepUseCase, EnsureRemindersScheduledUseCase, SendPlanReminderUseCase};
pub use scheduler::TokioJobScheduler;
pub use series::{
    RestartSeriesChainsUseCase, SeriesCheckUseCase, SubscribeSeriesUseCase,
    UnsubscribeSeriesUseCase,
};
pub use shared::usecase::{execute, UseCase};
pub use votes::{CastCinemaVoteUseCase, OpenCinemaVotesUseCase, ResolveCinemaVotesUseCase};

use kinobot_domain::{CronSpec, JobExecutor, JobPayload, ScheduledJob};
use kinobot_infra::KinobotContext;
use std::time::Duration;
use tracing::info;

/// The handler the scheduler dispatches every fired job through. Use
/// case errors are logged inside `execute`; a job firing is never
/// retried in place, the next natural sweep or chain link picks up
/// whatever it left undone.
pub fn job_executor(ctx: KinobotContext) -> JobExecutor {
    Box::new(move |job: ScheduledJob| {
        let ctx = ctx.clone();
        Box::pin(async move { dispatch_job(job, ctx).await })
    })
}

async fn dispatch_job(job: ScheduledJob, ctx: KinobotContext) {
    match job.payload {
        JobPayload::PlanReminder { plan_id, kind } => {
            let _ = execute(SendPlanReminderUseCase { plan_id, kind }, &ctx).await;
        }
        JobPayload::SeriesCheck {
            chat_id,
            show_id,
            kind,
        } => {
            let _ = execute(
                SeriesCheckUseCase {
                    chat_id,
                    show_id,
                    kind,
                },
                &ctx,
            )
            .await;
        }
        JobPayload::CatchUpSweep => {
            let _ = execute(CatchUpSweepUseCase, &ctx).await;
        }
        JobPayload::OpenCinemaVotes => {
            let _ = execute(OpenCinemaVotesUseCase, &ctx).await;
        }
        JobPayload::ResolveCinemaVotes => {
            let _ = execute(ResolveCinemaVotesUseCase, &ctx).await;
        }
        JobPayload::BillingCharges => {
            let _ = execute(ChargeDueSubscriptionsUseCase, &ctx).await;
        }
        JobPayload::BillingNotices => {
            let _ = execute(SendChargeNoticesUseCase, &ctx).await;
        }
    }
}

/// Registers the standing sweeps: the catch-up reconciler interval, the
/// Monday/Tuesday vote lifecycle and the two daily billing crons. The
/// interval job also fires once immediately, which is what rebuilds the
/// reminder schedule after a restart.
pub fn register_periodic_jobs(ctx: &KinobotContext) {
    use chrono::Weekday;

    ctx.scheduler.schedule_interval(
        "catch_up_sweep".into(),
        Duration::from_secs(ctx.config.catch_up_interval_secs),
        JobPayload::CatchUpSweep,
    );
    ctx.scheduler.schedule_cron(
        "cinema_vote_open".into(),
        CronSpec::weekly(Weekday::Mon, ctx.config.vote_open_hour, 0),
        JobPayload::OpenCinemaVotes,
    );
    ctx.scheduler.schedule_cron(
        "cinema_vote_resolve".into(),
        CronSpec::weekly(Weekday::Tue, ctx.config.vote_resolve_hour, 0),
        JobPayload::ResolveCinemaVotes,
    );
    ctx.scheduler.schedule_cron(
        "billing_charges".into(),
        CronSpec::daily(ctx.config.billing_charge_hour, 0),
        JobPayload::BillingCharges,
    );
    ctx.scheduler.schedule_cron(
        "billing_notices".into(),
        CronSpec::daily(ctx.config.billing_notice_hour, 0),
        JobPayload::BillingNotices,
    );

    info!("Registered the standing sweep jobs");
}
