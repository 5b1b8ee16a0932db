mod billing;
mod cinema_vote;
pub mod date;
mod plan;
mod reminder_policy;
mod scheduled_job;
mod series;
mod shared;

pub use billing::{BillingPeriod, BillingSubscription};
pub use cinema_vote::CinemaVote;
pub use plan::{Plan, ReminderKind, WatchKind};
pub use reminder_policy::{
    ReminderPolicy, TICKET_LEAD_BUNDLED, TICKET_LEAD_SUPPRESSED,
};
pub use scheduled_job::{
    plan_reminder_job_id, series_check_job_id, CronSpec, IJobScheduler, JobExecutor, JobPayload,
    JobSchedule, ScheduledJob, SeriesCheckKind,
};
pub use series::{next_unreleased_episode, EpisodeInfo, SeriesSubscription};
pub use shared::entity::{ChatId, Entity, UserId, ID};
