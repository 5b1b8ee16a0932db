use crate::plan::ReminderKind;
use crate::shared::entity::{ChatId, ID};
use chrono::prelude::*;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// What a fired job should do. Jobs carry no captured state beyond
/// this payload: every handler re-reads the persistent store at fire
/// time, which is what makes lost jobs rebuildable and stale jobs
/// harmless no-ops.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPayload {
    PlanReminder {
        plan_id: ID,
        kind: ReminderKind,
    },
    SeriesCheck {
        chat_id: ChatId,
        show_id: i64,
        kind: SeriesCheckKind,
    },
    CatchUpSweep,
    OpenCinemaVotes,
    ResolveCinemaVotes,
    BillingCharges,
    BillingNotices,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesCheckKind {
    /// Announce an episode known to release the day after firing
    Announce { season: u32, episode: u32 },
    /// No dated episode was known; poll the metadata service again
    Recheck,
}

impl SeriesCheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Announce { .. } => "series_announce",
            Self::Recheck => "series_recheck",
        }
    }
}

/// `"{kind}_{chat}_{plan}_{epoch_millis}"` — a pure function of the
/// reminder identity, so resubmitting the same reminder is a no-op and
/// the catch-up sweep can run concurrently with UI writes without
/// producing duplicate jobs.
pub fn plan_reminder_job_id(
    kind: ReminderKind,
    chat_id: ChatId,
    plan_id: &ID,
    fire_at: i64,
) -> String {
    format!("{}_{}_{}_{}", kind.as_str(), chat_id, plan_id, fire_at)
}

pub fn series_check_job_id(
    kind: &SeriesCheckKind,
    chat_id: ChatId,
    show_id: i64,
    fire_at: i64,
) -> String {
    format!("{}_{}_{}_{}", kind.as_str(), chat_id, show_id, fire_at)
}

/// A fixed weekly or daily wall-clock slot, evaluated in UTC. Batch
/// sweeps (vote lifecycle, billing) run on these; per-recipient
/// timezone handling stays in `ReminderPolicy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CronSpec {
    pub weekday: Option<Weekday>,
    pub hour: u32,
    pub minute: u32,
}

impl CronSpec {
    pub fn daily(hour: u32, minute: u32) -> Self {
        Self {
            weekday: None,
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    pub fn weekly(weekday: Weekday, hour: u32, minute: u32) -> Self {
        Self {
            weekday: Some(weekday),
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    /// The first matching instant strictly after `now` (UTC millis).
    pub fn next_occurrence_after(&self, now: i64) -> i64 {
        let now_dt = DateTime::from_timestamp_millis(now).unwrap_or_else(Utc::now);
        let mut candidate = now_dt
            .date_naive()
            .and_hms_opt(self.hour, self.minute, 0)
            .expect("Hour and minute are clamped to valid ranges")
            .and_utc();
        while candidate.timestamp_millis() <= now
            || self.weekday.map_or(false, |wd| candidate.weekday() != wd)
        {
            candidate += chrono::Duration::days(1);
        }
        candidate.timestamp_millis()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobSchedule {
    /// One-shot at a UTC millis instant
    Once { at: i64 },
    Interval { every: Duration },
    Cron(CronSpec),
}

/// A registered job. Ephemeral by design: the scheduler starts empty on
/// boot and the catch-up sweep rebuilds the near-term schedule from the
/// persistent store.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledJob {
    pub id: String,
    pub schedule: JobSchedule,
    pub payload: JobPayload,
}

/// Handler every fired job is dispatched through.
pub type JobExecutor =
    Box<dyn Fn(ScheduledJob) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The in-memory job queue. Implementations must treat re-scheduling an
/// existing id as a no-op; together with the deterministic job ids this
/// is what makes `ensure_scheduled` idempotent across callers.
pub trait IJobScheduler: Send + Sync {
    fn schedule_once(&self, id: String, at: i64, payload: JobPayload);
    fn schedule_interval(&self, id: String, every: Duration, payload: JobPayload);
    fn schedule_cron(&self, id: String, spec: CronSpec, payload: JobPayload);
    fn exists(&self, id: &str) -> bool;
    fn job_ids(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(datetime: &str) -> i64 {
        datetime
            .parse::<DateTime<Utc>>()
            .expect("Valid datetime")
            .timestamp_millis()
    }

    #[test]
    fn reminder_job_ids_are_deterministic() {
        let plan_id = ID::new();
        let id1 = plan_reminder_job_id(ReminderKind::DayOf, ChatId(7), &plan_id, 1000);
        let id2 = plan_reminder_job_id(ReminderKind::DayOf, ChatId(7), &plan_id, 1000);
        assert_eq!(id1, id2);
        assert_eq!(id1, format!("day_of_7_{}_1000", plan_id));

        let ticket = plan_reminder_job_id(ReminderKind::Ticket, ChatId(7), &plan_id, 1000);
        assert_ne!(id1, ticket);
    }

    #[test]
    fn daily_cron_picks_today_or_tomorrow() {
        let spec = CronSpec::daily(12, 0);
        // Wednesday 2021-02-24
        assert_eq!(
            spec.next_occurrence_after(millis("2021-02-24T09:00:00Z")),
            millis("2021-02-24T12:00:00Z")
        );
        assert_eq!(
            spec.next_occurrence_after(millis("2021-02-24T12:00:00Z")),
            millis("2021-02-25T12:00:00Z")
        );
    }

    #[test]
    fn weekly_cron_picks_the_right_weekday() {
        let spec = CronSpec::weekly(Weekday::Mon, 10, 30);
        // Wednesday 2021-02-24 -> Monday 2021-03-01
        assert_eq!(
            spec.next_occurrence_after(millis("2021-02-24T09:00:00Z")),
            millis("2021-03-01T10:30:00Z")
        );
        // Monday morning before the slot stays on the same day
        assert_eq!(
            spec.next_occurrence_after(millis("2021-03-01T09:00:00Z")),
            millis("2021-03-01T10:30:00Z")
        );
        // Monday at the slot rolls a full week
        assert_eq!(
            spec.next_occurrence_after(millis("2021-03-01T10:30:00Z")),
            millis("2021-03-08T10:30:00Z")
        );
    }

    #[test]
    fn cron_occurrences_are_strictly_future() {
        let spec = CronSpec::daily(0, 0);
        let now = millis("2021-02-24T00:00:00Z");
        assert!(spec.next_occurrence_after(now) > now);
    }
}
