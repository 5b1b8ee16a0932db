use chrono::Utc;
use kinobot_domain::{
    CronSpec, IJobScheduler, JobExecutor, JobPayload, JobSchedule, ScheduledJob,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

struct SchedulerInner {
    jobs: Mutex<HashMap<String, ScheduledJob>>,
    executor: OnceLock<JobExecutor>,
}

/// Job queue backed by one tokio task per job.
///
/// Deliberately ephemeral: it starts empty on boot and is rebuilt from
/// the persistent store by the catch-up sweep, so nothing here ever
/// needs to survive a crash. One-shot jobs deregister themselves right
/// before firing, which lets a firing handler schedule a follow-up
/// under the same id family.
pub struct TokioJobScheduler {
    inner: Arc<SchedulerInner>,
}

impl TokioJobScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                jobs: Mutex::new(HashMap::new()),
                executor: OnceLock::new(),
            }),
        }
    }

    /// Installs the handler fired jobs are dispatched through. The
    /// scheduler is created before the context it dispatches into, so
    /// the executor arrives late; jobs firing before that are dropped
    /// with a warning.
    pub fn set_executor(&self, executor: JobExecutor) {
        if self.inner.executor.set(executor).is_err() {
            warn!("Job executor was already installed, ignoring the new one");
        }
    }

    fn register(&self, job: ScheduledJob) {
        {
            let mut jobs = self.inner.jobs.lock().unwrap();
            if jobs.contains_key(&job.id) {
                debug!("Job {} is already scheduled, skipping", job.id);
                return;
            }
            jobs.insert(job.id.clone(), job.clone());
        }
        let inner = self.inner.clone();
        tokio::spawn(run_job(inner, job));
    }
}

impl Default for TokioJobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_job(inner: Arc<SchedulerInner>, job: ScheduledJob) {
    match job.schedule.clone() {
        JobSchedule::Once { at } => {
            let now = Utc::now().timestamp_millis();
            let delay = (at - now).max(0) as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            inner.jobs.lock().unwrap().remove(&job.id);
            fire(&inner, job).await;
        }
        JobSchedule::Interval { every } => {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately, so interval jobs
            // also run once right after boot
            loop {
                ticker.tick().await;
                fire(&inner, job.clone()).await;
            }
        }
        JobSchedule::Cron(spec) => loop {
            let now = Utc::now().timestamp_millis();
            let next = spec.next_occurrence_after(now);
            tokio::time::sleep(Duration::from_millis((next - now) as u64)).await;
            fire(&inner, job.clone()).await;
        },
    }
}

async fn fire(inner: &SchedulerInner, job: ScheduledJob) {
    match inner.executor.get() {
        Some(executor) => executor(job).await,
        None => warn!("No job executor installed, dropping fire of job {}", job.id),
    }
}

impl IJobScheduler for TokioJobScheduler {
    fn schedule_once(&self, id: String, at: i64, payload: JobPayload) {
        self.register(ScheduledJob {
            id,
            schedule: JobSchedule::Once { at },
            payload,
        });
    }

    fn schedule_interval(&self, id: String, every: Duration, payload: JobPayload) {
        self.register(ScheduledJob {
            id,
            schedule: JobSchedule::Interval { every },
            payload,
        });
    }

    fn schedule_cron(&self, id: String, spec: CronSpec, payload: JobPayload) {
        self.register(ScheduledJob {
            id,
            schedule: JobSchedule::Cron(spec),
            payload,
        });
    }

    fn exists(&self, id: &str) -> bool {
        self.inner.jobs.lock().unwrap().contains_key(id)
    }

    fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.inner.jobs.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }
}
