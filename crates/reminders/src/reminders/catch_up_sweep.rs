use crate::reminders::ensure_scheduled::EnsureRemindersScheduledUseCase;
use crate::shared::usecase::{execute, UseCase};
use kinobot_infra::KinobotContext;
use tracing::{debug, warn};

/// The reconciler: rebuilds the near-term reminder schedule from the
/// persistent store.
///
/// Runs every few minutes and once right after boot, which is the whole
/// crash-recovery story: the in-memory job queue can be lost at any
/// time, and every reminder whose trigger falls inside the sweep window
/// reappears here. Per-plan failures are logged and never abort the
/// sweep.
#[derive(Debug)]
pub struct CatchUpSweepUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for CatchUpSweepUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "CatchUpSweep";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<usize, UseCaseError> {
        let now = ctx.sys.get_timestamp_millis();
        // The stored viewing instant can precede its derived day-of
        // trigger (morning viewing, evening reminder hour), so the
        // selection reaches a full day back; ensure_scheduled
        // re-derives the per-kind triggers and drops the stale ones
        let from = now - ctx.config.lookahead_hours * 60 * 60 * 1000;
        let to = now + ctx.config.lookahead_hours * 60 * 60 * 1000;

        let plans = ctx.repos.plans.find_by_trigger_between(from, to).await;
        let examined = plans.len();
        debug!("Catch-up sweep examining {} plans", examined);

        for plan in plans {
            if plan.notification_sent && plan.ticket_notification_sent {
                continue;
            }
            if let Err(e) = execute(
                EnsureRemindersScheduledUseCase {
                    plan_id: plan.id.clone(),
                },
                ctx,
            )
            .await
            {
                warn!("Catch-up sweep skipping plan {}: {:?}", plan.id, e);
            }
        }

        Ok(examined)
    }
}
