use crate::reminders::send_reminder::SendPlanReminderUseCase;
use crate::shared::usecase::{execute, UseCase};
use kinobot_domain::{
    plan_reminder_job_id, JobPayload, Plan, ReminderKind, ReminderPolicy, WatchKind, ID,
};
use kinobot_infra::KinobotContext;
use tracing::warn;

/// Projects a plan's pending reminders onto the job queue.
///
/// Idempotent by construction: job ids are pure functions of the
/// reminder identity and the scheduler ignores known ids, so the UI
/// layer and the catch-up sweep may both call this at any time without
/// producing duplicate jobs.
///
/// Triggers already in the past are delivered right away when still
/// inside the late-send grace window, and dropped otherwise: a
/// reminder hours late is worse than none.
#[derive(Debug)]
pub struct EnsureRemindersScheduledUseCase {
    pub plan_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    PlanNotFound(ID),
}

#[async_trait::async_trait]
impl UseCase for EnsureRemindersScheduledUseCase {
    type Response = ();
    type Error = UseCaseError;

    const NAME: &'static str = "EnsureRemindersScheduled";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<(), UseCaseError> {
        let plan = ctx
            .repos
            .plans
            .find(&self.plan_id)
            .await
            .ok_or_else(|| UseCaseError::PlanNotFound(self.plan_id.clone()))?;
        let policy = ctx
            .repos
            .reminder_policies
            .find(plan.chat_id)
            .await
            .unwrap_or_else(|| ReminderPolicy::new(plan.chat_id));

        let now = ctx.sys.get_timestamp_millis();
        let grace = ctx.config.late_send_grace_minutes * 60 * 1000;

        for kind in [ReminderKind::DayOf, ReminderKind::Ticket] {
            if plan.reminder_sent(kind) {
                continue;
            }
            let Some(trigger) = reminder_trigger(&plan, &policy, kind) else {
                // Ticket triggers resolve to None for the sentinels;
                // a missing day-of trigger means a DST gap swallowed
                // the configured local time
                if matches!(kind, ReminderKind::DayOf) {
                    warn!(
                        "Day-of time does not exist on plan {}'s date in {}, skipping",
                        plan.id, policy.timezone
                    );
                }
                continue;
            };

            if trigger > now {
                let job_id = plan_reminder_job_id(kind, plan.chat_id, &plan.id, trigger);
                if !ctx.scheduler.exists(&job_id) {
                    ctx.scheduler.schedule_once(
                        job_id,
                        trigger,
                        JobPayload::PlanReminder {
                            plan_id: plan.id.clone(),
                            kind,
                        },
                    );
                }
            } else if now - trigger <= grace {
                // Missed while nothing was scheduled (downtime, late
                // policy change); deliver late rather than never
                let _ = execute(
                    SendPlanReminderUseCase {
                        plan_id: plan.id.clone(),
                        kind,
                    },
                    ctx,
                )
                .await;
            } else {
                warn!(
                    "Dropping {} reminder for plan {}: {} min past its trigger",
                    kind.as_str(),
                    plan.id,
                    (now - trigger) / 60_000
                );
            }
        }

        Ok(())
    }
}

fn reminder_trigger(plan: &Plan, policy: &ReminderPolicy, kind: ReminderKind) -> Option<i64> {
    match kind {
        ReminderKind::DayOf => policy.day_of_trigger(plan.trigger_at),
        ReminderKind::Ticket => {
            if plan.kind != WatchKind::Cinema || plan.ticket_ref.is_none() {
                return None;
            }
            policy.ticket_trigger(plan.trigger_at)
        }
    }
}
