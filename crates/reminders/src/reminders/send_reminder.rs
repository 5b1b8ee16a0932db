use crate::shared::usecase::UseCase;
use kinobot_domain::{Plan, ReminderKind, ReminderPolicy, WatchKind, ID, TICKET_LEAD_BUNDLED};
use kinobot_infra::{KinobotContext, Recipient};

/// Delivers one plan reminder, gated on the durable sent-flag.
///
/// The flag is re-checked under the store lock right before sending, so
/// a reminder already delivered (or whose plan was deleted) degrades
/// into a no-op. Jobs are never revoked; they just find nothing to do.
#[derive(Debug)]
pub struct SendPlanReminderUseCase {
    pub plan_id: ID,
    pub kind: ReminderKind,
}

#[derive(Debug)]
pub enum UseCaseError {
    PlanNotFound(ID),
    DeliveryFailed(String),
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for SendPlanReminderUseCase {
    type Response = ();
    type Error = UseCaseError;

    const NAME: &'static str = "SendPlanReminder";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<(), UseCaseError> {
        let _guard = ctx.store_lock.lock().await;

        let plan = ctx
            .repos
            .plans
            .find(&self.plan_id)
            .await
            .ok_or_else(|| UseCaseError::PlanNotFound(self.plan_id.clone()))?;
        if plan.reminder_sent(self.kind) {
            return Ok(());
        }

        let policy = ctx
            .repos
            .reminder_policies
            .find(plan.chat_id)
            .await
            .unwrap_or_else(|| ReminderPolicy::new(plan.chat_id));

        let text = reminder_text(&plan, &policy, self.kind);
        ctx.notifier
            .send(Recipient::Chat(plan.chat_id), &text)
            .await
            .map_err(|e| UseCaseError::DeliveryFailed(e.to_string()))?;

        // Flag write after the send: a crash in between means a
        // possible duplicate, never a lost reminder
        let mut plan = plan;
        plan.mark_reminder_sent(self.kind);
        ctx.repos
            .plans
            .save(&plan)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        Ok(())
    }
}

fn reminder_text(plan: &Plan, policy: &ReminderPolicy, kind: ReminderKind) -> String {
    match kind {
        ReminderKind::DayOf => {
            let mut text = match plan.kind {
                WatchKind::Cinema => {
                    format!("Movie night today: {} at the cinema!", plan.film_title)
                }
                WatchKind::Home => format!("Movie night today: {}!", plan.film_title),
            };
            if policy.ticket_lead_minutes == TICKET_LEAD_BUNDLED {
                if let Some(ticket_ref) = &plan.ticket_ref {
                    text.push_str(&format!(" Your ticket: {}.", ticket_ref));
                }
            }
            text
        }
        ReminderKind::Ticket => match &plan.ticket_ref {
            Some(ticket_ref) => format!(
                "Showtime soon for {}. Your ticket: {}.",
                plan.film_title, ticket_ref
            ),
            None => format!("Showtime soon for {}.", plan.film_title),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{millis, setup_at};
    use crate::shared::usecase::execute;
    use kinobot_domain::{ChatId, Plan, UserId};

    fn plan(trigger_at: i64) -> Plan {
        Plan::new(
            ChatId(10),
            42,
            "Alien".into(),
            WatchKind::Home,
            trigger_at,
            UserId(1),
        )
    }

    #[tokio::test]
    async fn it_sends_and_marks_the_flag() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let plan = plan(millis("2021-02-24T20:00:00Z"));
        app.ctx.repos.plans.insert(&plan).await.unwrap();

        let res = execute(
            SendPlanReminderUseCase {
                plan_id: plan.id.clone(),
                kind: ReminderKind::DayOf,
            },
            &app.ctx,
        )
        .await;
        assert!(res.is_ok());

        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, Recipient::Chat(ChatId(10)));
        assert!(sent[0].text.contains("Alien"));

        let stored = app.ctx.repos.plans.find(&plan.id).await.unwrap();
        assert!(stored.notification_sent);
    }

    #[tokio::test]
    async fn an_already_sent_reminder_is_a_noop() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let mut plan = plan(millis("2021-02-24T20:00:00Z"));
        plan.notification_sent = true;
        app.ctx.repos.plans.insert(&plan).await.unwrap();

        let res = execute(
            SendPlanReminderUseCase {
                plan_id: plan.id.clone(),
                kind: ReminderKind::DayOf,
            },
            &app.ctx,
        )
        .await;

        assert!(res.is_ok());
        assert!(app.notifier.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn a_failed_delivery_leaves_the_flag_unset() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let plan = plan(millis("2021-02-24T20:00:00Z"));
        app.ctx.repos.plans.insert(&plan).await.unwrap();
        app.notifier.set_failing(true);

        let res = execute(
            SendPlanReminderUseCase {
                plan_id: plan.id.clone(),
                kind: ReminderKind::DayOf,
            },
            &app.ctx,
        )
        .await;

        assert!(matches!(res, Err(UseCaseError::DeliveryFailed(_))));
        let stored = app.ctx.repos.plans.find(&plan.id).await.unwrap();
        assert!(!stored.notification_sent);
    }

    #[tokio::test]
    async fn bundled_ticket_info_rides_on_the_day_of_reminder() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let mut plan = plan(millis("2021-02-24T20:00:00Z"));
        plan.kind = WatchKind::Cinema;
        plan.ticket_ref = Some("TCK-17".into());
        app.ctx.repos.plans.insert(&plan).await.unwrap();

        let mut policy = ReminderPolicy::new(ChatId(10));
        policy.ticket_lead_minutes = TICKET_LEAD_BUNDLED;
        app.ctx.repos.reminder_policies.upsert(&policy).await.unwrap();

        execute(
            SendPlanReminderUseCase {
                plan_id: plan.id.clone(),
                kind: ReminderKind::DayOf,
            },
            &app.ctx,
        )
        .await
        .unwrap();

        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("TCK-17"));
    }
}
