use crate::shared::usecase::UseCase;
use kinobot_domain::{ChatId, ReminderPolicy, TICKET_LEAD_SUPPRESSED};
use kinobot_infra::KinobotContext;

/// Updates a chat's reminder-time settings. Every field is optional;
/// unset fields keep their current (or default) value. The policy row
/// is created lazily on first change.
///
/// Changing a policy never touches already-scheduled jobs: a stale job
/// fires, finds the sent-flag unset and the trigger recomputed
/// elsewhere, and the catch-up sweep schedules the reminder at its new
/// instant.
#[derive(Debug)]
pub struct SetReminderPolicyUseCase {
    pub chat_id: ChatId,
    pub timezone: Option<String>,
    pub weekday_time: Option<(u32, u32)>,
    pub weekend_time: Option<(u32, u32)>,
    pub separate_weekends: Option<bool>,
    pub ticket_lead_minutes: Option<i64>,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidTimezone(String),
    InvalidTime(u32, u32),
    InvalidTicketLead(i64),
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for SetReminderPolicyUseCase {
    type Response = ReminderPolicy;
    type Error = UseCaseError;

    const NAME: &'static str = "SetReminderPolicy";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<ReminderPolicy, UseCaseError> {
        let mut policy = ctx
            .repos
            .reminder_policies
            .find(self.chat_id)
            .await
            .unwrap_or_else(|| ReminderPolicy::new(self.chat_id));

        if let Some(timezone) = &self.timezone {
            if !policy.set_timezone(timezone) {
                return Err(UseCaseError::InvalidTimezone(timezone.clone()));
            }
        }
        if let Some((hour, minute)) = self.weekday_time {
            if !policy.set_weekday_time(hour, minute) {
                return Err(UseCaseError::InvalidTime(hour, minute));
            }
        }
        if let Some((hour, minute)) = self.weekend_time {
            if !policy.set_weekend_time(hour, minute) {
                return Err(UseCaseError::InvalidTime(hour, minute));
            }
        }
        if let Some(separate) = self.separate_weekends {
            policy.separate_weekends = separate;
        }
        if let Some(lead) = self.ticket_lead_minutes {
            if lead < TICKET_LEAD_SUPPRESSED {
                return Err(UseCaseError::InvalidTicketLead(lead));
            }
            policy.ticket_lead_minutes = lead;
        }

        ctx.repos
            .reminder_policies
            .upsert(&policy)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        Ok(policy)
    }
}
