use crate::shared::entity::ChatId;
use chrono::prelude::*;
use chrono_tz::{Tz, UTC};

/// Sentinel for `ticket_lead_minutes`: no separate ticket reminder at all.
pub const TICKET_LEAD_SUPPRESSED: i64 = -1;
/// Sentinel for `ticket_lead_minutes`: ticket info is bundled into the
/// day-of reminder instead of getting its own job.
pub const TICKET_LEAD_BUNDLED: i64 = 0;

/// Per-chat reminder-time settings.
///
/// All reminder arithmetic happens in the chat's timezone and is
/// converted to UTC millis before it reaches the job scheduler, which
/// is timezone-naive.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderPolicy {
    pub chat_id: ChatId,
    pub timezone: Tz,
    pub weekday_hour: u32,
    pub weekday_minute: u32,
    pub weekend_hour: u32,
    pub weekend_minute: u32,
    /// When false, the weekday time applies on weekends too
    pub separate_weekends: bool,
    /// Minutes before a cinema viewing to remind about a purchased
    /// ticket. See the `TICKET_LEAD_*` sentinels.
    pub ticket_lead_minutes: i64,
}

impl ReminderPolicy {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            timezone: UTC,
            weekday_hour: 19,
            weekday_minute: 0,
            weekend_hour: 10,
            weekend_minute: 0,
            separate_weekends: false,
            ticket_lead_minutes: 120,
        }
    }

    pub fn set_timezone(&mut self, timezone: &str) -> bool {
        match timezone.parse::<Tz>() {
            Ok(tzid) => {
                self.timezone = tzid;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_weekday_time(&mut self, hour: u32, minute: u32) -> bool {
        if hour <= 23 && minute <= 59 {
            self.weekday_hour = hour;
            self.weekday_minute = minute;
            true
        } else {
            false
        }
    }

    pub fn set_weekend_time(&mut self, hour: u32, minute: u32) -> bool {
        if hour <= 23 && minute <= 59 {
            self.weekend_hour = hour;
            self.weekend_minute = minute;
            true
        } else {
            false
        }
    }

    /// The instant of the day-of reminder for a viewing planned at
    /// `trigger_at` (UTC millis): the viewing's local calendar date at
    /// the configured hour/minute, back in UTC millis.
    ///
    /// Ambiguous local times around DST transitions resolve to the
    /// earliest valid instant; nonexistent ones yield `None`.
    pub fn day_of_trigger(&self, trigger_at: i64) -> Option<i64> {
        let local = Utc
            .timestamp_millis_opt(trigger_at)
            .single()?
            .with_timezone(&self.timezone);
        let weekend = matches!(local.weekday(), Weekday::Sat | Weekday::Sun);
        let (hour, minute) = if weekend && self.separate_weekends {
            (self.weekend_hour, self.weekend_minute)
        } else {
            (self.weekday_hour, self.weekday_minute)
        };
        let fire = self
            .timezone
            .with_ymd_and_hms(local.year(), local.month(), local.day(), hour, minute, 0)
            .earliest()?;
        Some(fire.with_timezone(&Utc).timestamp_millis())
    }

    /// The instant of the separate ticket reminder, or `None` when the
    /// lead time is a sentinel (suppressed or bundled).
    pub fn ticket_trigger(&self, trigger_at: i64) -> Option<i64> {
        if self.ticket_lead_minutes <= TICKET_LEAD_BUNDLED {
            return None;
        }
        Some(trigger_at - self.ticket_lead_minutes * 60 * 1000)
    }
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
    fn weekday_plan_resolves_to_weekday_time() {
        let policy = ReminderPolicy::new(ChatId(1));
        // 2021-02-24 is a Wednesday
        let trigger = policy.day_of_trigger(millis("2021-02-24T20:30:00Z"));
        assert_eq!(trigger, Some(millis("2021-02-24T19:00:00Z")));
    }

    #[test]
    fn saturday_plan_resolves_to_weekend_time_when_split() {
        let mut policy = ReminderPolicy::new(ChatId(1));
        policy.separate_weekends = true;
        assert!(policy.set_weekend_time(9, 0));
        // 2021-02-27 is a Saturday
        let trigger = policy.day_of_trigger(millis("2021-02-27T20:30:00Z"));
        assert_eq!(trigger, Some(millis("2021-02-27T09:00:00Z")));
    }

    #[test]
    fn saturday_plan_resolves_to_weekday_time_without_split() {
        let mut policy = ReminderPolicy::new(ChatId(1));
        assert!(policy.set_weekend_time(9, 0));
        let trigger = policy.day_of_trigger(millis("2021-02-27T20:30:00Z"));
        assert_eq!(trigger, Some(millis("2021-02-27T19:00:00Z")));
    }

    #[test]
    fn day_of_trigger_uses_the_local_calendar_date() {
        let mut policy = ReminderPolicy::new(ChatId(1));
        assert!(policy.set_timezone("Europe/Moscow"));
        // 22:30 UTC on the 24th is already 01:30 on the 25th in Moscow,
        // so the reminder lands on the 25th at 19:00 Moscow time.
        let trigger = policy.day_of_trigger(millis("2021-02-24T22:30:00Z"));
        assert_eq!(trigger, Some(millis("2021-02-25T16:00:00Z")));
    }

    #[test]
    fn a_dst_gap_yields_no_day_of_trigger() {
        let mut policy = ReminderPolicy::new(ChatId(1));
        assert!(policy.set_timezone("America/New_York"));
        assert!(policy.set_weekday_time(2, 30));
        // Clocks jump from 02:00 to 03:00 on 2021-03-14 in New York
        assert_eq!(policy.day_of_trigger(millis("2021-03-14T23:00:00Z")), None);
    }

    #[test]
    fn ticket_trigger_subtracts_the_lead_time() {
        let policy = ReminderPolicy::new(ChatId(1));
        let viewing = millis("2021-02-24T20:30:00Z");
        assert_eq!(
            policy.ticket_trigger(viewing),
            Some(millis("2021-02-24T18:30:00Z"))
        );
    }

    #[test]
    fn ticket_trigger_honors_sentinels() {
        let mut policy = ReminderPolicy::new(ChatId(1));
        let viewing = millis("2021-02-24T20:30:00Z");

        policy.ticket_lead_minutes = TICKET_LEAD_SUPPRESSED;
        assert_eq!(policy.ticket_trigger(viewing), None);

        policy.ticket_lead_minutes = TICKET_LEAD_BUNDLED;
        assert_eq!(policy.ticket_trigger(viewing), None);
    }

    #[test]
    fn it_rejects_invalid_settings() {
        let mut policy = ReminderPolicy::new(ChatId(1));
        assert!(!policy.set_timezone("Europe/NotACity"));
        assert!(!policy.set_weekday_time(24, 0));
        assert!(!policy.set_weekend_time(10, 60));
        assert_eq!(policy, ReminderPolicy::new(ChatId(1)));
    }
}
