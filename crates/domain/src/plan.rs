use crate::shared::entity::{ChatId, Entity, UserId, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchKind {
    Home,
    Cinema,
}

impl WatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Cinema => "cinema",
        }
    }
}

impl std::str::FromStr for WatchKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "cinema" => Ok(Self::Cinema),
            _ => Err(anyhow::anyhow!("Unknown watch kind: {}", s)),
        }
    }
}

/// The reminders that can be produced for a single `Plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// The reminder on the day of the planned viewing, at the
    /// hour/minute given by the chat's `ReminderPolicy`.
    DayOf,
    /// The reminder some minutes before a cinema viewing for which a
    /// ticket has been purchased.
    Ticket,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayOf => "day_of",
            Self::Ticket => "ticket",
        }
    }
}

/// A user's scheduled intent to watch a film, at home or in a cinema,
/// at a specific instant.
///
/// `trigger_at` is stored as UTC epoch millis. The two sent-flags are
/// the durable source of truth for reminder delivery: the in-memory job
/// queue can be lost at any time and rebuilt from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: ID,
    pub chat_id: ChatId,
    pub film_id: i64,
    pub film_title: String,
    pub kind: WatchKind,
    /// UTC timestamp in millis of the planned viewing
    pub trigger_at: i64,
    pub user_id: UserId,
    /// Reference to a purchased ticket, if any
    pub ticket_ref: Option<String>,
    pub notification_sent: bool,
    pub ticket_notification_sent: bool,
}

impl Plan {
    pub fn new(
        chat_id: ChatId,
        film_id: i64,
        film_title: String,
        kind: WatchKind,
        trigger_at: i64,
        user_id: UserId,
    ) -> Self {
        Self {
            id: Default::default(),
            chat_id,
            film_id,
            film_title,
            kind,
            trigger_at,
            user_id,
            ticket_ref: None,
            notification_sent: false,
            ticket_notification_sent: false,
        }
    }

    pub fn reminder_sent(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::DayOf => self.notification_sent,
            ReminderKind::Ticket => self.ticket_notification_sent,
        }
    }

    pub fn mark_reminder_sent(&mut self, kind: ReminderKind) {
        match kind {
            ReminderKind::DayOf => self.notification_sent = true,
            ReminderKind::Ticket => self.ticket_notification_sent = true,
        }
    }
}

impl Entity for Plan {
    fn id(&self) -> &ID {
        &self.id
    }
}
