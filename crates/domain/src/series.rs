use crate::shared::entity::{ChatId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user's interest in next-episode alerts for a show, scoped to a
/// chat. Never deleted; unsubscribing flips the soft flag and in-flight
/// jobs re-check it at fire time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSubscription {
    pub chat_id: ChatId,
    pub show_id: i64,
    /// Display name of the show, denormalized from the metadata
    /// service at subscribe time for announcement texts
    pub show_title: String,
    pub user_id: UserId,
    pub subscribed: bool,
}

impl SeriesSubscription {
    pub fn new(chat_id: ChatId, show_id: i64, show_title: String, user_id: UserId) -> Self {
        Self {
            chat_id,
            show_id,
            show_title,
            user_id,
            subscribed: true,
        }
    }
}

/// One episode as reported by the external metadata service. A missing
/// release date means the service had no date or a garbled one; such
/// episodes are treated as already released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    pub season: u32,
    pub episode: u32,
    pub release_date: Option<NaiveDate>,
}

/// Picks the episode the watcher chain should target next: the
/// earliest dated episode releasing strictly after `after`, breaking
/// date ties in (season, episode) order. `newer_than` excludes the
/// just-announced episode and everything before it, so a second
/// episode premiering on the same day still gets its own turn.
pub fn next_unreleased_episode(
    episodes: &[EpisodeInfo],
    after: NaiveDate,
    newer_than: Option<(u32, u32)>,
) -> Option<&EpisodeInfo> {
    episodes
        .iter()
        .filter(|ep| matches!(ep.release_date, Some(date) if date > after))
        .filter(|ep| newer_than.is_none_or(|prev| (ep.season, ep.episode) > prev))
        .min_by_key(|ep| (ep.release_date, ep.season, ep.episode))
}
