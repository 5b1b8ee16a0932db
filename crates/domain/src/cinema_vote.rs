use crate::shared::entity::{ChatId, UserId};
use serde::{Deserialize, Serialize};

/// A time-boxed yes/no poll deciding whether an unrated cinema `Plan`
/// stays active another week.
///
/// Created by the Monday opener sweep, mutated by incoming votes,
/// deleted on resolution or when the plan disappears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinemaVote {
    pub chat_id: ChatId,
    pub film_id: i64,
    /// UTC millis after which the vote is eligible for resolution
    pub deadline: i64,
    /// Reference to the posted yes/no prompt message
    pub message_ref: i64,
    pub yes_voters: Vec<UserId>,
    pub no_voters: Vec<UserId>,
}

impl CinemaVote {
    pub fn new(chat_id: ChatId, film_id: i64, deadline: i64, message_ref: i64) -> Self {
        Self {
            chat_id,
            film_id,
            deadline,
            message_ref,
            yes_voters: Vec::new(),
            no_voters: Vec::new(),
        }
    }

    /// Records a vote, moving the voter between the two sets when they
    /// change their mind. Voting twice the same way is a no-op.
    pub fn cast(&mut self, user_id: UserId, keep: bool) {
        self.yes_voters.retain(|voter| *voter != user_id);
        self.no_voters.retain(|voter| *voter != user_id);
        if keep {
            self.yes_voters.push(user_id);
        } else {
            self.no_voters.push(user_id);
        }
    }

    pub fn is_past_deadline(&self, now: i64) -> bool {
        now >= self.deadline
    }

    /// Ties favor removal: a plan nobody bothered to defend gets
    /// cleaned up.
    pub fn should_remove_plan(&self) -> bool {
        self.no_voters.len() >= self.yes_voters.len()
    }
}
