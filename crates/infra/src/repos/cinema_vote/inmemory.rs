use super::ICinemaVoteRepo;
use crate::repos::shared::inmemory_repo::*;
use kinobot_domain::{ChatId, CinemaVote};

pub struct InMemoryCinemaVoteRepo {
    votes: std::sync::Mutex<Vec<CinemaVote>>,
}

impl InMemoryCinemaVoteRepo {
    pub fn new() -> Self {
        Self {
            votes: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryCinemaVoteRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICinemaVoteRepo for InMemoryCinemaVoteRepo {
    async fn insert(&self, vote: &CinemaVote) -> anyhow::Result<()> {
        insert(vote, &self.votes);
        Ok(())
    }

    async fn save(&self, vote: &CinemaVote) -> anyhow::Result<()> {
        update_many(
            &self.votes,
            |v| v.chat_id == vote.chat_id && v.film_id == vote.film_id,
            |v| *v = vote.clone(),
        );
        Ok(())
    }

    async fn find(&self, chat_id: ChatId, film_id: i64) -> Option<CinemaVote> {
        find_by(&self.votes, |v| {
            v.chat_id == chat_id && v.film_id == film_id
        })
        .into_iter()
        .next()
    }

    async fn find_past_deadline(&self, before: i64) -> Vec<CinemaVote> {
        find_by(&self.votes, |v| v.deadline <= before)
    }

    async fn delete(&self, chat_id: ChatId, film_id: i64) -> Option<CinemaVote> {
        find_and_delete_by(&self.votes, |v| {
            v.chat_id == chat_id && v.film_id == film_id
        })
        .into_iter()
        .next()
    }
}
