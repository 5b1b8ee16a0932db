use super::IRatingRepo;
use kinobot_domain::{ChatId, UserId};

pub struct InMemoryRatingRepo {
    ratings: std::sync::Mutex<Vec<(ChatId, i64, UserId)>>,
}

impl InMemoryRatingRepo {
    pub fn new() -> Self {
        Self {
            ratings: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Test helper standing in for the statistics layer writing a rating
    pub fn add_rating(&self, chat_id: ChatId, film_id: i64, user_id: UserId) {
        self.ratings.lock().unwrap().push((chat_id, film_id, user_id));
    }
}

impl Default for InMemoryRatingRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IRatingRepo for InMemoryRatingRepo {
    async fn count_for_film(&self, chat_id: ChatId, film_id: i64) -> anyhow::Result<i64> {
        let count = self
            .ratings
            .lock()
            .unwrap()
            .iter()
            .filter(|(chat, film, _)| *chat == chat_id && *film == film_id)
            .count();
        Ok(count as i64)
    }
}
