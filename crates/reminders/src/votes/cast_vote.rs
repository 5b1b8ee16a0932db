use crate::shared::usecase::UseCase;
use kinobot_domain::{ChatId, CinemaVote, UserId};
use kinobot_infra::KinobotContext;

/// Records one user's yes/no on an open retention vote. Re-voting moves
/// the voter between the two sets.
#[derive(Debug)]
pub struct CastCinemaVoteUseCase {
    pub chat_id: ChatId,
    pub film_id: i64,
    pub user_id: UserId,
    /// true = keep the plan, false = drop it
    pub keep: bool,
}

#[derive(Debug)]
pub enum UseCaseError {
    VoteNotFound { chat_id: ChatId, film_id: i64 },
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for CastCinemaVoteUseCase {
    type Response = CinemaVote;
    type Error = UseCaseError;

    const NAME: &'static str = "CastCinemaVote";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<CinemaVote, UseCaseError> {
        let _guard = ctx.store_lock.lock().await;

        let mut vote = ctx
            .repos
            .cinema_votes
            .find(self.chat_id, self.film_id)
            .await
            .ok_or(UseCaseError::VoteNotFound {
                chat_id: self.chat_id,
                film_id: self.film_id,
            })?;

        vote.cast(self.user_id, self.keep);
        ctx.repos
            .cinema_votes
            .save(&vote)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        Ok(vote)
    }
}
