use crate::shared::usecase::UseCase;
use kinobot_domain::date::utc_date_of;
use kinobot_domain::CinemaVote;
use kinobot_infra::{KinobotContext, Recipient};
use tracing::warn;

/// The Monday opener: posts a retention vote for every past-due cinema
/// plan nobody rated.
///
/// A recorded rating is proof the chat went and saw the film, so those
/// plans are left alone. Votes stay open until the end of the current
/// UTC day; the Tuesday resolver picks them up. Per-plan failures skip
/// the plan and leave it for next Monday.
#[derive(Debug)]
pub struct OpenCinemaVotesUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for OpenCinemaVotesUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "OpenCinemaVotes";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<usize, UseCaseError> {
        let now = ctx.sys.get_timestamp_millis();
        let deadline = (utc_date_of(now) + chrono::Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .expect("Midnight is always valid")
            .and_utc()
            .timestamp_millis();

        let mut opened = 0;
        for plan in ctx.repos.plans.find_past_due_cinema(now).await {
            if ctx
                .repos
                .cinema_votes
                .find(plan.chat_id, plan.film_id)
                .await
                .is_some()
            {
                continue;
            }
            match ctx
                .repos
                .ratings
                .count_for_film(plan.chat_id, plan.film_id)
                .await
            {
                Ok(0) => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Could not read ratings for plan {}: {:?}", plan.id, e);
                    continue;
                }
            }

            let text = format!(
                "Still planning to see {} in the cinema? Vote yes to keep it, no to drop it.",
                plan.film_title
            );
            let message_ref = match ctx.notifier.send(Recipient::Chat(plan.chat_id), &text).await {
                Ok(message_ref) => message_ref,
                Err(e) => {
                    warn!("Could not open a vote for plan {}: {:?}", plan.id, e);
                    continue;
                }
            };

            let vote = CinemaVote::new(plan.chat_id, plan.film_id, deadline, message_ref);
            if let Err(e) = ctx.repos.cinema_votes.insert(&vote).await {
                warn!("Could not store the vote for plan {}: {:?}", plan.id, e);
                continue;
            }
            opened += 1;
        }

        Ok(opened)
    }
}
