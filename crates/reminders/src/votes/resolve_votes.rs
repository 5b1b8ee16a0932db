use crate::shared::usecase::UseCase;
use kinobot_domain::WatchKind;
use kinobot_infra::{KinobotContext, Recipient};
use tracing::warn;

/// The Tuesday resolver: counts every expired vote and acts on it.
///
/// Ties and silence remove the plan. The vote record is deleted either
/// way; a plan that survives gets a fresh vote next Monday if it is
/// still unrated.
#[derive(Debug)]
pub struct ResolveCinemaVotesUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for ResolveCinemaVotesUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "ResolveCinemaVotes";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<usize, UseCaseError> {
        let now = ctx.sys.get_timestamp_millis();
        let mut resolved = 0;

        for vote in ctx.repos.cinema_votes.find_past_deadline(now).await {
            let _guard = ctx.store_lock.lock().await;

            let cinema_plans: Vec<_> = ctx
                .repos
                .plans
                .find_by_chat_and_film(vote.chat_id, vote.film_id)
                .await
                .into_iter()
                .filter(|plan| plan.kind == WatchKind::Cinema)
                .collect();

            if let Some(plan) = cinema_plans.first() {
                let text = if vote.should_remove_plan() {
                    format!(
                        "{} got no support and was dropped from the cinema list.",
                        plan.film_title
                    )
                } else {
                    format!("{} stays on the cinema list for another week.", plan.film_title)
                };
                if vote.should_remove_plan() {
                    for plan in &cinema_plans {
                        ctx.repos.plans.delete(&plan.id).await;
                    }
                }
                if let Err(e) = ctx.notifier.send(Recipient::Chat(vote.chat_id), &text).await {
                    warn!(
                        "Could not announce the vote result for film {} in chat {}: {:?}",
                        vote.film_id, vote.chat_id, e
                    );
                }
            }

            ctx.repos.cinema_votes.delete(vote.chat_id, vote.film_id).await;
            resolved += 1;
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{millis, setup_at, TestApp};
    use crate::shared::usecase::execute;
    use kinobot_domain::{ChatId, CinemaVote, Plan, UserId};

    async fn insert_plan_and_vote(app: &TestApp, deadline: i64) -> Plan {
        let plan = Plan::new(
            ChatId(10),
            42,
            "Alien".into(),
            WatchKind::Cinema,
            millis("2021-02-26T20:00:00Z"),
            UserId(1),
        );
        app.ctx.repos.plans.insert(&plan).await.unwrap();
        let vote = CinemaVote::new(ChatId(10), 42, deadline, 1);
        app.ctx.repos.cinema_votes.insert(&vote).await.unwrap();
        plan
    }

    async fn cast(app: &TestApp, user_id: i64, keep: bool) {
        let mut vote = app
            .ctx
            .repos
            .cinema_votes
            .find(ChatId(10), 42)
            .await
            .unwrap();
        vote.cast(UserId(user_id), keep);
        app.ctx.repos.cinema_votes.save(&vote).await.unwrap();
    }

    #[tokio::test]
    async fn a_tie_removes_the_plan() {
        let app = setup_at("2021-03-02T18:00:00Z");
        let plan = insert_plan_and_vote(&app, millis("2021-03-02T00:00:00Z")).await;
        cast(&app, 1, true).await;
        cast(&app, 2, false).await;

        let resolved = execute(ResolveCinemaVotesUseCase, &app.ctx).await.unwrap();

        assert_eq!(resolved, 1);
        assert!(app.ctx.repos.plans.find(&plan.id).await.is_none());
        assert!(app.ctx.repos.cinema_votes.find(ChatId(10), 42).await.is_none());
        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("dropped"));
    }

    #[tokio::test]
    async fn a_yes_majority_keeps_the_plan() {
        let app = setup_at("2021-03-02T18:00:00Z");
        let plan = insert_plan_and_vote(&app, millis("2021-03-02T00:00:00Z")).await;
        cast(&app, 1, true).await;
        cast(&app, 2, true).await;
        cast(&app, 3, false).await;

        execute(ResolveCinemaVotesUseCase, &app.ctx).await.unwrap();

        assert!(app.ctx.repos.plans.find(&plan.id).await.is_some());
        assert!(app.ctx.repos.cinema_votes.find(ChatId(10), 42).await.is_none());
        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("stays"));
    }

    #[tokio::test]
    async fn votes_still_open_are_untouched() {
        let app = setup_at("2021-03-01T20:00:00Z");
        let plan = insert_plan_and_vote(&app, millis("2021-03-02T00:00:00Z")).await;

        let resolved = execute(ResolveCinemaVotesUseCase, &app.ctx).await.unwrap();

        assert_eq!(resolved, 0);
        assert!(app.ctx.repos.plans.find(&plan.id).await.is_some());
        assert!(app.ctx.repos.cinema_votes.find(ChatId(10), 42).await.is_some());
    }

    #[tokio::test]
    async fn an_orphaned_vote_is_cleaned_up_silently() {
        let app = setup_at("2021-03-02T18:00:00Z");
        let vote = CinemaVote::new(ChatId(10), 42, millis("2021-03-02T00:00:00Z"), 1);
        app.ctx.repos.cinema_votes.insert(&vote).await.unwrap();

        let resolved = execute(ResolveCinemaVotesUseCase, &app.ctx).await.unwrap();

        assert_eq!(resolved, 1);
        assert!(app.ctx.repos.cinema_votes.find(ChatId(10), 42).await.is_none());
        assert!(app.notifier.sent_messages().is_empty());
    }
}
