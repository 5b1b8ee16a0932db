use crate::series::{schedule_next_series_check, schedule_recheck};
use crate::shared::usecase::UseCase;
use kinobot_domain::date::utc_date_of;
use kinobot_infra::KinobotContext;
use tracing::warn;

/// Boot-time restore for the watcher chains: the job queue starts empty
/// after a restart, so every show somebody still subscribes to gets its
/// chain restarted from the store. Shows whose metadata lookup fails
/// fall back to a recheck instead of losing the chain.
#[derive(Debug)]
pub struct RestartSeriesChainsUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for RestartSeriesChainsUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "RestartSeriesChains";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<usize, UseCaseError> {
        let today = utc_date_of(ctx.sys.get_timestamp_millis());
        let mut restarted = 0;

        for (chat_id, show_id) in ctx.repos.series_subscriptions.find_active_shows().await {
            match schedule_next_series_check(ctx, chat_id, show_id, today, None).await {
                Ok(Some(_)) => restarted += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "Metadata lookup for show {} failed during chain restore, \
                         falling back to a recheck: {:?}",
                        show_id, e
                    );
                    schedule_recheck(ctx, chat_id, show_id);
                    restarted += 1;
                }
            }
        }

        Ok(restarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup_at, TestApp};
    use crate::shared::usecase::execute;
    use kinobot_domain::{ChatId, EpisodeInfo, IJobScheduler, SeriesSubscription, UserId};

    async fn subscribe(app: &TestApp, chat_id: i64, show_id: i64, subscribed: bool) {
        let mut subscription = SeriesSubscription::new(
            ChatId(chat_id),
            show_id,
            format!("Show {}", show_id),
            UserId(1),
        );
        subscription.subscribed = subscribed;
        app.ctx
            .repos
            .series_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn it_restarts_one_chain_per_active_show() {
        let app = setup_at("2021-02-24T09:00:00Z");
        subscribe(&app, 10, 7, true).await;
        subscribe(&app, 10, 8, true).await;
        subscribe(&app, 10, 9, false).await;
        app.series_metadata.set_episodes(
            7,
            vec![EpisodeInfo {
                season: 1,
                episode: 2,
                release_date: Some("2021-03-01".parse().expect("Valid date")),
            }],
        );

        let restarted = execute(RestartSeriesChainsUseCase, &app.ctx).await.unwrap();

        // Show 7 gets an announce, show 8 (no dated episodes) a
        // recheck, the unsubscribed show 9 nothing
        assert_eq!(restarted, 2);
        let ids = app.scheduler.job_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().any(|id| id.starts_with("series_announce_10_7_")));
        assert!(ids.iter().any(|id| id.starts_with("series_recheck_10_8_")));
    }

    #[tokio::test]
    async fn running_the_restore_twice_changes_nothing() {
        let app = setup_at("2021-02-24T09:00:00Z");
        subscribe(&app, 10, 7, true).await;

        execute(RestartSeriesChainsUseCase, &app.ctx).await.unwrap();
        let second = execute(RestartSeriesChainsUseCase, &app.ctx).await.unwrap();

        assert_eq!(second, 0);
        assert_eq!(app.scheduler.job_ids().len(), 1);
    }
}
