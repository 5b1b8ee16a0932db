use crate::series::schedule_next_series_check;
use crate::shared::usecase::UseCase;
use kinobot_domain::date::utc_date_of;
use kinobot_domain::{ChatId, SeriesSubscription, UserId};
use kinobot_infra::KinobotContext;

/// Registers interest in next-episode alerts for a show and starts the
/// chat's watcher chain if none is running.
#[derive(Debug)]
pub struct SubscribeSeriesUseCase {
    pub chat_id: ChatId,
    pub show_id: i64,
    pub show_title: String,
    pub user_id: UserId,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(String),
    MetadataUnavailable(String),
}

#[async_trait::async_trait]
impl UseCase for SubscribeSeriesUseCase {
    type Response = ();
    type Error = UseCaseError;

    const NAME: &'static str = "SubscribeSeries";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<(), UseCaseError> {
        let subscription = SeriesSubscription::new(
            self.chat_id,
            self.show_id,
            self.show_title.clone(),
            self.user_id,
        );
        ctx.repos
            .series_subscriptions
            .upsert(&subscription)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        let today = utc_date_of(ctx.sys.get_timestamp_millis());
        schedule_next_series_check(ctx, self.chat_id, self.show_id, today, None)
            .await
            .map_err(|e| UseCaseError::MetadataUnavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::setup_at;
    use crate::shared::usecase::execute;
    use kinobot_domain::{EpisodeInfo, IJobScheduler};

    fn episode(season: u32, episode: u32, release: Option<&str>) -> EpisodeInfo {
        EpisodeInfo {
            season,
            episode,
            release_date: release.map(|date| date.parse().expect("Valid date")),
        }
    }

    #[tokio::test]
    async fn it_schedules_an_announcement_for_the_nearest_future_episode() {
        let app = setup_at("2021-02-24T09:00:00Z");
        app.series_metadata.set_episodes(
            7,
            vec![
                episode(1, 1, Some("2021-01-01")),
                episode(1, 2, Some("2021-03-01")),
            ],
        );

        execute(
            SubscribeSeriesUseCase {
                chat_id: ChatId(10),
                show_id: 7,
                show_title: "The Expanse".into(),
                user_id: UserId(1),
            },
            &app.ctx,
        )
        .await
        .unwrap();

        let sub = app
            .ctx
            .repos
            .series_subscriptions
            .find(ChatId(10), 7, UserId(1))
            .await
            .unwrap();
        assert!(sub.subscribed);

        // Announce on the day before the release, at noon UTC
        let fire_at = "2021-02-28T12:00:00Z"
            .parse::<chrono::DateTime<chrono::Utc>>()
            .expect("Valid datetime")
            .timestamp_millis();
        let expected = kinobot_domain::series_check_job_id(
            &kinobot_domain::SeriesCheckKind::Announce {
                season: 1,
                episode: 2,
            },
            ChatId(10),
            7,
            fire_at,
        );
        assert_eq!(app.scheduler.job_ids(), vec![expected]);
    }

    #[tokio::test]
    async fn a_show_without_dated_episodes_gets_a_recheck() {
        let app = setup_at("2021-02-24T09:00:00Z");
        app.series_metadata
            .set_episodes(7, vec![episode(1, 1, Some("2021-01-01")), episode(1, 2, None)]);

        execute(
            SubscribeSeriesUseCase {
                chat_id: ChatId(10),
                show_id: 7,
                show_title: "The Expanse".into(),
                user_id: UserId(1),
            },
            &app.ctx,
        )
        .await
        .unwrap();

        let ids = app.scheduler.job_ids();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].starts_with("series_recheck_10_7_"));
    }

    #[tokio::test]
    async fn a_second_subscriber_does_not_fork_the_chain() {
        let app = setup_at("2021-02-24T09:00:00Z");
        app.series_metadata
            .set_episodes(7, vec![episode(1, 2, Some("2021-03-01"))]);

        for user in [1, 2] {
            execute(
                SubscribeSeriesUseCase {
                    chat_id: ChatId(10),
                    show_id: 7,
                    show_title: "The Expanse".into(),
                    user_id: UserId(user),
                },
                &app.ctx,
            )
            .await
            .unwrap();
        }

        assert_eq!(app.scheduler.job_ids().len(), 1);
        let subs = app
            .ctx
            .repos
            .series_subscriptions
            .find_active_by_show(ChatId(10), 7)
            .await;
        assert_eq!(subs.len(), 2);
    }
}
