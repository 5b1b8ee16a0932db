use crate::series::{schedule_next_series_check, schedule_recheck};
use crate::shared::usecase::UseCase;
use kinobot_domain::date::utc_date_of;
use kinobot_domain::{ChatId, SeriesCheckKind};
use kinobot_infra::{KinobotContext, Recipient};
use tracing::{info, warn};

/// One link of the self-perpetuating watcher chain.
///
/// Every firing either ends the chain (nobody subscribed anymore) or
/// schedules exactly one successor. Announcements that fail to deliver
/// are not retried; the successor is the next natural attempt.
#[derive(Debug)]
pub struct SeriesCheckUseCase {
    pub chat_id: ChatId,
    pub show_id: i64,
    pub kind: SeriesCheckKind,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for SeriesCheckUseCase {
    type Response = Option<SeriesCheckKind>;
    type Error = UseCaseError;

    const NAME: &'static str = "SeriesCheck";

    async fn execute(
        &mut self,
        ctx: &KinobotContext,
    ) -> Result<Option<SeriesCheckKind>, UseCaseError> {
        let subscribers = ctx
            .repos
            .series_subscriptions
            .find_active_by_show(self.chat_id, self.show_id)
            .await;
        let Some(subscription) = subscribers.first() else {
            info!(
                "Nobody in chat {} watches show {} anymore, ending the chain",
                self.chat_id, self.show_id
            );
            return Ok(None);
        };

        let today = utc_date_of(ctx.sys.get_timestamp_millis());
        let newer_than = match self.kind {
            SeriesCheckKind::Announce { season, episode } => {
                let text = format!(
                    "S{:02}E{:02} of {} releases tomorrow!",
                    season, episode, subscription.show_title
                );
                if let Err(e) = ctx.notifier.send(Recipient::Chat(self.chat_id), &text).await {
                    warn!(
                        "Could not announce S{:02}E{:02} of show {} in chat {}: {:?}",
                        season, episode, self.show_id, self.chat_id, e
                    );
                }
                // Excluding by episode order rather than by date keeps
                // a same-day double premiere eligible for its own
                // announcement
                Some((season, episode))
            }
            SeriesCheckKind::Recheck => None,
        };

        match schedule_next_series_check(ctx, self.chat_id, self.show_id, today, newer_than).await {
            Ok(kind) => Ok(kind),
            Err(e) => {
                warn!(
                    "Metadata lookup for show {} failed, falling back to a recheck: {:?}",
                    self.show_id, e
                );
                schedule_recheck(ctx, self.chat_id, self.show_id);
                Ok(Some(SeriesCheckKind::Recheck))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup_at, TestApp};
    use crate::shared::usecase::execute;
    use kinobot_domain::{EpisodeInfo, IJobScheduler, SeriesSubscription, UserId};

    fn episode(season: u32, episode: u32, release: &str) -> EpisodeInfo {
        EpisodeInfo {
            season,
            episode,
            release_date: Some(release.parse().expect("Valid date")),
        }
    }

    async fn subscribe(app: &TestApp) {
        let subscription =
            SeriesSubscription::new(ChatId(10), 7, "The Expanse".into(), UserId(1));
        app.ctx
            .repos
            .series_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();
    }

    async fn check(app: &TestApp, kind: SeriesCheckKind) -> Option<SeriesCheckKind> {
        execute(
            SeriesCheckUseCase {
                chat_id: ChatId(10),
                show_id: 7,
                kind,
            },
            &app.ctx,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn an_announce_notifies_and_schedules_exactly_one_successor() {
        // Firing the day before the S01E02 release
        let app = setup_at("2021-02-28T12:00:00Z");
        subscribe(&app).await;
        app.series_metadata.set_episodes(
            7,
            vec![
                episode(1, 2, "2021-03-01"),
                episode(1, 3, "2021-03-08"),
            ],
        );

        let successor = check(
            &app,
            SeriesCheckKind::Announce {
                season: 1,
                episode: 2,
            },
        )
        .await;

        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("S01E02"));
        assert!(sent[0].text.contains("The Expanse"));

        // The successor targets E03, not the episode just announced
        assert_eq!(
            successor,
            Some(SeriesCheckKind::Announce {
                season: 1,
                episode: 3
            })
        );
        let ids = app.scheduler.job_ids();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].starts_with("series_announce_10_7_"));
    }

    #[tokio::test]
    async fn a_double_premiere_still_announces_the_second_episode() {
        // E02 and E03 both release on 2021-03-01
        let app = setup_at("2021-02-28T12:00:00Z");
        subscribe(&app).await;
        app.series_metadata.set_episodes(
            7,
            vec![episode(1, 2, "2021-03-01"), episode(1, 3, "2021-03-01")],
        );

        let successor = check(
            &app,
            SeriesCheckKind::Announce {
                season: 1,
                episode: 2,
            },
        )
        .await;

        assert_eq!(app.notifier.sent_messages().len(), 1);
        assert_eq!(
            successor,
            Some(SeriesCheckKind::Announce {
                season: 1,
                episode: 3
            })
        );
    }

    #[tokio::test]
    async fn a_recheck_without_dated_episodes_schedules_another_recheck() {
        let app = setup_at("2021-02-28T12:00:00Z");
        subscribe(&app).await;
        app.series_metadata.set_episodes(7, vec![]);

        let successor = check(&app, SeriesCheckKind::Recheck).await;

        assert_eq!(successor, Some(SeriesCheckKind::Recheck));
        assert!(app.notifier.sent_messages().is_empty());
        let ids = app.scheduler.job_ids();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].starts_with("series_recheck_10_7_"));
    }

    #[tokio::test]
    async fn the_chain_ends_when_nobody_is_subscribed() {
        let app = setup_at("2021-02-28T12:00:00Z");
        app.series_metadata.set_episodes(7, vec![episode(1, 2, "2021-03-01")]);

        let successor = check(
            &app,
            SeriesCheckKind::Announce {
                season: 1,
                episode: 2,
            },
        )
        .await;

        assert_eq!(successor, None);
        assert!(app.notifier.sent_messages().is_empty());
        assert!(app.scheduler.job_ids().is_empty());
    }

    #[tokio::test]
    async fn an_unsubscribed_chat_also_ends_the_chain() {
        let app = setup_at("2021-02-28T12:00:00Z");
        let mut subscription =
            SeriesSubscription::new(ChatId(10), 7, "The Expanse".into(), UserId(1));
        subscription.subscribed = false;
        app.ctx
            .repos
            .series_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();

        let successor = check(&app, SeriesCheckKind::Recheck).await;

        assert_eq!(successor, None);
        assert!(app.scheduler.job_ids().is_empty());
    }

    #[tokio::test]
    async fn a_failed_announcement_still_schedules_the_successor() {
        let app = setup_at("2021-02-28T12:00:00Z");
        subscribe(&app).await;
        app.series_metadata.set_episodes(
            7,
            vec![episode(1, 2, "2021-03-01"), episode(1, 3, "2021-03-08")],
        );
        app.notifier.set_failing(true);

        let successor = check(
            &app,
            SeriesCheckKind::Announce {
                season: 1,
                episode: 2,
            },
        )
        .await;

        assert!(successor.is_some());
        assert_eq!(app.scheduler.job_ids().len(), 1);
    }
}
