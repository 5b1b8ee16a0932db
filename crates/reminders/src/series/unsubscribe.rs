use crate::shared::usecase::UseCase;
use kinobot_domain::{ChatId, UserId};
use kinobot_infra::KinobotContext;

/// Flips the subscription's soft flag. In-flight watcher jobs re-check
/// active subscribers at fire time, so no job is revoked here; a chain
/// with nobody left listening simply ends at its next firing.
#[derive(Debug)]
pub struct UnsubscribeSeriesUseCase {
    pub chat_id: ChatId,
    pub show_id: i64,
    pub user_id: UserId,
}

#[derive(Debug)]
pub enum UseCaseError {
    SubscriptionNotFound,
    StorageError(String),
}

#[async_trait::async_trait]
impl UseCase for UnsubscribeSeriesUseCase {
    type Response = ();
    type Error = UseCaseError;

    const NAME: &'static str = "UnsubscribeSeries";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<(), UseCaseError> {
        let mut subscription = ctx
            .repos
            .series_subscriptions
            .find(self.chat_id, self.show_id, self.user_id)
            .await
            .ok_or(UseCaseError::SubscriptionNotFound)?;

        subscription.subscribed = false;
        ctx.repos
            .series_subscriptions
            .upsert(&subscription)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::setup_at;
    use crate::shared::usecase::execute;
    use kinobot_domain::SeriesSubscription;

    #[tokio::test]
    async fn it_flips_the_soft_flag() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let subscription = SeriesSubscription::new(ChatId(10), 7, "The Expanse".into(), UserId(1));
        app.ctx
            .repos
            .series_subscriptions
            .upsert(&subscription)
            .await
            .unwrap();

        execute(
            UnsubscribeSeriesUseCase {
                chat_id: ChatId(10),
                show_id: 7,
                user_id: UserId(1),
            },
            &app.ctx,
        )
        .await
        .unwrap();

        let stored = app
            .ctx
            .repos
            .series_subscriptions
            .find(ChatId(10), 7, UserId(1))
            .await
            .unwrap();
        assert!(!stored.subscribed);
        assert!(app
            .ctx
            .repos
            .series_subscriptions
            .find_active_by_show(ChatId(10), 7)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn unsubscribing_without_a_subscription_is_an_error() {
        let app = setup_at("2021-02-24T09:00:00Z");

        let res = execute(
            UnsubscribeSeriesUseCase {
                chat_id: ChatId(10),
                show_id: 7,
                user_id: UserId(1),
            },
            &app.ctx,
        )
        .await;

        assert!(matches!(res, Err(UseCaseError::SubscriptionNotFound)));
    }
}
