use crate::shared::usecase::UseCase;
use kinobot_domain::date::utc_date_of;
use kinobot_infra::{ChargeOutcome, KinobotContext, Recipient};
use tracing::warn;

/// The daily charge sweep: attempts one charge for every active
/// subscription due today.
///
/// On success the next payment date advances one period; on failure it
/// stays where it is, so the subscription is naturally retried by
/// tomorrow's sweep. Per-subscription failures never abort the sweep.
#[derive(Debug)]
pub struct ChargeDueSubscriptionsUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for ChargeDueSubscriptionsUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "ChargeDueSubscriptions";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<usize, UseCaseError> {
        let today = utc_date_of(ctx.sys.get_timestamp_millis());
        let mut charged = 0;

        for mut subscription in ctx.repos.billing_subscriptions.find_active_due_on(today).await {
            let Some(token) = subscription.payment_token.clone() else {
                warn!(
                    "Subscription {} is due but has no payment token, skipping",
                    subscription.id
                );
                continue;
            };

            let outcome = match ctx.payments.charge(&token, subscription.price_minor).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Charge attempt for subscription {} failed: {:?}", subscription.id, e);
                    continue;
                }
            };

            match outcome {
                ChargeOutcome::Succeeded => {
                    let advanced = {
                        let _guard = ctx.store_lock.lock().await;
                        subscription.next_payment_date =
                            subscription.period.advance(subscription.next_payment_date);
                        ctx.repos.billing_subscriptions.save(&subscription).await
                    };
                    if let Err(e) = advanced {
                        warn!(
                            "Charged subscription {} but could not advance its payment date: {:?}",
                            subscription.id, e
                        );
                        continue;
                    }
                    charged += 1;
                    let text = format!(
                        "Your kinobot subscription was renewed until {}.",
                        subscription.next_payment_date
                    );
                    if let Err(e) = ctx
                        .notifier
                        .send(Recipient::User(subscription.payer), &text)
                        .await
                    {
                        warn!("Could not confirm the charge to {}: {:?}", subscription.payer, e);
                    }
                }
                ChargeOutcome::Failed => {
                    let text = "Your kinobot subscription payment failed. \
                        We will retry tomorrow; please check your payment method.";
                    if let Err(e) = ctx
                        .notifier
                        .send(Recipient::User(subscription.payer), text)
                        .await
                    {
                        warn!(
                            "Could not report the failed charge to {}: {:?}",
                            subscription.payer, e
                        );
                    }
                }
            }
        }

        Ok(charged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{setup_at, TestApp};
    use crate::shared::usecase::execute;
    use chrono::NaiveDate;
    use kinobot_domain::{BillingPeriod, BillingSubscription, UserId};

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Valid date")
    }

    async fn insert_subscription(app: &TestApp, due: &str) -> BillingSubscription {
        let mut subscription =
            BillingSubscription::new(UserId(1), 499, BillingPeriod::Monthly, date(due));
        subscription.payment_token = Some("tok_1".into());
        app.ctx
            .repos
            .billing_subscriptions
            .insert(&subscription)
            .await
            .unwrap();
        subscription
    }

    #[tokio::test]
    async fn a_successful_charge_advances_the_payment_date() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let subscription = insert_subscription(&app, "2021-02-24").await;

        let charged = execute(ChargeDueSubscriptionsUseCase, &app.ctx).await.unwrap();

        assert_eq!(charged, 1);
        assert_eq!(app.payments.charges(), vec![("tok_1".to_string(), 499)]);
        let stored = app
            .ctx
            .repos
            .billing_subscriptions
            .find(&subscription.id)
            .await
            .unwrap();
        assert_eq!(stored.next_payment_date, date("2021-03-24"));
        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, Recipient::User(UserId(1)));
        assert!(sent[0].text.contains("renewed"));
    }

    #[tokio::test]
    async fn a_failed_charge_leaves_the_date_for_tomorrows_retry() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let subscription = insert_subscription(&app, "2021-02-24").await;
        app.payments.set_outcome(ChargeOutcome::Failed);

        let charged = execute(ChargeDueSubscriptionsUseCase, &app.ctx).await.unwrap();

        assert_eq!(charged, 0);
        let stored = app
            .ctx
            .repos
            .billing_subscriptions
            .find(&subscription.id)
            .await
            .unwrap();
        assert_eq!(stored.next_payment_date, date("2021-02-24"));
        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("failed"));
    }

    #[tokio::test]
    async fn subscriptions_not_due_today_are_untouched() {
        let app = setup_at("2021-02-24T09:00:00Z");
        insert_subscription(&app, "2021-02-25").await;

        let charged = execute(ChargeDueSubscriptionsUseCase, &app.ctx).await.unwrap();

        assert_eq!(charged, 0);
        assert!(app.payments.charges().is_empty());
    }

    #[tokio::test]
    async fn a_missing_payment_token_skips_the_charge() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let subscription =
            BillingSubscription::new(UserId(1), 499, BillingPeriod::Monthly, date("2021-02-24"));
        app.ctx
            .repos
            .billing_subscriptions
            .insert(&subscription)
            .await
            .unwrap();

        let charged = execute(ChargeDueSubscriptionsUseCase, &app.ctx).await.unwrap();

        assert_eq!(charged, 0);
        assert!(app.payments.charges().is_empty());
        assert!(app.notifier.sent_messages().is_empty());
    }
}
