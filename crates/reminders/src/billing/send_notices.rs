use crate::shared::usecase::UseCase;
use kinobot_domain::date::utc_date_of;
use kinobot_infra::{KinobotContext, Recipient};
use tracing::warn;

/// The daily heads-up sweep: tells every payer whose subscription is
/// due tomorrow that a charge is coming, so a stale payment method can
/// be fixed before the charge sweep finds it.
#[derive(Debug)]
pub struct SendChargeNoticesUseCase;

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for SendChargeNoticesUseCase {
    type Response = usize;
    type Error = UseCaseError;

    const NAME: &'static str = "SendChargeNotices";

    async fn execute(&mut self, ctx: &KinobotContext) -> Result<usize, UseCaseError> {
        let tomorrow = utc_date_of(ctx.sys.get_timestamp_millis()) + chrono::Duration::days(1);
        let mut notified = 0;

        for subscription in ctx
            .repos
            .billing_subscriptions
            .find_active_due_on(tomorrow)
            .await
        {
            let text = format!(
                "Heads up: your kinobot subscription renews tomorrow ({}).",
                subscription.next_payment_date
            );
            match ctx
                .notifier
                .send(Recipient::User(subscription.payer), &text)
                .await
            {
                Ok(_) => notified += 1,
                Err(e) => warn!(
                    "Could not warn {} about tomorrow's charge: {:?}",
                    subscription.payer, e
                ),
            }
        }

        Ok(notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::setup_at;
    use crate::shared::usecase::execute;
    use chrono::NaiveDate;
    use kinobot_domain::{BillingPeriod, BillingSubscription, UserId};

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Valid date")
    }

    #[tokio::test]
    async fn it_warns_payers_due_tomorrow_and_nobody_else() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let due_tomorrow =
            BillingSubscription::new(UserId(1), 499, BillingPeriod::Monthly, date("2021-02-25"));
        let due_today =
            BillingSubscription::new(UserId(2), 499, BillingPeriod::Monthly, date("2021-02-24"));
        app.ctx
            .repos
            .billing_subscriptions
            .insert(&due_tomorrow)
            .await
            .unwrap();
        app.ctx
            .repos
            .billing_subscriptions
            .insert(&due_today)
            .await
            .unwrap();

        let notified = execute(SendChargeNoticesUseCase, &app.ctx).await.unwrap();

        assert_eq!(notified, 1);
        let sent = app.notifier.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, Recipient::User(UserId(1)));
        assert!(sent[0].text.contains("tomorrow"));
    }

    #[tokio::test]
    async fn inactive_subscriptions_are_ignored() {
        let app = setup_at("2021-02-24T09:00:00Z");
        let mut subscription =
            BillingSubscription::new(UserId(1), 499, BillingPeriod::Monthly, date("2021-02-25"));
        subscription.is_active = false;
        app.ctx
            .repos
            .billing_subscriptions
            .insert(&subscription)
            .await
            .unwrap();

        let notified = execute(SendChargeNoticesUseCase, &app.ctx).await.unwrap();

        assert_eq!(notified, 0);
    }
}
