use crate::scheduler::TokioJobScheduler;
use chrono::{DateTime, Utc};
use kinobot_infra::{
    ISys, InMemoryNotifier, InMemoryPaymentGateway, InMemoryRatingRepo,
    InMemorySeriesMetadataService, KinobotContext,
};
use std::sync::Arc;

/// Clock frozen at a fixed instant.
pub struct StaticTimeSys(pub i64);

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}

pub fn millis(datetime: &str) -> i64 {
    datetime
        .parse::<DateTime<Utc>>()
        .expect("Valid datetime")
        .timestamp_millis()
}

/// Inmemory context plus typed handles on the doubles the trait
/// objects hide.
pub struct TestApp {
    pub ctx: KinobotContext,
    pub scheduler: Arc<TokioJobScheduler>,
    pub notifier: Arc<InMemoryNotifier>,
    pub series_metadata: Arc<InMemorySeriesMetadataService>,
    pub payments: Arc<InMemoryPaymentGateway>,
    pub ratings: Arc<InMemoryRatingRepo>,
}

pub fn setup_at(now: &str) -> TestApp {
    let scheduler = Arc::new(TokioJobScheduler::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let series_metadata = Arc::new(InMemorySeriesMetadataService::new());
    let payments = Arc::new(InMemoryPaymentGateway::new());
    let ratings = Arc::new(InMemoryRatingRepo::new());

    let mut ctx = KinobotContext::create_inmemory(scheduler.clone());
    ctx.sys = Arc::new(StaticTimeSys(millis(now)));
    ctx.notifier = notifier.clone();
    ctx.series_metadata = series_metadata.clone();
    ctx.payments = payments.clone();
    ctx.repos.ratings = ratings.clone();

    TestApp {
        ctx,
        scheduler,
        notifier,
        series_metadata,
        payments,
        ratings,
    }
}
