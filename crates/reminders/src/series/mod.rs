mod check_release;
mod restart_chains;
mod subscribe;
mod unsubscribe;

pub use check_release::SeriesCheckUseCase;
pub use restart_chains::RestartSeriesChainsUseCase;
pub use subscribe::SubscribeSeriesUseCase;
pub use unsubscribe::UnsubscribeSeriesUseCase;

use chrono::NaiveDate;
use kinobot_domain::{
    next_unreleased_episode, series_check_job_id, ChatId, JobPayload, SeriesCheckKind,
};
use kinobot_infra::KinobotContext;
use tracing::debug;

/// Schedules the single successor of a show's watcher chain: an
/// announcement the day before the nearest episode releasing after
/// `after`, or a recheck a few weeks out when no dated episode is
/// known. `newer_than` carries the episode an announce firing just
/// covered, keeping same-day siblings eligible without re-announcing
/// it.
///
/// At most one chain per (chat, show): when an announce or recheck job
/// is already pending nothing is scheduled, so concurrent subscribers
/// cannot fork the chain. Returns the kind scheduled, or `None` when a
/// chain was already running.
pub(crate) async fn schedule_next_series_check(
    ctx: &KinobotContext,
    chat_id: ChatId,
    show_id: i64,
    after: NaiveDate,
    newer_than: Option<(u32, u32)>,
) -> anyhow::Result<Option<SeriesCheckKind>> {
    if let Some(pending) = pending_check_job(ctx, chat_id, show_id) {
        debug!(
            "Chat {} already has a pending check for show {}: {}",
            chat_id, show_id, pending
        );
        return Ok(None);
    }

    let episodes = ctx.series_metadata.episodes(show_id).await?;
    let next = next_unreleased_episode(&episodes, after, newer_than)
        .and_then(|ep| ep.release_date.map(|release| (ep.season, ep.episode, release)));

    let (kind, fire_at) = match next {
        Some((season, episode, release)) => {
            let announce_day = release - chrono::Duration::days(1);
            let fire_at = announce_day
                .and_hms_opt(ctx.config.series_announce_hour.min(23), 0, 0)
                .expect("Clamped hour is always valid")
                .and_utc()
                .timestamp_millis();
            (SeriesCheckKind::Announce { season, episode }, fire_at)
        }
        None => {
            let now = ctx.sys.get_timestamp_millis();
            let fire_at = now + ctx.config.series_recheck_weeks * 7 * 24 * 60 * 60 * 1000;
            (SeriesCheckKind::Recheck, fire_at)
        }
    };

    schedule_check(ctx, chat_id, show_id, kind.clone(), fire_at);
    Ok(Some(kind))
}

/// Schedules a recheck one poll interval out without touching the
/// metadata service. The fallback successor when the service is down.
pub(crate) fn schedule_recheck(ctx: &KinobotContext, chat_id: ChatId, show_id: i64) {
    let now = ctx.sys.get_timestamp_millis();
    let fire_at = now + ctx.config.series_recheck_weeks * 7 * 24 * 60 * 60 * 1000;
    schedule_check(ctx, chat_id, show_id, SeriesCheckKind::Recheck, fire_at);
}

fn schedule_check(
    ctx: &KinobotContext,
    chat_id: ChatId,
    show_id: i64,
    kind: SeriesCheckKind,
    fire_at: i64,
) {
    let job_id = series_check_job_id(&kind, chat_id, show_id, fire_at);
    ctx.scheduler.schedule_once(
        job_id,
        fire_at,
        JobPayload::SeriesCheck {
            chat_id,
            show_id,
            kind,
        },
    );
}

fn pending_check_job(ctx: &KinobotContext, chat_id: ChatId, show_id: i64) -> Option<String> {
    let prefixes = [
        format!("series_announce_{}_{}_", chat_id, show_id),
        format!("series_recheck_{}_{}_", chat_id, show_id),
    ];
    ctx.scheduler
        .job_ids()
        .into_iter()
        .find(|id| prefixes.iter().any(|prefix| id.starts_with(prefix)))
}
