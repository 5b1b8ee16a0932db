use tracing::warn;

/// Runtime settings for the reminder engine, read from the environment
/// with logged fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds between catch-up reconciler sweeps
    pub catch_up_interval_secs: u64,
    /// How long after its trigger an unsent reminder may still be sent.
    /// Anything later is deliberately dropped instead of surprising a
    /// user hours late.
    pub late_send_grace_minutes: i64,
    /// How far ahead the catch-up sweep rebuilds the schedule
    pub lookahead_hours: i64,
    /// UTC hour of the Monday cinema-vote opener
    pub vote_open_hour: u32,
    /// UTC hour of the Tuesday cinema-vote resolver
    pub vote_resolve_hour: u32,
    /// UTC hour of the daily charge sweep
    pub billing_charge_hour: u32,
    /// UTC hour of the daily "you will be charged tomorrow" sweep
    pub billing_notice_hour: u32,
    /// UTC hour at which episode announcements fire (release dates are
    /// calendar dates without a time of day)
    pub series_announce_hour: u32,
    /// Weeks until a dateless show is polled again
    pub series_recheck_weeks: i64,
    /// Hard timeout for every external HTTP call, in seconds
    pub external_timeout_secs: u64,
    pub notifier_url: String,
    pub notifier_api_key: String,
    pub series_metadata_url: String,
    pub series_metadata_api_key: String,
    pub payment_gateway_url: String,
    pub payment_gateway_api_key: String,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parsed_or<T: std::str::FromStr + std::fmt::Display + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            catch_up_interval_secs: env_parsed_or("CATCH_UP_INTERVAL_SECS", 300),
            late_send_grace_minutes: env_parsed_or("LATE_SEND_GRACE_MINUTES", 30),
            lookahead_hours: env_parsed_or("LOOKAHEAD_HOURS", 24),
            vote_open_hour: env_parsed_or("VOTE_OPEN_HOUR", 18),
            vote_resolve_hour: env_parsed_or("VOTE_RESOLVE_HOUR", 18),
            billing_charge_hour: env_parsed_or("BILLING_CHARGE_HOUR", 9),
            billing_notice_hour: env_parsed_or("BILLING_NOTICE_HOUR", 9),
            series_announce_hour: env_parsed_or("SERIES_ANNOUNCE_HOUR", 12),
            series_recheck_weeks: env_parsed_or("SERIES_RECHECK_WEEKS", 3),
            external_timeout_secs: env_parsed_or("EXTERNAL_TIMEOUT_SECS", 15),
            notifier_url: env_or("NOTIFIER_URL", "http://localhost:8081"),
            notifier_api_key: env_or("NOTIFIER_API_KEY", ""),
            series_metadata_url: env_or("SERIES_METADATA_URL", "http://localhost:8082"),
            series_metadata_api_key: env_or("SERIES_METADATA_API_KEY", ""),
            payment_gateway_url: env_or("PAYMENT_GATEWAY_URL", "http://localhost:8083"),
            payment_gateway_api_key: env_or("PAYMENT_GATEWAY_API_KEY", ""),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
