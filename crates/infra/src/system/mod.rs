use chrono::Utc;

/// Clock seam for the context. Use cases read time through this trait
/// so tests can pin the current instant.
pub trait ISys: Send + Sync {
    /// Current UTC time in epoch milliseconds
    fn get_timestamp_millis(&self) -> i64;
}

/// The wall clock, installed everywhere outside of tests.
pub struct RealSys {}

impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
