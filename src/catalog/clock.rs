//! Time source for modification timestamps

use std::time::{SystemTime, UNIX_EPOCH};

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds since the unix epoch
    fn now_millis(&self) -> u64;
}

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
