//! Wall-clock helpers

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as used by contest timestamps
pub type Timestamp = f64;

/// Current wall-clock time in seconds (sub-second precision)
pub fn unix_seconds() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}
