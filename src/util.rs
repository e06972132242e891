use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current system time in epoch format.
///
/// # Returns
///
/// Current system time in seconds from epoch, or `0` if the system clock is
/// set before the epoch.
#[must_use]
pub fn now_from_epoch() -> u64 {
    to_epoch(SystemTime::now())
}

/// Converts a point in time to seconds from epoch.
///
/// Times before the epoch clamp to `0`.
#[must_use]
pub fn to_epoch(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
