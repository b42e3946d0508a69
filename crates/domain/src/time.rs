//! Time and timestamp helpers.

use chrono::{DateTime, Duration, Utc};

/// UTC instant used for reservation bounds, measurement times and cache ages.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whole minutes from `from` to `to`, truncated toward zero.
#[must_use]
pub fn minutes_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_minutes()
}

/// Build a [`Duration`] of `minutes` minutes.
#[must_use]
pub fn minutes(minutes: i64) -> Duration {
    Duration::minutes(minutes)
}
