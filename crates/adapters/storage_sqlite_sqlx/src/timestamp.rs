//! Text encoding of timestamps.
//!
//! Every stored instant uses the same width and the `Z` suffix, so `SQLite`
//! string comparison and `ORDER BY` follow chronological order.

use chrono::{DateTime, SecondsFormat};
use rate_domain::time::Timestamp;

pub(crate) fn encode(at: Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode(raw: &str) -> Result<Timestamp, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
