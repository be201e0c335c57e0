//! Date/time helpers shared by entity schemas that carry timestamps
//! (creation dates, expiry dates, and the like). Kept separate from the
//! cache machinery proper, since nothing here touches identity or
//! storage.

use crate::error::CacheError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// A point in time, always UTC. A thin alias over `chrono`'s type so
/// call sites don't need to name `Utc` themselves.
pub type Datetime = DateTime<Utc>;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

#[must_use]
pub fn datetime_to_timestamp(dt: Datetime) -> Timestamp {
    dt.timestamp()
}

#[must_use]
pub fn timestamp_to_datetime(ts: Timestamp) -> Datetime {
    Utc.timestamp_opt(ts, 0)
        .single()
        .expect("timestamp produced by datetime_to_timestamp is always representable")
}

/// Parses a bare `YYYY-MM-DD` date as midnight UTC and returns its Unix
/// timestamp.
pub fn parse_iso_date_to_timestamp(s: &str) -> Result<Timestamp, CacheError> {
    Ok(datetime_to_timestamp(parse_iso_date(s)?))
}

/// Parses a bare `YYYY-MM-DD` date as midnight UTC.
pub fn parse_iso_date(s: &str) -> Result<Datetime, CacheError> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|err| CacheError::Parse(format!("invalid ISO date {s:?}: {err}")))?;
    let naive = date.and_hms_opt(0, 0, 0).expect("midnight is always a valid time");
    Ok(Utc.from_utc_datetime(&naive))
}
