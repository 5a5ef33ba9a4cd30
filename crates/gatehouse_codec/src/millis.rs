//! Millisecond-epoch timestamp conversions.
//!
//! Records store timestamps as integer milliseconds since the epoch. On
//! optional fields, `0` (or absent) means "unset", not epoch-zero.

use chrono::{DateTime, TimeZone, Utc};

/// Converts a domain timestamp to its stored form.
#[must_use]
pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Converts an optional domain timestamp to its stored form.
///
/// `None` is stored as `0`.
#[must_use]
pub fn opt_to_millis(ts: Option<DateTime<Utc>>) -> i64 {
    ts.map_or(0, to_millis)
}

/// Converts a stored timestamp back to a domain value.
///
/// Out-of-range inputs clamp to the epoch; in practice stored values were
/// produced by [`to_millis`].
#[must_use]
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Converts a stored optional timestamp back to a domain value.
///
/// `0` means unset and maps to `None`.
#[must_use]
pub fn opt_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    if ms == 0 {
        None
    } else {
        Some(from_millis(ms))
    }
}
