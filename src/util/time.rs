//! Expiry arithmetic.

use chrono::{DateTime, TimeDelta, Utc};

/// `from + secs`, saturating at the maximum representable instant.
pub fn offset_by_seconds(from: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
