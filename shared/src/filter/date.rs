//! Date-range bound parsing
//!
//! Bounds arrive as ISO strings from the dashboard. Accepted forms are a
//! plain date (`2024-01-31`), a naive date-time (`2024-01-31T10:00:00`,
//! read as UTC) and a full RFC 3339 timestamp. Anything else yields `None`
//! and the bound is treated as open.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parse an inclusive lower bound into epoch milliseconds
///
/// A plain date starts at 00:00:00.000 UTC.
pub fn parse_lower_bound(raw: &str) -> Option<i64> {
    parse_bound(raw).map(|(millis, _)| millis)
}

/// Parse an inclusive upper bound into epoch milliseconds
///
/// A plain date covers the whole day, through 23:59:59.999 UTC.
pub fn parse_upper_bound(raw: &str) -> Option<i64> {
    parse_bound(raw).map(|(millis, date_only)| {
        if date_only {
            millis + MILLIS_PER_DAY - 1
        } else {
            millis
        }
    })
}

/// Returns the parsed instant and whether the input was a bare date
fn parse_bound(raw: &str) -> Option<(i64, bool)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        return Some((start.timestamp_millis(), true));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some((dt.timestamp_millis(), false));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| (dt.and_utc().timestamp_millis(), false))
}
