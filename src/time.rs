use crate::Timestamp;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current timestamp in milliseconds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_the_epoch| since_the_epoch.as_millis() as Timestamp)
        .unwrap_or_default()
}

/// Converts decimal epoch seconds (as found in sample CSV files) to milliseconds,
/// rounding to the nearest millisecond.
///
/// Returns `None` for negative or non-finite input.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seconds_to_millis(seconds: f64) -> Option<Timestamp> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1_000.0).round() as Timestamp)
}

/// Formats a millisecond timestamp as an ISO-8601 UTC instant, e.g. `2024-01-01T00:00:10.000Z`.
#[must_use]
pub fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(
            || ts.to_string(),
            |dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn seconds_conversion() {
        assert_eq!(Some(1_700_000_000_123), seconds_to_millis(1_700_000_000.123));
        assert_eq!(Some(1_500), seconds_to_millis(1.5));
        assert_eq!(Some(0), seconds_to_millis(0.0));
        assert_eq!(None, seconds_to_millis(-1.0));
        assert_eq!(None, seconds_to_millis(f64::NAN));
    }

    #[test_log::test]
    fn iso_format() {
        assert_eq!("1970-01-01T00:00:00.000Z", format_timestamp(0));
        assert_eq!("2023-11-14T22:13:20.000Z", format_timestamp(1_700_000_000_000));
        assert_eq!("1970-01-01T00:00:10.500Z", format_timestamp(10_500));
    }
}
