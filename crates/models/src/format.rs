//! Display formatting of numbers, percentages, durations and timestamps.

use num_format::{Locale, ToFormattedString};
use time::macros::format_description;

use crate::NO_DATA_MARKER;

const SECOND: u64 = 1000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 365 * DAY;

// Largest first.
const DURATION_UNITS: &[(u64, &str, &str)] = &[
    (YEAR, "year", "years"),
    (MONTH, "month", "months"),
    (WEEK, "week", "weeks"),
    (DAY, "day", "days"),
    (HOUR, "hour", "hours"),
    (MINUTE, "minute", "minutes"),
    (SECOND, "second", "seconds"),
    (1, "millisecond", "milliseconds"),
];

const LARGE_NUMBER_SUFFIXES: &[(f64, &str)] = &[
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
];

/// Format `value` to at most `decimals` fractional digits, dropping
/// trailing zeros.
fn trimmed(value: f64, decimals: usize) -> String {
    let mut out = format!("{value:.decimals$}");
    if out.contains('.') {
        let len = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(len);
    }
    if out == "-0" {
        out.remove(0);
    }
    out
}

/// Format a possibly large number compactly: values of a thousand or more
/// are abbreviated with a K, M, B or T suffix.
pub fn format_large_number(value: f64) -> String {
    if !value.is_finite() {
        return NO_DATA_MARKER.to_string();
    }
    for (scale, suffix) in LARGE_NUMBER_SUFFIXES {
        if value.abs() >= *scale {
            return format!("{}{suffix}", trimmed(value / scale, 1));
        }
    }
    trimmed(value, 2)
}

/// Format a ratio as a percentage having at most `decimals` fractional
/// digits. If `signed`, positive values are prefixed with '+'.
/// Ratios beyond 10^5 are rendered in exponential notation.
pub fn format_percentage(ratio: f64, decimals: usize, signed: bool) -> String {
    if ratio.is_nan() {
        return NO_DATA_MARKER.to_string();
    }
    let percent = ratio * 100.0;

    let body = if ratio.abs() > 1e5 {
        format!("{percent:.decimals$e}")
    } else {
        trimmed(percent, decimals)
    };

    if signed && percent > 0.0 {
        format!("+{body}%")
    } else {
        format!("{body}%")
    }
}

/// Format a count with thousands separators.
pub fn format_count(count: usize) -> String {
    count.to_formatted_string(&Locale::en)
}

/// Format the duration between two epoch-millisecond timestamps in its
/// largest whole unit, as in "2 weeks" or "1 hour".
/// Months are 30 days and years are 365 days.
pub fn format_duration(start_ms: i64, end_ms: i64) -> String {
    let elapsed = end_ms.abs_diff(start_ms);

    for (unit, singular, plural) in DURATION_UNITS {
        if elapsed >= *unit {
            let count = elapsed / unit;
            let label = if count == 1 { singular } else { plural };
            return format!("{count} {label}");
        }
    }
    "0 milliseconds".to_string()
}

/// Format an epoch-millisecond timestamp as a UTC date and time,
/// such as "Jan 01, 2020, 08:00 AM".
pub fn format_date_and_time(epoch_ms: i64) -> String {
    let format = format_description!(
        "[month repr:short] [day], [year], [hour repr:12]:[minute] [period]"
    );

    let formatted = time::OffsetDateTime::from_unix_timestamp_nanos(epoch_ms as i128 * 1_000_000)
        .map_err(|err| err.to_string())
        .and_then(|ts| ts.format(&format).map_err(|err| err.to_string()));

    match formatted {
        Ok(formatted) => formatted,
        Err(error) => {
            tracing::debug!(epoch_ms, %error, "timestamp is out of range for formatting");
            epoch_ms.to_string()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_large_numbers() {
        let cases = [
            (0.0, "0"),
            (7.0, "7"),
            (12.3456, "12.35"),
            (-0.001, "0"),
            (999.0, "999"),
            (1000.0, "1K"),
            (1234.0, "1.2K"),
            (-45_600.0, "-45.6K"),
            (1_500_000.0, "1.5M"),
            (2e9, "2B"),
            (3.4e12, "3.4T"),
            (f64::NAN, "-"),
            (f64::INFINITY, "-"),
        ];
        for (value, expect) in cases {
            assert_eq!(format_large_number(value), expect, "{value}");
        }
    }

    #[test]
    fn test_percentages() {
        assert_eq!(format_percentage(0.1234, 2, true), "+12.34%");
        assert_eq!(format_percentage(-0.5, 2, true), "-50%");
        assert_eq!(format_percentage(0.0, 2, true), "0%");
        assert_eq!(format_percentage(0.25, 2, false), "25%");
        assert_eq!(format_percentage(0.123456, 1, false), "12.3%");
        assert_eq!(format_percentage(2e5, 2, true), "+2.00e7%");
        assert_eq!(format_percentage(f64::NAN, 2, true), "-");
    }

    #[test]
    fn test_counts() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_durations_use_largest_whole_unit() {
        let start = 1577865600000;
        let cases = [
            (1609401600000, "1 year"),
            (1640937600000, "2 years"),
            (1580457600000, "1 month"),
            (1583136000000, "2 months"),
            (1578470400000, "1 week"),
            (1579075200000, "2 weeks"),
            (1577952000000, "1 day"),
            (1578038400000, "2 days"),
            (1577869200000, "1 hour"),
            (1577872800000, "2 hours"),
            (1577865660000, "1 minute"),
            (1577865720000, "2 minutes"),
            (1577865601000, "1 second"),
            (1577865602000, "2 seconds"),
            (1577865600001, "1 millisecond"),
            (1577865600002, "2 milliseconds"),
            (1577865600000, "0 milliseconds"),
        ];
        for (end, expect) in cases {
            assert_eq!(format_duration(start, end), expect, "{end}");
        }
        // Reversed bounds measure the same span.
        assert_eq!(format_duration(1577869200000, start), "1 hour");
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(format_date_and_time(1577865600000), "Jan 01, 2020, 08:00 AM");
        assert_eq!(format_date_and_time(1577910600000), "Jan 01, 2020, 08:30 PM");
        assert_eq!(format_date_and_time(0), "Jan 01, 1970, 12:00 AM");
        assert_eq!(format_date_and_time(i64::MAX), i64::MAX.to_string());
    }
}
