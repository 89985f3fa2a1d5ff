//! Time helpers.
//!
//! All string/date conversion happens at the API handler layer;
//! repositories receive `i64` Unix millis and naive date/time values.

use chrono::{Local, NaiveDate, NaiveTime, Utc};

use super::{AppError, AppResult};

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Today's date in local wall-clock time
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local wall-clock time of day
pub fn local_clock() -> NaiveTime {
    Local::now().time()
}

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a cutoff time string (HH:MM), falling back on parse failure
pub fn parse_cutoff(cutoff: &str, fallback: NaiveTime) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse cutoff '{}': {}, falling back to {}",
            cutoff,
            e,
            fallback
        );
        fallback
    })
}

/// Elapsed milliseconds as fractional hours
pub fn millis_to_hours(millis: i64) -> f64 {
    millis as f64 / 3_600_000.0
}

/// Inclusive day span of a date range.
///
/// Both endpoints count: one single day is 1, never less.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    let span = (end - start).num_days() + 1;
    span.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        assert_eq!(
            parse_date("2024-01-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
        );
        assert!(parse_date("03/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn inclusive_days_counts_both_endpoints() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(inclusive_days(d("2024-01-01"), d("2024-01-03")), 3);
        assert_eq!(inclusive_days(d("2024-01-01"), d("2024-01-01")), 1);
        // Inverted ranges are clamped, not negative
        assert_eq!(inclusive_days(d("2024-01-03"), d("2024-01-01")), 1);
    }

    #[test]
    fn parse_cutoff_falls_back_on_garbage() {
        let fallback = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        assert_eq!(
            parse_cutoff("09:15", NaiveTime::MIN),
            NaiveTime::from_hms_opt(9, 15, 0).unwrap()
        );
        assert_eq!(parse_cutoff("late-ish", fallback), fallback);
    }

    #[test]
    fn millis_to_hours_converts() {
        assert_eq!(millis_to_hours(3_600_000), 1.0);
        assert_eq!(millis_to_hours(1_800_000), 0.5);
    }
}
