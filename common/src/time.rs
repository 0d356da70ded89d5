//! Clock abstraction and rate-date handling.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::ValidationError;

/// Calendar format used for rate dates.
pub const RATE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to drive expiry deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// Parse a caller-supplied rate date.
///
/// Accepts a plain `YYYY-MM-DD` day or an RFC 3339 timestamp, which is reduced
/// to its UTC calendar date.
pub fn parse_rate_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingDate);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, RATE_DATE_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Render a rate date as `YYYY-MM-DD`.
pub fn format_rate_date(date: NaiveDate) -> String {
    date.format(RATE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_plain_date() {
        let date = parse_rate_date("2022-11-28").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 11, 28).unwrap());
        assert_eq!(format_rate_date(date), "2022-11-28");
    }

    #[test]
    fn test_parse_timestamp_uses_utc_day() {
        let date = parse_rate_date("2024-01-01T23:30:00-02:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_rate_date("  "), Err(ValidationError::MissingDate));
        assert!(matches!(
            parse_rate_date("28/11/2022"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(parse_rate_date("2022-02-30").is_err());
    }

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2022, 11, 28, 23, 59, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(2));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2022, 11, 29).unwrap());
    }

    #[test]
    fn test_dates_order_chronologically() {
        let older = parse_rate_date("2022-11-28").unwrap();
        let newer = parse_rate_date("2024-01-01").unwrap();
        assert!(older < newer);
    }
}
