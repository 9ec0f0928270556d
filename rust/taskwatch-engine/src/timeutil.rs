//! Time and date utilities.
//!
//! Provides the injectable [`Clock`] abstraction plus the small parsing and
//! formatting helpers the compliance engine needs: strict `HH:MM` parsing,
//! minutes-of-day arithmetic, and calendar-key formatting.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

/// Source of the current wall-clock time.
///
/// The engine never reads the system clock directly; it is constructed with a
/// `Clock` so tests can classify against a fixed instant.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse a strict `HH:MM` time-of-day string.
///
/// Returns `None` for anything that is not exactly two digits, a colon, and
/// two digits within valid hour/minute ranges. Malformed occurrence times are
/// treated as "not scheduled", never as errors.
#[must_use]
pub fn parse_hhmm(value: &str) -> Option<(u32, u32)> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[3].is_ascii_digit()
        || !bytes[4].is_ascii_digit()
    {
        return None;
    }
    let hour: u32 = value[0..2].parse().ok()?;
    let minute: u32 = value[3..5].parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Minutes elapsed since midnight for an hour/minute pair.
#[must_use]
pub fn minutes_of_day(hour: u32, minute: u32) -> i64 {
    i64::from(hour) * 60 + i64::from(minute)
}

/// Minutes elapsed since midnight for a [`NaiveTime`].
#[must_use]
pub fn time_minutes(time: NaiveTime) -> i64 {
    minutes_of_day(time.hour(), time.minute())
}

/// Calendar key used to index occurrence records, `YYYY-MM-DD`.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        assert_eq!(parse_hhmm("00:00"), Some((0, 0)));
        assert_eq!(parse_hhmm("09:05"), Some((9, 5)));
        assert_eq!(parse_hhmm("23:59"), Some((23, 59)));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(parse_hhmm(""), None);
        assert_eq!(parse_hhmm("9:05"), None);
        assert_eq!(parse_hhmm("09:5"), None);
        assert_eq!(parse_hhmm("0905"), None);
        assert_eq!(parse_hhmm("09-05"), None);
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("ab:cd"), None);
    }

    #[test]
    fn minutes_arithmetic() {
        assert_eq!(minutes_of_day(0, 0), 0);
        assert_eq!(minutes_of_day(9, 30), 570);
        assert_eq!(minutes_of_day(23, 59), 1439);
    }

    #[test]
    fn date_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_key(date), "2024-03-05");
    }
}
