//! # Business Calendar
//!
//! Timestamps are stored in UTC; "today" is the shop's calendar day.
//! A sale rung up at 22:30 in São Paulo is already the next day in UTC,
//! so every date-based rule goes through this type.
//!
//! ```text
//!   UTC       2024-03-10T01:30Z
//!   -03:00    2024-03-09 22:30   ← business day used for rules and reports
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::error::{CoreResult, ValidationError};

/// Default offset of the shop (UTC-03:00, Brasília time).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

/// Maps UTC instants to the shop's calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Builds a calendar from an offset in minutes east of UTC.
    ///
    /// ## Errors
    /// Offsets beyond ±14h are rejected.
    pub fn from_offset_minutes(minutes: i32) -> CoreResult<Self> {
        let offset = Some(minutes)
            .filter(|m| m.abs() <= 14 * 60)
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "business_utc_offset_minutes".to_string(),
                min: -14 * 60,
                max: 14 * 60,
            })?;
        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Calendar day of `at` in the shop's timezone.
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Whether both instants fall on the same business day.
    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_of(a) == self.date_of(b)
    }

    /// Local wall-clock rendering used in exports (`dd/mm/yyyy HH:MM`).
    pub fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%d/%m/%Y %H:%M")
            .to_string()
    }

    /// SQLite date modifier that shifts a UTC timestamp to the business day,
    /// e.g. `"-180 minutes"`.
    pub fn sqlite_modifier(&self) -> String {
        format!("{:+} minutes", self.offset_minutes())
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES).unwrap_or_else(|_| Self::utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_brasilia() {
        assert_eq!(BusinessCalendar::default().offset_minutes(), -180);
    }

    #[test]
    fn test_late_evening_belongs_to_local_day() {
        let cal = BusinessCalendar::default();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 1, 30, 0).unwrap();
        assert_eq!(cal.date_of(at), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(cal.format_local(at), "09/03/2024 22:30");
    }

    #[test]
    fn test_same_day_across_utc_midnight() {
        let cal = BusinessCalendar::default();
        let evening = Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2024, 3, 9, 18, 0, 0).unwrap();
        let next_morning = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        assert!(cal.same_day(afternoon, evening));
        assert!(!cal.same_day(evening, next_morning));
    }

    #[test]
    fn test_offset_bounds() {
        assert!(BusinessCalendar::from_offset_minutes(15 * 60).is_err());
        assert!(BusinessCalendar::from_offset_minutes(330).is_ok());
    }

    #[test]
    fn test_sqlite_modifier() {
        assert_eq!(BusinessCalendar::default().sqlite_modifier(), "-180 minutes");
        assert_eq!(BusinessCalendar::utc().sqlite_modifier(), "+0 minutes");
    }
}
