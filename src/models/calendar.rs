//! Working-day calendar.
//!
//! Decides which calendar days are working days and steps across them.
//!
//! # Working Day Rule
//! A day is working iff:
//! - It is NOT listed in `holidays`, AND
//! - If `weekends_excluded`, it is not a Saturday or Sunday.
//!
//! # Stepping
//! `add_working_days(d, n)` counts only days strictly after (n > 0) or
//! strictly before (n < 0) `d`. The start day is never counted, and
//! `n == 0` returns `d` untouched even if it is not a working day.
//!
//! The unguarded operations loop until they find enough working days.
//! A calendar with no working days in reach makes them walk one day at a
//! time to the end of chrono's date range (about 10^8 days, i.e. hundreds
//! of millions of iterations) before saturating. Use the `checked_*`
//! variants with a scan cap whenever the calendar is not known to have
//! working days near every date.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{parse_date, strict_date, EngineError, EngineResult};

/// Working/non-working day predicate plus holiday set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingCalendar {
    /// Saturdays and Sundays are non-working when set.
    pub weekends_excluded: bool,
    /// Explicit non-working days.
    #[serde(default, deserialize_with = "strict_date::deserialize_set")]
    pub holidays: BTreeSet<NaiveDate>,
}

impl WorkingCalendar {
    /// Creates a calendar where every day is a working day.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Monday-to-Friday calendar without holidays.
    pub fn weekdays() -> Self {
        Self::new().with_weekends_excluded(true)
    }

    /// Sets whether weekends are excluded.
    pub fn with_weekends_excluded(mut self, excluded: bool) -> Self {
        self.weekends_excluded = excluded;
        self
    }

    /// Adds a holiday.
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    /// Adds several holidays.
    pub fn with_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(dates);
        self
    }

    /// Adds holidays given as `YYYY-MM-DD` strings.
    ///
    /// Fails on the first malformed string; nothing is coerced.
    pub fn with_holiday_strs<'a>(
        mut self,
        dates: impl IntoIterator<Item = &'a str>,
    ) -> EngineResult<Self> {
        for s in dates {
            self.holidays.insert(parse_date(s)?);
        }
        Ok(self)
    }

    /// Whether `date` is a working day.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        if self.holidays.contains(&date) {
            return false;
        }
        !(self.weekends_excluded && matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
    }

    /// Steps `n` working days forward (n > 0) or backward (n < 0).
    ///
    /// Saturates at the bounds of the representable date range. On a
    /// calendar without working days in reach, that means stepping through
    /// hundreds of millions of days first; prefer
    /// [`checked_add_working_days`](Self::checked_add_working_days) there.
    pub fn add_working_days(&self, date: NaiveDate, n: i32) -> NaiveDate {
        let forward = n > 0;
        let mut remaining = n.unsigned_abs();
        let mut current = date;
        while remaining > 0 {
            match step(current, forward) {
                Some(next) => current = next,
                None => break,
            }
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        current
    }

    /// Smallest working day strictly after `date`.
    ///
    /// Same cost caveat as [`add_working_days`](Self::add_working_days).
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        self.add_working_days(date, 1)
    }

    /// Like [`add_working_days`](Self::add_working_days), but gives up when
    /// `max_scan` consecutive non-working days are crossed.
    pub fn checked_add_working_days(
        &self,
        date: NaiveDate,
        n: i32,
        max_scan: u32,
    ) -> EngineResult<NaiveDate> {
        let forward = n > 0;
        let mut remaining = n.unsigned_abs();
        let mut current = date;
        let mut idle: u32 = 0;
        while remaining > 0 {
            if idle >= max_scan {
                return Err(EngineError::NoWorkingDay {
                    from: date,
                    scanned: max_scan,
                });
            }
            current = step(current, forward).ok_or(EngineError::NoWorkingDay {
                from: date,
                scanned: idle,
            })?;
            if self.is_working_day(current) {
                remaining -= 1;
                idle = 0;
            } else {
                idle += 1;
            }
        }
        Ok(current)
    }

    /// Guarded [`next_working_day`](Self::next_working_day).
    pub fn checked_next_working_day(
        &self,
        date: NaiveDate,
        max_scan: u32,
    ) -> EngineResult<NaiveDate> {
        self.checked_add_working_days(date, 1, max_scan)
    }

    /// Working days among the `len` consecutive calendar days from `start`.
    pub fn working_days_in(&self, start: NaiveDate, len: u32) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take(len as usize)
            .filter(|d| self.is_working_day(*d))
            .collect()
    }
}

fn step(date: NaiveDate, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.succ_opt()
    } else {
        date.pred_opt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_all_days_working_by_default() {
        let cal = WorkingCalendar::new();
        assert!(cal.is_working_day(d(2024, 2, 17))); // Saturday
        assert!(cal.is_working_day(d(2024, 2, 18))); // Sunday
    }

    #[test]
    fn test_weekends_excluded() {
        let cal = WorkingCalendar::weekdays();
        assert!(cal.is_working_day(d(2024, 2, 16))); // Friday
        assert!(!cal.is_working_day(d(2024, 2, 17)));
        assert!(!cal.is_working_day(d(2024, 2, 18)));
        assert!(cal.is_working_day(d(2024, 2, 19))); // Monday
    }

    #[test]
    fn test_holiday_overrides_weekday() {
        let cal = WorkingCalendar::weekdays().with_holiday(d(2024, 2, 19));
        assert!(!cal.is_working_day(d(2024, 2, 19)));
    }

    #[test]
    fn test_holiday_strs() {
        let cal = WorkingCalendar::new()
            .with_holiday_strs(["2024-12-25", "2024-01-01"])
            .unwrap();
        assert_eq!(cal.holidays.len(), 2);
        assert!(!cal.is_working_day(d(2024, 12, 25)));

        assert!(WorkingCalendar::new().with_holiday_strs(["2024/12/25"]).is_err());
        assert!(WorkingCalendar::new().with_holiday_strs([" 2024-12-25"]).is_err());
    }

    #[test]
    fn test_add_zero_does_not_snap() {
        let cal = WorkingCalendar::weekdays();
        let sat = d(2024, 2, 17);
        assert_eq!(cal.add_working_days(sat, 0), sat);
    }

    #[test]
    fn test_add_working_days_forward_skips_weekend() {
        let cal = WorkingCalendar::weekdays();
        // Fri + 1 → Mon
        assert_eq!(cal.add_working_days(d(2024, 2, 16), 1), d(2024, 2, 19));
        // Sat + 1 → Mon (start day never counted)
        assert_eq!(cal.add_working_days(d(2024, 2, 17), 1), d(2024, 2, 19));
        assert_eq!(cal.add_working_days(d(2024, 2, 15), 3), d(2024, 2, 20));
    }

    #[test]
    fn test_add_working_days_backward() {
        let cal = WorkingCalendar::weekdays();
        assert_eq!(cal.add_working_days(d(2024, 2, 15), -3), d(2024, 2, 12));
        // Mon - 1 → previous Fri
        assert_eq!(cal.add_working_days(d(2024, 2, 19), -1), d(2024, 2, 16));
        // Sun - 3 → Wed, Thu, Fri counted backward
        assert_eq!(cal.add_working_days(d(2024, 2, 18), -3), d(2024, 2, 14));
    }

    #[test]
    fn test_add_working_days_with_holiday() {
        let cal = WorkingCalendar::weekdays().with_holiday(d(2024, 2, 19));
        assert_eq!(cal.add_working_days(d(2024, 2, 16), 1), d(2024, 2, 20));
    }

    #[test]
    fn test_next_working_day() {
        let cal = WorkingCalendar::weekdays();
        assert_eq!(cal.next_working_day(d(2024, 2, 15)), d(2024, 2, 16));
        assert_eq!(cal.next_working_day(d(2024, 2, 16)), d(2024, 2, 19));
    }

    #[test]
    fn test_checked_add_matches_unguarded() {
        let cal = WorkingCalendar::weekdays().with_holiday(d(2024, 2, 14));
        for n in -10..=10 {
            let start = d(2024, 2, 15);
            assert_eq!(
                cal.checked_add_working_days(start, n, 30).unwrap(),
                cal.add_working_days(start, n)
            );
        }
    }

    #[test]
    fn test_checked_add_degenerate_calendar() {
        let start = d(2024, 1, 1);
        let cal = WorkingCalendar::new().with_holidays(start.iter_days().skip(1).take(400));
        let err = cal.checked_add_working_days(start, 1, 366).unwrap_err();
        assert!(matches!(err, EngineError::NoWorkingDay { scanned: 366, .. }));
        assert!(cal.checked_next_working_day(start, 366).is_err());
        // Zero steps never scans.
        assert_eq!(cal.checked_add_working_days(start, 0, 0).unwrap(), start);
    }

    #[test]
    fn test_working_days_in() {
        let cal = WorkingCalendar::weekdays();
        let days = cal.working_days_in(d(2024, 2, 15), 7);
        assert_eq!(
            days,
            vec![
                d(2024, 2, 15),
                d(2024, 2, 16),
                d(2024, 2, 19),
                d(2024, 2, 20),
                d(2024, 2, 21)
            ]
        );
        assert!(cal.working_days_in(d(2024, 2, 17), 2).is_empty());
    }

    #[test]
    fn test_calendar_serde() {
        let cal = WorkingCalendar::weekdays().with_holiday(d(2024, 12, 25));
        let json = serde_json::to_string(&cal).unwrap();
        assert_eq!(json, r#"{"weekends_excluded":true,"holidays":["2024-12-25"]}"#);
        let back: WorkingCalendar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cal);

        let lenient = r#"{"weekends_excluded":true,"holidays":["2024-12-5"]}"#;
        assert!(serde_json::from_str::<WorkingCalendar>(lenient).is_err());
        let bare = r#"{"weekends_excluded":false}"#;
        assert!(serde_json::from_str::<WorkingCalendar>(bare).unwrap().holidays.is_empty());
    }
}
