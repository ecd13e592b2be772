//! Offset-based schedule derivation.
//!
//! # Algorithm
//!
//! 1. Map each primary entry to `add_working_days(entry.date, offset)`.
//! 2. Sum quantities that land on the same target date.
//! 3. Emit the result in ascending date order.
//!
//! Aggregation goes through an ordered map, so the output does not
//! depend on input order. `offset == 0` is the identity.
//!
//! # Complexity
//! O(n log n + n * s) where n = entries, s = days stepped per entry.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::EngineResult;
use crate::models::{DailyQuantity, Schedule, WorkingCalendar};

/// Derives a dependent schedule by shifting every primary entry.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_balance::models::{Schedule, WorkingCalendar};
/// use u_balance::scheduler::derive_dependent_schedule;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap();
/// let primary = Schedule::from_pairs([(day(15), 500), (day(16), 500)]);
/// let dependent = derive_dependent_schedule(&primary, -3, &WorkingCalendar::weekdays());
/// assert_eq!(dependent.quantity_on(day(12)), 500);
/// assert_eq!(dependent.quantity_on(day(13)), 500);
/// ```
pub fn derive_dependent_schedule(
    primary: &Schedule,
    offset_working_days: i32,
    calendar: &WorkingCalendar,
) -> Schedule {
    if offset_working_days == 0 {
        return primary.clone();
    }
    aggregate(primary.iter().map(|e| {
        (
            calendar.add_working_days(e.date, offset_working_days),
            e.quantity,
        )
    }))
}

/// Like [`derive_dependent_schedule`], but fails instead of scanning past
/// `max_scan` consecutive non-working days.
pub fn checked_derive_dependent_schedule(
    primary: &Schedule,
    offset_working_days: i32,
    calendar: &WorkingCalendar,
    max_scan: u32,
) -> EngineResult<Schedule> {
    if offset_working_days == 0 {
        return Ok(primary.clone());
    }
    let shifted = primary
        .iter()
        .map(|e| {
            calendar
                .checked_add_working_days(e.date, offset_working_days, max_scan)
                .map(|date| (date, e.quantity))
        })
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(aggregate(shifted))
}

/// Derives from raw entries in any order, summing duplicates.
pub fn derive_from_entries(
    entries: &[DailyQuantity],
    offset_working_days: i32,
    calendar: &WorkingCalendar,
) -> Schedule {
    aggregate(entries.iter().map(|e| {
        (
            calendar.add_working_days(e.date, offset_working_days),
            e.quantity,
        )
    }))
}

fn aggregate(shifted: impl IntoIterator<Item = (NaiveDate, u64)>) -> Schedule {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for (date, quantity) in shifted {
        let q = by_date.entry(date).or_insert(0);
        *q = q.saturating_add(quantity);
    }
    Schedule::from_map(by_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let cal = WorkingCalendar::weekdays();
        // Includes a Saturday entry: no snapping at offset 0.
        let s = Schedule::from_pairs([(d(2, 16), 10), (d(2, 17), 20)]);
        assert_eq!(derive_dependent_schedule(&s, 0, &cal), s);
    }

    #[test]
    fn test_empty_primary() {
        let cal = WorkingCalendar::weekdays();
        assert!(derive_dependent_schedule(&Schedule::new(), 5, &cal).is_empty());
    }

    #[test]
    fn test_negative_offset_with_weekend_collision() {
        let cal = WorkingCalendar::weekdays();
        let primary = Schedule::from_pairs([
            (d(2, 15), 500),
            (d(2, 16), 500),
            (d(2, 17), 500),
            (d(2, 18), 300),
        ]);
        let dep = derive_dependent_schedule(&primary, -3, &cal);
        // Sat 02-17 and Sun 02-18 both land on Wed 02-14.
        assert_eq!(
            dep,
            Schedule::from_pairs([(d(2, 12), 500), (d(2, 13), 500), (d(2, 14), 800)])
        );
        assert_eq!(dep.total(), primary.total());
    }

    #[test]
    fn test_positive_offset() {
        let cal = WorkingCalendar::weekdays().with_holiday(d(2, 20));
        let primary = Schedule::from_pairs([(d(2, 15), 7), (d(2, 16), 3)]);
        let dep = derive_dependent_schedule(&primary, 2, &cal);
        // Thu+2 → Mon 19; Fri+2 → Mon 19, Tue 20 holiday → Wed 21.
        assert_eq!(dep, Schedule::from_pairs([(d(2, 19), 7), (d(2, 21), 3)]));
    }

    #[test]
    fn test_derive_from_unordered_entries() {
        let cal = WorkingCalendar::new();
        let entries = [
            DailyQuantity::new(d(3, 3), 1),
            DailyQuantity::new(d(3, 1), 2),
            DailyQuantity::new(d(3, 3), 4),
        ];
        let dep = derive_from_entries(&entries, 1, &cal);
        assert_eq!(dep, Schedule::from_pairs([(d(3, 2), 2), (d(3, 4), 5)]));
    }

    #[test]
    fn test_collisions_saturate() {
        let cal = WorkingCalendar::weekdays();
        let max = i64::MAX as u64;
        // Sat and Sun both land on Wed 02-14.
        let primary = Schedule::from_pairs([(d(2, 16), max), (d(2, 17), max), (d(2, 18), max)]);
        let dep = derive_dependent_schedule(&primary, -3, &cal);
        assert_eq!(dep.quantity_on(d(2, 13)), max);
        assert_eq!(dep.quantity_on(d(2, 14)), u64::MAX);
        assert_eq!(dep.total(), u64::MAX);
    }

    #[test]
    fn test_checked_matches_unguarded() {
        let cal = WorkingCalendar::weekdays();
        let primary = Schedule::from_pairs([(d(2, 15), 5), (d(2, 18), 6)]);
        assert_eq!(
            checked_derive_dependent_schedule(&primary, -4, &cal, 30).unwrap(),
            derive_dependent_schedule(&primary, -4, &cal)
        );
    }

    #[test]
    fn test_checked_degenerate_calendar() {
        let start = d(1, 1);
        let cal = WorkingCalendar::new().with_holidays(start.iter_days().skip(1).take(100));
        let primary = Schedule::from_pairs([(start, 5)]);
        assert!(checked_derive_dependent_schedule(&primary, 1, &cal, 50).is_err());
    }
}
