//! Even distribution of a total across a date range.
//!
//! # Algorithm
//!
//! 1. Enumerate `duration_days` consecutive calendar days from `start_date`
//!    and keep the working days `W` (k = |W|).
//! 2. If k == 0, nothing can be placed: return an empty schedule.
//! 3. Otherwise every day gets `total / k` and the first `total % k` days
//!    (chronologically) get one extra unit.
//!
//! The output sums to exactly `total` whenever k > 0.
//!
//! A timeline strip ([`StripControls`]) is the caller-facing description of
//! the primary schedule: a start, a length and a total. Drag gestures
//! translate to day deltas on it.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{clamp_quantity, strict_date, EngineError, EngineResult};
use crate::models::{DailyQuantity, Schedule, WorkingCalendar};

/// Result of a distribution, including any quantity that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionOutcome {
    /// Distributed schedule.
    pub schedule: Schedule,
    /// Number of working days in the range.
    pub working_days: usize,
    /// Quantity dropped because the range had no working days.
    pub dropped_quantity: u64,
}

impl DistributionOutcome {
    /// Whether part of the requested total was lost.
    pub fn has_data_loss(&self) -> bool {
        self.dropped_quantity > 0
    }
}

/// Spreads `total_quantity` evenly across the working days of a range.
///
/// Negative totals are clamped to zero. Fails with
/// [`EngineError::InvalidDuration`] when `duration_days < 1`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_balance::models::WorkingCalendar;
/// use u_balance::scheduler::distribute_quantity;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let s = distribute_quantity(start, 5, 17, &WorkingCalendar::new()).unwrap();
/// let q: Vec<u64> = s.iter().map(|e| e.quantity).collect();
/// assert_eq!(q, vec![4, 4, 3, 3, 3]);
/// ```
pub fn distribute_quantity(
    start_date: NaiveDate,
    duration_days: i64,
    total_quantity: i64,
    calendar: &WorkingCalendar,
) -> EngineResult<Schedule> {
    distribute(start_date, duration_days, total_quantity, calendar).map(|o| o.schedule)
}

/// Same as [`distribute_quantity`], reporting working-day count and data loss.
pub fn distribute(
    start_date: NaiveDate,
    duration_days: i64,
    total_quantity: i64,
    calendar: &WorkingCalendar,
) -> EngineResult<DistributionOutcome> {
    if duration_days < 1 {
        return Err(EngineError::InvalidDuration(duration_days));
    }
    let len = u32::try_from(duration_days).unwrap_or(u32::MAX);
    Ok(spread(start_date, len, clamp_quantity(total_quantity), calendar))
}

fn spread(start: NaiveDate, len: u32, total: u64, calendar: &WorkingCalendar) -> DistributionOutcome {
    let days = calendar.working_days_in(start, len);
    let k = days.len() as u64;
    if k == 0 {
        if total > 0 {
            warn!(%start, len, total, "no working days in range, quantity dropped");
        }
        return DistributionOutcome {
            schedule: Schedule::new(),
            working_days: 0,
            dropped_quantity: total,
        };
    }

    let base = total / k;
    let remainder = total % k;
    let schedule = Schedule::from_entries(
        days.iter()
            .enumerate()
            .map(|(i, &date)| DailyQuantity::new(date, base + u64::from((i as u64) < remainder))),
    );
    DistributionOutcome {
        schedule,
        working_days: days.len(),
        dropped_quantity: 0,
    }
}

/// Timeline strip describing the primary schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripControls {
    /// First calendar day of the strip.
    #[serde(deserialize_with = "strict_date::deserialize")]
    pub start_date: NaiveDate,
    /// Length in calendar days (>= 1).
    pub duration_days: u32,
    /// Quantity to spread over the strip.
    pub total_quantity: u64,
}

impl StripControls {
    /// Creates a strip, validating the duration and clamping the total.
    pub fn new(start_date: NaiveDate, duration_days: i64, total_quantity: i64) -> EngineResult<Self> {
        if duration_days < 1 {
            return Err(EngineError::InvalidDuration(duration_days));
        }
        Ok(Self {
            start_date,
            duration_days: u32::try_from(duration_days).unwrap_or(u32::MAX),
            total_quantity: clamp_quantity(total_quantity),
        })
    }

    /// Last calendar day covered by the strip.
    pub fn end_date(&self) -> NaiveDate {
        let span = TimeDelta::days(i64::from(self.duration_days) - 1);
        self.start_date
            .checked_add_signed(span)
            .unwrap_or(NaiveDate::MAX)
    }

    /// Moves the strip by `day_delta` calendar days (drag move).
    ///
    /// Leaves the strip in place if the move leaves the date range.
    pub fn shifted(mut self, day_delta: i64) -> Self {
        if let Some(start) = TimeDelta::try_days(day_delta)
            .and_then(|delta| self.start_date.checked_add_signed(delta))
        {
            self.start_date = start;
        }
        self
    }

    /// Grows or shrinks the strip by `day_delta` days (drag resize).
    ///
    /// The duration never drops below 1 day.
    pub fn resized(mut self, day_delta: i64) -> Self {
        let duration = (i64::from(self.duration_days) + day_delta).clamp(1, i64::from(u32::MAX));
        self.duration_days = duration as u32;
        self
    }

    /// Replaces the total quantity (negative clamps to 0).
    pub fn with_total(mut self, total_quantity: i64) -> Self {
        self.total_quantity = clamp_quantity(total_quantity);
        self
    }

    /// Distributes the strip's total over its working days.
    pub fn to_schedule(&self, calendar: &WorkingCalendar) -> DistributionOutcome {
        spread(self.start_date, self.duration_days, self.total_quantity, calendar)
    }
}
