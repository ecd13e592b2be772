//! Total-preserving manual edit balancing.
//!
//! # Algorithm
//!
//! Given an edit (date `d`, quantity `q'`) and a target total:
//!
//! 1. Apply the edit: `q' > 0` inserts/updates `d`, `q' == 0` removes it.
//! 2. `delta = total - target`.
//! 3. Excess (`delta > 0`): walk the other days latest-first, taking as much
//!    of the excess from each as it holds (days reaching 0 are dropped).
//!    Whatever is left comes off `d` itself.
//! 4. Deficit (`delta < 0`): the latest other day absorbs the whole deficit.
//!    With no other day, a new day at `next_working_day(last date)` is
//!    proposed; the caller confirms or declines. Declining restores the
//!    pre-edit schedule exactly.
//!
//! Every accepted edit ends with `total == target`.
//!
//! The tail-first walk concentrates corrections on the most recent days and
//! does not search for a least-disruptive redistribution.
//!
//! # Two-Phase Use
//!
//! [`begin_manual_edit`] never blocks: it returns either the applied result
//! or a [`PendingDayCreation`] the caller resolves later.
//! [`apply_manual_edit`] wraps this with an injected decision function.

use chrono::NaiveDate;
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::error::{clamp_quantity, EngineResult};
use crate::models::{Schedule, WorkingCalendar};

/// What the balancer did to honour the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditEffect {
    /// The edit alone met the target; no other day was touched.
    NoCorrection,
    /// Existing days absorbed the difference.
    Redistributed,
    /// A new day was created to hold the deficit.
    DayCreated,
    /// Day creation was declined; the pre-edit schedule is returned.
    Reverted,
}

/// Result of a completed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    /// Resulting schedule.
    pub schedule: Schedule,
    /// What happened.
    pub effect: EditEffect,
}

impl EditResult {
    /// Whether the edit was kept (the process becomes manually overridden).
    pub fn is_accepted(&self) -> bool {
        self.effect != EditEffect::Reverted
    }
}

/// An edit waiting for a decision on creating a new day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDayCreation {
    original: Schedule,
    edited: Schedule,
    /// Date the new day would be created on.
    pub date: NaiveDate,
    /// Deficit the new day would hold.
    pub quantity: u64,
}

impl PendingDayCreation {
    /// Creates the proposed day.
    pub fn confirm(self) -> EditResult {
        let mut schedule = self.edited;
        let existing = schedule.quantity_on(self.date);
        schedule.set(self.date, existing.saturating_add(self.quantity));
        debug!(date = %self.date, quantity = self.quantity, "day created for deficit");
        EditResult {
            schedule,
            effect: EditEffect::DayCreated,
        }
    }

    /// Drops the edit and restores the pre-edit schedule.
    pub fn decline(self) -> EditResult {
        warn!(date = %self.date, quantity = self.quantity, "day creation declined, edit reverted");
        EditResult {
            schedule: self.original,
            effect: EditEffect::Reverted,
        }
    }

    /// Resolves with a decision.
    pub fn resolve(self, confirmed: bool) -> EditResult {
        if confirmed {
            self.confirm()
        } else {
            self.decline()
        }
    }

    /// Schedule as it stands after the edit, before the new day.
    pub fn edited(&self) -> &Schedule {
        &self.edited
    }
}

/// Outcome of the first phase of an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit is complete.
    Applied(EditResult),
    /// A new day must be confirmed or declined.
    NeedsConfirmation(PendingDayCreation),
}

/// Applies an edit, asking `confirm_create_day` when a new day is needed.
///
/// `quantity` below zero is clamped to zero.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_balance::models::{Schedule, WorkingCalendar};
/// use u_balance::scheduler::apply_manual_edit;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap();
/// let s = Schedule::from_pairs([(day(1), 100), (day(2), 100)]);
/// let result = apply_manual_edit(&s, day(1), 40, 200, &WorkingCalendar::new(), |_| true);
/// assert_eq!(result.schedule.quantity_on(day(2)), 160);
/// assert_eq!(result.schedule.total(), 200);
/// ```
pub fn apply_manual_edit<F>(
    schedule: &Schedule,
    date: NaiveDate,
    quantity: i64,
    target_total: u64,
    calendar: &WorkingCalendar,
    confirm_create_day: F,
) -> EditResult
where
    F: FnOnce(&PendingDayCreation) -> bool,
{
    match begin_manual_edit(schedule, date, quantity, target_total, calendar) {
        EditOutcome::Applied(result) => result,
        EditOutcome::NeedsConfirmation(pending) => {
            let confirmed = confirm_create_day(&pending);
            pending.resolve(confirmed)
        }
    }
}

/// First phase of an edit. Never blocks on a decision.
pub fn begin_manual_edit(
    schedule: &Schedule,
    date: NaiveDate,
    quantity: i64,
    target_total: u64,
    calendar: &WorkingCalendar,
) -> EditOutcome {
    let next_day = |from| Ok::<_, Infallible>(calendar.next_working_day(from));
    match balance(schedule, date, clamp_quantity(quantity), target_total, next_day) {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

/// [`begin_manual_edit`] with a scan cap on finding the new day.
pub fn checked_begin_manual_edit(
    schedule: &Schedule,
    date: NaiveDate,
    quantity: i64,
    target_total: u64,
    calendar: &WorkingCalendar,
    max_scan: u32,
) -> EngineResult<EditOutcome> {
    balance(
        schedule,
        date,
        clamp_quantity(quantity),
        target_total,
        |from| calendar.checked_next_working_day(from, max_scan),
    )
}

fn balance<N, E>(
    original: &Schedule,
    date: NaiveDate,
    quantity: u64,
    target: u64,
    next_day: N,
) -> Result<EditOutcome, E>
where
    N: FnOnce(NaiveDate) -> Result<NaiveDate, E>,
{
    let mut schedule = original.clone();
    schedule.set(date, quantity);

    let total = schedule.total();
    debug!(%date, quantity, total, target, "manual edit applied");

    if total == target {
        return Ok(applied(schedule, EditEffect::NoCorrection));
    }

    if total > target {
        absorb_excess(&mut schedule, date, total - target);
        return Ok(applied(schedule, EditEffect::Redistributed));
    }

    let deficit = target - total;
    let latest_other = schedule.iter().rev().find(|e| e.date != date).copied();
    if let Some(entry) = latest_other {
        debug!(date = %entry.date, deficit, "deficit absorbed by latest day");
        schedule.set(entry.date, entry.quantity.saturating_add(deficit));
        return Ok(applied(schedule, EditEffect::Redistributed));
    }

    let anchor = schedule.last_date().unwrap_or(date);
    let new_day = next_day(anchor)?;
    Ok(EditOutcome::NeedsConfirmation(PendingDayCreation {
        original: original.clone(),
        edited: schedule,
        date: new_day,
        quantity: deficit,
    }))
}

/// Removes `excess` latest-first from days other than `edited`, then from `edited`.
fn absorb_excess(schedule: &mut Schedule, edited: NaiveDate, mut excess: u64) {
    let others: Vec<_> = schedule
        .iter()
        .rev()
        .filter(|e| e.date != edited)
        .copied()
        .collect();

    for entry in others {
        if excess == 0 {
            break;
        }
        let taken = entry.quantity.min(excess);
        schedule.set(entry.date, entry.quantity - taken);
        excess -= taken;
        debug!(date = %entry.date, taken, "excess absorbed");
    }

    if excess > 0 {
        let own = schedule.quantity_on(edited);
        schedule.set(edited, own.saturating_sub(excess));
    }
}

fn applied(schedule: Schedule, effect: EditEffect) -> EditOutcome {
    EditOutcome::Applied(EditResult { schedule, effect })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn never(_: &PendingDayCreation) -> bool {
        panic!("confirmation not expected")
    }

    #[test]
    fn test_edit_meets_target_directly() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 100)]);
        let r = apply_manual_edit(&s, d(4, 1), 50, 150, &cal, never);
        assert_eq!(r.effect, EditEffect::NoCorrection);
        assert_eq!(r.schedule, Schedule::from_pairs([(d(4, 1), 50), (d(4, 2), 100)]));
    }

    #[test]
    fn test_no_op_edit_leaves_schedule_unchanged() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 100)]);
        let r = apply_manual_edit(&s, d(4, 2), 100, 200, &cal, never);
        assert_eq!(r.schedule, s);
        assert_eq!(r.effect, EditEffect::NoCorrection);
    }

    #[test]
    fn test_excess_on_single_day_reduces_edited_day() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(5, 1), 200)]);
        let r = apply_manual_edit(&s, d(5, 1), 250, 200, &cal, never);
        assert_eq!(r.schedule, s);
        assert_eq!(r.schedule.total(), 200);
    }

    #[test]
    fn test_excess_taken_latest_first() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 100), (d(4, 3), 30)]);
        // Total 230 target 230; raise 04-01 to 180 → excess 80.
        let r = apply_manual_edit(&s, d(4, 1), 180, 230, &cal, never);
        // 04-03 gives 30 (dropped), 04-02 gives 50.
        assert_eq!(r.schedule, Schedule::from_pairs([(d(4, 1), 180), (d(4, 2), 50)]));
        assert_eq!(r.effect, EditEffect::Redistributed);
    }

    #[test]
    fn test_excess_spills_back_onto_edited_day() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 10), (d(4, 2), 10)]);
        let r = apply_manual_edit(&s, d(4, 2), 100, 20, &cal, never);
        assert_eq!(r.schedule, Schedule::from_pairs([(d(4, 2), 20)]));
    }

    #[test]
    fn test_excess_can_drop_edited_day() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 10)]);
        let r = apply_manual_edit(&s, d(4, 3), 5, 0, &cal, never);
        assert!(r.schedule.is_empty());
        assert!(r.is_accepted());
    }

    #[test]
    fn test_deficit_lands_on_latest_other_day() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 100), (d(4, 3), 100)]);
        let r = apply_manual_edit(&s, d(4, 3), 40, 300, &cal, never);
        // Whole deficit of 60 on 04-02; 04-01 untouched.
        assert_eq!(
            r.schedule,
            Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 160), (d(4, 3), 40)])
        );
    }

    #[test]
    fn test_deficit_when_edited_day_removed() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 100)]);
        let r = apply_manual_edit(&s, d(4, 2), 0, 200, &cal, never);
        assert_eq!(r.schedule, Schedule::from_pairs([(d(4, 1), 200)]));
    }

    #[test]
    fn test_deficit_without_other_days_needs_confirmation() {
        let cal = WorkingCalendar::weekdays();
        // Fri 05-03 is the only day.
        let s = Schedule::from_pairs([(d(5, 3), 200)]);
        let outcome = begin_manual_edit(&s, d(5, 3), 150, 200, &cal);
        let EditOutcome::NeedsConfirmation(pending) = outcome else {
            panic!("expected confirmation request");
        };
        assert_eq!(pending.date, d(5, 6)); // next Monday
        assert_eq!(pending.quantity, 50);
        assert_eq!(pending.edited().quantity_on(d(5, 3)), 150);

        let confirmed = pending.clone().confirm();
        assert_eq!(confirmed.effect, EditEffect::DayCreated);
        assert_eq!(confirmed.schedule, Schedule::from_pairs([(d(5, 3), 150), (d(5, 6), 50)]));

        let declined = pending.decline();
        assert_eq!(declined.effect, EditEffect::Reverted);
        assert_eq!(declined.schedule, s);
        assert!(!declined.is_accepted());
    }

    #[test]
    fn test_decline_removes_newly_inserted_entry() {
        let cal = WorkingCalendar::new();
        let s = Schedule::new();
        let r = apply_manual_edit(&s, d(6, 10), 5, 20, &cal, |p| {
            assert_eq!(p.date, d(6, 11));
            assert_eq!(p.quantity, 15);
            false
        });
        assert!(r.schedule.is_empty());
        assert_eq!(r.effect, EditEffect::Reverted);
    }

    #[test]
    fn test_empty_after_edit_anchors_on_edit_date() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(6, 10), 5)]);
        let r = apply_manual_edit(&s, d(6, 10), 0, 5, &cal, |_| true);
        assert_eq!(r.schedule, Schedule::from_pairs([(d(6, 11), 5)]));
        assert_eq!(r.effect, EditEffect::DayCreated);
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let cal = WorkingCalendar::new();
        let s = Schedule::from_pairs([(d(4, 1), 100), (d(4, 2), 100)]);
        let r = apply_manual_edit(&s, d(4, 1), -30, 200, &cal, never);
        assert_eq!(r.schedule, Schedule::from_pairs([(d(4, 2), 200)]));
    }

    #[test]
    fn test_checked_begin_degenerate_calendar() {
        let start = d(1, 1);
        let cal = WorkingCalendar::new().with_holidays(start.iter_days().skip(1).take(100));
        let s = Schedule::from_pairs([(start, 10)]);
        assert!(checked_begin_manual_edit(&s, start, 5, 10, &cal, 30).is_err());
        // No new day needed → no scan.
        assert!(checked_begin_manual_edit(&s, start, 10, 10, &cal, 30).is_ok());
    }
}
