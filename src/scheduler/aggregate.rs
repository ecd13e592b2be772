//! View-level projection.
//!
//! Scales a base schedule by a view multiplier for display:
//! `round(quantity * multiplier)`, ties away from zero. Days that round
//! to 0 are omitted like any other zero entry. Projection is read-only;
//! edits are accepted only at the editable level.

use crate::error::clamp_quantity;
use crate::models::{DailyQuantity, Schedule, ViewLevel, ViewLevelSpec};

/// Projects a base schedule for display at `level`.
pub fn project_for_view(schedule: &Schedule, level: &ViewLevelSpec) -> Schedule {
    if level.multiplier.is_one() {
        return schedule.clone();
    }
    schedule
        .iter()
        .map(|e| DailyQuantity::new(e.date, level.multiplier.apply(e.quantity)))
        .collect()
}

/// Result of translating a displayed edit into base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEdit {
    /// Edit accepted; quantity in base units.
    Base(u64),
    /// The level is read-only; the edit is a no-op.
    NotEditable(ViewLevel),
}

/// Converts a quantity entered at `level` to base units.
///
/// Negative input clamps to zero. Read-only levels yield
/// [`ViewEdit::NotEditable`] rather than an error.
pub fn edit_at_level(level: &ViewLevelSpec, displayed_quantity: i64) -> ViewEdit {
    if !level.editable {
        return ViewEdit::NotEditable(level.level);
    }
    ViewEdit::Base(base_quantity_for_level(level, displayed_quantity))
}

/// Undoes a level's multiplier on a displayed quantity.
pub fn base_quantity_for_level(level: &ViewLevelSpec, displayed_quantity: i64) -> u64 {
    level
        .multiplier
        .invert_apply(clamp_quantity(displayed_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Multiplier;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn package() -> ViewLevelSpec {
        ViewLevelSpec::read_only(ViewLevel::Package, Multiplier::new(1, 4).unwrap())
    }

    #[test]
    fn test_base_projection_is_identity() {
        let s = Schedule::from_pairs([(d(1), 7), (d(2), 3)]);
        assert_eq!(project_for_view(&s, &ViewLevelSpec::base()), s);
    }

    #[test]
    fn test_projection_rounds_and_drops_zero() {
        let s = Schedule::from_pairs([(d(1), 10), (d(2), 6), (d(3), 1)]);
        let p = project_for_view(&s, &package());
        // 2.5 → 3, 1.5 → 2, 0.25 → 0 (dropped)
        assert_eq!(p, Schedule::from_pairs([(d(1), 3), (d(2), 2)]));
    }

    #[test]
    fn test_projection_scales_up() {
        let wheels = ViewLevelSpec::read_only(ViewLevel::Component, Multiplier::new(4, 1).unwrap());
        let s = Schedule::from_pairs([(d(1), 25)]);
        assert_eq!(project_for_view(&s, &wheels).total(), 100);
    }

    #[test]
    fn test_edit_at_read_only_level() {
        assert_eq!(
            edit_at_level(&package(), 10),
            ViewEdit::NotEditable(ViewLevel::Package)
        );
    }

    #[test]
    fn test_edit_at_base_level() {
        assert_eq!(edit_at_level(&ViewLevelSpec::base(), 12), ViewEdit::Base(12));
        assert_eq!(edit_at_level(&ViewLevelSpec::base(), -3), ViewEdit::Base(0));
    }

    #[test]
    fn test_base_quantity_for_level() {
        assert_eq!(base_quantity_for_level(&package(), 3), 12);
    }
}
