//! Schedule summary metrics.
//!
//! Read-only figures for status bars and exports.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Sum of daily quantities |
//! | Active days | Days with a non-zero quantity |
//! | Span | First to last scheduled date |
//! | Peak | Largest single day (earliest on ties) |
//! | Average | Total / active days |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyQuantity, Schedule};

/// Summary of one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Sum of quantities.
    pub total: u64,
    /// Number of scheduled days.
    pub active_days: usize,
    /// Earliest scheduled date.
    pub first_date: Option<NaiveDate>,
    /// Latest scheduled date.
    pub last_date: Option<NaiveDate>,
    /// Largest day.
    pub peak: Option<DailyQuantity>,
    /// Mean quantity per scheduled day (0.0 when empty).
    pub average_per_day: f64,
}

impl ScheduleSummary {
    /// Computes the summary of a schedule.
    pub fn calculate(schedule: &Schedule) -> Self {
        let total = schedule.total();
        let active_days = schedule.len();
        let peak = schedule
            .iter()
            .copied()
            .reduce(|best, e| if e.quantity > best.quantity { e } else { best });

        let average_per_day = if active_days == 0 {
            0.0
        } else {
            total as f64 / active_days as f64
        };

        Self {
            total,
            active_days,
            first_date: schedule.first_date(),
            last_date: schedule.last_date(),
            peak,
            average_per_day,
        }
    }

    /// Signed difference between this total and `target`.
    pub fn deviation_from(&self, target: u64) -> i128 {
        self.total as i128 - target as i128
    }

    /// Whether the total equals `target`.
    pub fn is_balanced_against(&self, target: u64) -> bool {
        self.total == target
    }
}
