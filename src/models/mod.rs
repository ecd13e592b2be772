//! Production planning domain models.
//!
//! Provides the value types shared by every balancing algorithm:
//! the working calendar, daily schedules, pipeline processes, and
//! display view levels.
//!
//! # Domain Mappings
//!
//! | u-balance | Manufacturing | Logistics |
//! |-----------|--------------|-----------|
//! | Process | Production stage | Handling step |
//! | Primary process | Final assembly | Outbound shipping |
//! | Schedule | Daily production plan | Daily dispatch plan |
//! | View level | Parts / units / packs | Items / cartons / pallets |

mod calendar;
mod process;
mod schedule;
mod view;

pub use calendar::WorkingCalendar;
pub use process::{Process, ProcessMode};
pub use schedule::{DailyQuantity, Schedule};
pub use view::{Multiplier, ViewLevel, ViewLevelSet, ViewLevelSpec};
