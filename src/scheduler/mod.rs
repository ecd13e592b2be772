//! Schedule derivation and balancing algorithms.
//!
//! Every function here is pure: it takes schedules and a calendar by
//! reference and returns new values.
//!
//! # Components
//!
//! - **Strip distributor**: even spread of a total over working days.
//! - **Offset scheduler**: dependent schedule = primary shifted by N working days.
//! - **Balancer**: single manual edit with total conservation.
//! - **Aggregator**: multiplier projection for display levels.
//! - **Summary**: read-only schedule metrics.

mod aggregate;
mod balancer;
mod offset;
mod strip;
mod summary;

pub use aggregate::{base_quantity_for_level, edit_at_level, project_for_view, ViewEdit};
pub use balancer::{
    apply_manual_edit, begin_manual_edit, checked_begin_manual_edit, EditEffect, EditOutcome,
    EditResult, PendingDayCreation,
};
pub use offset::{checked_derive_dependent_schedule, derive_dependent_schedule, derive_from_entries};
pub use strip::{distribute, distribute_quantity, DistributionOutcome, StripControls};
pub use summary::ScheduleSummary;
