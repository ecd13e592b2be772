//! Production process model.
//!
//! A process is one stage of the pipeline. Exactly one process in a set
//! is primary; the others derive their schedules from it by a signed
//! working-day offset unless frozen or manually overridden.

use serde::{Deserialize, Serialize};

use super::Schedule;

/// A pipeline stage and its daily schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Opaque process identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Working days this stage runs relative to the primary (negative = earlier).
    pub offset_working_days: i32,
    /// Whether this is the authoritative stage.
    pub is_primary: bool,
    /// Schedule was edited by hand and is exempt from recomputation.
    #[serde(default)]
    pub is_manual_override: bool,
    /// Excluded from recomputation regardless of override state.
    #[serde(default)]
    pub is_frozen: bool,
    /// Planned daily output.
    #[serde(default)]
    pub schedule: Schedule,
}

/// How a process's schedule is maintained.
///
/// Resolved from the process flags. Presentation layers map this to
/// icons or labels; the engine never deals in display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessMode {
    /// Source of truth for all other processes.
    Primary,
    /// Recomputed from the primary schedule.
    Automatic,
    /// Edited by hand; kept until reset.
    ManualOverride,
    /// Explicitly excluded from recomputation.
    Frozen,
}

impl Process {
    /// Creates a dependent process with the given offset.
    pub fn new(id: impl Into<String>, offset_working_days: i32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            offset_working_days,
            is_primary: false,
            is_manual_override: false,
            is_frozen: false,
            schedule: Schedule::new(),
        }
    }

    /// Creates the primary process (offset 0).
    pub fn primary(id: impl Into<String>) -> Self {
        Self {
            is_primary: true,
            ..Self::new(id, 0)
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the initial schedule.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Marks the process as frozen.
    pub fn frozen(mut self) -> Self {
        self.is_frozen = true;
        self
    }

    /// Marks the process as manually overridden.
    pub fn overridden(mut self) -> Self {
        self.is_manual_override = true;
        self
    }

    /// Current maintenance mode. Frozen takes precedence over override.
    pub fn mode(&self) -> ProcessMode {
        if self.is_primary {
            ProcessMode::Primary
        } else if self.is_frozen {
            ProcessMode::Frozen
        } else if self.is_manual_override {
            ProcessMode::ManualOverride
        } else {
            ProcessMode::Automatic
        }
    }

    /// Whether the offset scheduler maintains this schedule.
    #[inline]
    pub fn is_auto_derived(&self) -> bool {
        self.mode() == ProcessMode::Automatic
    }
}
