//! Process registry: the session snapshot.
//!
//! Holds the calendar, configuration and every process. The registry is
//! immutable: each operation borrows the current snapshot and returns a
//! new one, so callers can keep old snapshots for undo or diffing.
//!
//! # Recomputation
//! Whenever the primary schedule or the calendar changes, every process
//! in [`ProcessMode::Automatic`] is re-derived from the primary before the
//! call returns. Frozen and overridden processes keep their schedules
//! until reset.
//!
//! Calendar stepping inside the registry is capped by
//! [`EngineConfig::max_calendar_scan_days`], so a degenerate calendar
//! surfaces as [`EngineError::NoWorkingDay`] instead of hanging.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{clamp_quantity, EngineError, EngineResult};
use crate::models::{Process, ProcessMode, Schedule, ViewLevel, WorkingCalendar};
use crate::scheduler::{
    checked_begin_manual_edit, checked_derive_dependent_schedule, edit_at_level,
    project_for_view, DistributionOutcome, EditEffect, EditOutcome, EditResult,
    PendingDayCreation, ScheduleSummary, StripControls, ViewEdit,
};
use crate::validation::{validate_processes, ValidationError, ValidationErrorKind};

/// Immutable snapshot of all processes in a planning session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRegistry {
    calendar: WorkingCalendar,
    processes: Vec<Process>,
    #[serde(skip)]
    config: EngineConfig,
    #[serde(skip)]
    primary_index: usize,
}

/// Outcome of the first phase of a registry edit.
#[derive(Debug, Clone)]
pub enum RegistryEdit {
    /// The edit is complete.
    Applied {
        /// New snapshot.
        registry: ProcessRegistry,
        /// Balancer result for the edited process.
        result: EditResult,
    },
    /// A new day must be confirmed or declined.
    NeedsConfirmation(PendingEdit),
}

/// A registry edit waiting for a day-creation decision.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    registry: ProcessRegistry,
    index: usize,
    pending: PendingDayCreation,
}

impl PendingEdit {
    /// The proposed new day.
    pub fn day_creation(&self) -> &PendingDayCreation {
        &self.pending
    }

    /// ID of the process being edited.
    pub fn process_id(&self) -> &str {
        &self.registry.processes[self.index].id
    }

    /// Creates the day and commits the edit.
    pub fn confirm(self) -> (ProcessRegistry, EditResult) {
        let result = self.pending.confirm();
        (self.registry.commit_edit(self.index, &result), result)
    }

    /// Declines; the snapshot is returned unchanged.
    pub fn decline(self) -> (ProcessRegistry, EditResult) {
        let result = self.pending.decline();
        (self.registry, result)
    }

    /// Resolves with a decision.
    pub fn resolve(self, confirmed: bool) -> (ProcessRegistry, EditResult) {
        if confirmed {
            self.confirm()
        } else {
            self.decline()
        }
    }
}

/// Outcome of an edit made at a view level.
#[derive(Debug, Clone)]
pub enum LevelEdit {
    /// Edit converted to base units and applied.
    Applied(ProcessRegistry, EditResult),
    /// The level is read-only; nothing changed.
    NotEditable(ViewLevel),
}

impl ProcessRegistry {
    /// Builds a registry and derives every automatic process.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] if the process set or config is invalid.
    /// - [`EngineError::NoWorkingDay`] if the calendar cannot place a shift.
    pub fn new(
        processes: Vec<Process>,
        calendar: WorkingCalendar,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        validate_processes(&processes).map_err(EngineError::Validation)?;
        config.validate()?;

        let primary_index = processes
            .iter()
            .position(|p| p.is_primary)
            .ok_or_else(|| {
                EngineError::Validation(vec![ValidationError::new(
                    ValidationErrorKind::MissingPrimary,
                    "No primary process",
                )])
            })?;

        let registry = Self {
            calendar,
            processes,
            config,
            primary_index,
        };
        registry.recomputed()
    }

    /// The working calendar.
    pub fn calendar(&self) -> &WorkingCalendar {
        &self.calendar
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All processes in registration order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// The primary process.
    pub fn primary(&self) -> &Process {
        &self.processes[self.primary_index]
    }

    /// Looks up a process.
    pub fn process(&self, id: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// Base-unit total every dependent is balanced against.
    pub fn target_total(&self) -> u64 {
        self.primary().schedule.total()
    }

    /// Replaces the calendar and re-derives automatic processes.
    pub fn with_calendar(&self, calendar: WorkingCalendar) -> EngineResult<Self> {
        let mut next = self.clone();
        next.calendar = calendar;
        next.recomputed()
    }

    /// Replaces the primary schedule and re-derives automatic processes.
    pub fn with_primary_schedule(&self, schedule: Schedule) -> EngineResult<Self> {
        let mut next = self.clone();
        next.processes[next.primary_index].schedule = schedule;
        next.recomputed()
    }

    /// Regenerates the primary schedule from a timeline strip.
    ///
    /// The returned outcome reports any quantity dropped because the strip
    /// covers no working days.
    pub fn with_strip(&self, strip: &StripControls) -> EngineResult<(Self, DistributionOutcome)> {
        let outcome = strip.to_schedule(&self.calendar);
        let next = self.with_primary_schedule(outcome.schedule.clone())?;
        Ok((next, outcome))
    }

    /// Edits one day of a process.
    ///
    /// Primary edits update the source schedule and re-derive dependents.
    /// Dependent edits are balanced against the primary total; an accepted
    /// edit marks the process as manually overridden. `confirm_create_day`
    /// decides whether a deficit may open a new day.
    pub fn edit_quantity<F>(
        &self,
        process_id: &str,
        date: NaiveDate,
        quantity: i64,
        confirm_create_day: F,
    ) -> EngineResult<(Self, EditResult)>
    where
        F: FnOnce(&PendingDayCreation) -> bool,
    {
        match self.begin_edit(process_id, date, quantity)? {
            RegistryEdit::Applied { registry, result } => Ok((registry, result)),
            RegistryEdit::NeedsConfirmation(pending) => {
                let confirmed = confirm_create_day(pending.day_creation());
                Ok(pending.resolve(confirmed))
            }
        }
    }

    /// First phase of an edit; never waits on a decision.
    pub fn begin_edit(
        &self,
        process_id: &str,
        date: NaiveDate,
        quantity: i64,
    ) -> EngineResult<RegistryEdit> {
        let index = self.index_of(process_id)?;
        let process = &self.processes[index];

        if process.is_primary {
            let mut schedule = process.schedule.clone();
            schedule.set(date, clamp_quantity(quantity));
            let registry = self.with_primary_schedule(schedule.clone())?;
            let result = EditResult {
                schedule,
                effect: EditEffect::NoCorrection,
            };
            return Ok(RegistryEdit::Applied { registry, result });
        }

        if process.is_frozen {
            return Err(EngineError::ProcessFrozen(process.id.clone()));
        }

        let outcome = checked_begin_manual_edit(
            &process.schedule,
            date,
            quantity,
            self.target_total(),
            &self.calendar,
            self.config.max_calendar_scan_days,
        )?;

        Ok(match outcome {
            EditOutcome::Applied(result) => RegistryEdit::Applied {
                registry: self.commit_edit(index, &result),
                result,
            },
            EditOutcome::NeedsConfirmation(pending) => {
                debug!(process = %process.id, date = %pending.date, "edit awaits day creation");
                RegistryEdit::NeedsConfirmation(PendingEdit {
                    registry: self.clone(),
                    index,
                    pending,
                })
            }
        })
    }

    /// Edits a day using a quantity shown at `level`.
    ///
    /// Read-only levels return [`LevelEdit::NotEditable`] without change.
    pub fn edit_at_view_level<F>(
        &self,
        process_id: &str,
        date: NaiveDate,
        displayed_quantity: i64,
        level: ViewLevel,
        confirm_create_day: F,
    ) -> EngineResult<LevelEdit>
    where
        F: FnOnce(&PendingDayCreation) -> bool,
    {
        let spec = self
            .config
            .view_levels
            .get(level)
            .ok_or(EngineError::UnknownViewLevel(level))?;
        match edit_at_level(spec, displayed_quantity) {
            ViewEdit::NotEditable(level) => {
                debug!(process = process_id, ?level, "edit at read-only level ignored");
                Ok(LevelEdit::NotEditable(level))
            }
            ViewEdit::Base(base) => {
                let base = i64::try_from(base).unwrap_or(i64::MAX);
                let (registry, result) =
                    self.edit_quantity(process_id, date, base, confirm_create_day)?;
                Ok(LevelEdit::Applied(registry, result))
            }
        }
    }

    /// Returns a process to automatic mode and re-derives it.
    pub fn reset_to_automatic(&self, process_id: &str) -> EngineResult<Self> {
        let index = self.index_of(process_id)?;
        if self.processes[index].is_primary {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        next.processes[index].is_manual_override = false;
        next.processes[index].is_frozen = false;
        info!(process = process_id, "reset to automatic");
        next.rederive(index)?;
        Ok(next)
    }

    /// Freezes or unfreezes a dependent process.
    ///
    /// Unfreezing a process that is not overridden re-derives it at once.
    pub fn set_frozen(&self, process_id: &str, frozen: bool) -> EngineResult<Self> {
        let index = self.index_of(process_id)?;
        if self.processes[index].is_primary {
            return Err(primary_locked(process_id));
        }
        let mut next = self.clone();
        next.processes[index].is_frozen = frozen;
        info!(process = process_id, frozen, "freeze state changed");
        if next.processes[index].is_auto_derived() {
            next.rederive(index)?;
        }
        Ok(next)
    }

    /// Changes a dependent's offset, re-deriving it if automatic.
    pub fn set_offset(&self, process_id: &str, offset_working_days: i32) -> EngineResult<Self> {
        let index = self.index_of(process_id)?;
        if self.processes[index].is_primary {
            if offset_working_days == 0 {
                return Ok(self.clone());
            }
            return Err(EngineError::Validation(vec![ValidationError::new(
                ValidationErrorKind::PrimaryOffset,
                format!("Primary process '{process_id}' must keep offset 0"),
            )]));
        }
        let mut next = self.clone();
        next.processes[index].offset_working_days = offset_working_days;
        if next.processes[index].is_auto_derived() {
            next.rederive(index)?;
        }
        Ok(next)
    }

    /// Projects a process schedule at a view level.
    pub fn project(&self, process_id: &str, level: ViewLevel) -> EngineResult<Schedule> {
        let process = &self.processes[self.index_of(process_id)?];
        let spec = self
            .config
            .view_levels
            .get(level)
            .ok_or(EngineError::UnknownViewLevel(level))?;
        Ok(project_for_view(&process.schedule, spec))
    }

    /// Maintenance mode of every process.
    pub fn modes(&self) -> Vec<(&str, ProcessMode)> {
        self.processes
            .iter()
            .map(|p| (p.id.as_str(), p.mode()))
            .collect()
    }

    /// Summary of every process schedule.
    pub fn summaries(&self) -> Vec<(&str, ScheduleSummary)> {
        self.processes
            .iter()
            .map(|p| (p.id.as_str(), ScheduleSummary::calculate(&p.schedule)))
            .collect()
    }

    /// Processes whose total differs from the primary total.
    ///
    /// Only frozen processes, or overridden ones whose edit was made against
    /// an older primary total, can drift.
    pub fn unbalanced(&self) -> Vec<(&str, i128)> {
        let target = self.target_total();
        self.summaries()
            .into_iter()
            .filter(|(_, s)| !s.is_balanced_against(target))
            .map(|(id, s)| (id, s.deviation_from(target)))
            .collect()
    }

    fn index_of(&self, process_id: &str) -> EngineResult<usize> {
        self.processes
            .iter()
            .position(|p| p.id == process_id)
            .ok_or_else(|| EngineError::UnknownProcess(process_id.to_string()))
    }

    fn commit_edit(&self, index: usize, result: &EditResult) -> Self {
        let mut next = self.clone();
        let process = &mut next.processes[index];
        process.schedule = result.schedule.clone();
        if result.is_accepted() && !process.is_manual_override {
            process.is_manual_override = true;
            info!(process = %process.id, effect = ?result.effect, "process switched to manual override");
        }
        next
    }

    fn recomputed(mut self) -> EngineResult<Self> {
        let mut derived = 0usize;
        for index in 0..self.processes.len() {
            if self.processes[index].is_auto_derived() {
                self.rederive(index)?;
                derived += 1;
            }
        }
        debug!(derived, total = self.target_total(), "dependent schedules recomputed");
        Ok(self)
    }

    fn rederive(&mut self, index: usize) -> EngineResult<()> {
        let offset = self.processes[index].offset_working_days;
        let schedule = checked_derive_dependent_schedule(
            &self.processes[self.primary_index].schedule,
            offset,
            &self.calendar,
            self.config.max_calendar_scan_days,
        )
        .inspect_err(|e| warn!(process = %self.processes[index].id, error = %e, "derivation failed"))?;
        self.processes[index].schedule = schedule;
        Ok(())
    }
}

fn primary_locked(process_id: &str) -> EngineError {
    EngineError::Validation(vec![ValidationError::new(
        ValidationErrorKind::PrimaryLocked,
        format!("Primary process '{process_id}' cannot be frozen"),
    )])
}
