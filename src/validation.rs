//! Input validation for process sets and view levels.
//!
//! Checks structural integrity before a registry is built. Detects:
//! - Empty and duplicate process IDs
//! - Missing or multiple primary processes
//! - A primary process with a non-zero offset or the frozen flag
//! - View level sets without exactly one editable base level
//!
//! All problems are collected; validation does not stop at the first one.

use std::collections::HashSet;

use crate::models::{Process, ViewLevel, ViewLevelSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two processes share the same ID.
    DuplicateId,
    /// A process has an empty ID.
    EmptyId,
    /// No process is marked primary.
    MissingPrimary,
    /// More than one process is marked primary.
    MultiplePrimaries,
    /// The primary process has a non-zero offset.
    PrimaryOffset,
    /// The primary process is frozen or overridden.
    PrimaryLocked,
    /// No editable view level, or more than one.
    EditableLevel,
    /// The editable level does not have multiplier 1.
    BaseMultiplier,
    /// A multiplier has a zero part.
    InvalidMultiplier,
    /// A view level appears twice.
    DuplicateLevel,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a process set.
///
/// Checks:
/// 1. Every process has a non-empty, unique ID
/// 2. Exactly one process is primary
/// 3. The primary has offset 0
/// 4. The primary is neither frozen nor manually overridden
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_processes(processes: &[Process]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for p in processes {
        if p.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Process with empty ID",
            ));
        } else if !ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate process ID: {}", p.id),
            ));
        }
    }

    let primaries: Vec<&Process> = processes.iter().filter(|p| p.is_primary).collect();
    match primaries.as_slice() {
        [] => errors.push(ValidationError::new(
            ValidationErrorKind::MissingPrimary,
            "No primary process",
        )),
        [primary] => {
            if primary.offset_working_days != 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PrimaryOffset,
                    format!(
                        "Primary process '{}' has offset {}",
                        primary.id, primary.offset_working_days
                    ),
                ));
            }
            if primary.is_frozen || primary.is_manual_override {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PrimaryLocked,
                    format!("Primary process '{}' cannot be frozen or overridden", primary.id),
                ));
            }
        }
        many => errors.push(ValidationError::new(
            ValidationErrorKind::MultiplePrimaries,
            format!(
                "Multiple primary processes: {}",
                many.iter().map(|p| p.id.as_str()).collect::<Vec<_>>().join(", ")
            ),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a view level set.
///
/// Checks:
/// 1. No level is listed twice
/// 2. Every multiplier is a positive rational
/// 3. Exactly one level is editable, it is `ViewLevel::Base`, and its multiplier is 1
pub fn validate_view_levels(set: &ViewLevelSet) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for spec in &set.levels {
        if !seen.insert(spec.level) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateLevel,
                format!("Duplicate view level: {:?}", spec.level),
            ));
        }
        if !spec.multiplier.is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidMultiplier,
                format!(
                    "View level {:?} has multiplier {}/{}",
                    spec.level, spec.multiplier.numerator, spec.multiplier.denominator
                ),
            ));
        }
    }

    let editable: Vec<_> = set.levels.iter().filter(|l| l.editable).collect();
    match editable.as_slice() {
        [base] => {
            if base.level != ViewLevel::Base {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EditableLevel,
                    format!("Editable level must be Base, found {:?}", base.level),
                ));
            }
            if !base.multiplier.is_one() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BaseMultiplier,
                    format!("Editable level {:?} must have multiplier 1", base.level),
                ));
            }
        }
        other => errors.push(ValidationError::new(
            ValidationErrorKind::EditableLevel,
            format!("Expected exactly one editable view level, found {}", other.len()),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
