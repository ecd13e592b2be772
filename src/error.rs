//! Engine error type.
//!
//! Only malformed input and registry misuse are errors. Data-loss and
//! revert paths (undistributable totals, declined day creation) are
//! reported through return values instead.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::ViewLevel;
use crate::validation::ValidationError;

/// Errors raised by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    Parse {
        input: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("duration must be at least 1 day, got {0}")]
    InvalidDuration(i64),

    #[error("no working day found within {scanned} days of {from}")]
    NoWorkingDay { from: NaiveDate, scanned: u32 },

    #[error("process '{0}' not found")]
    UnknownProcess(String),

    #[error("process '{0}' is frozen")]
    ProcessFrozen(String),

    #[error("view level {0:?} is not configured")]
    UnknownViewLevel(ViewLevel),

    #[error("multiplier must be a positive rational, got {numerator}/{denominator}")]
    InvalidMultiplier { numerator: u32, denominator: u32 },

    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parses a `YYYY-MM-DD` date string.
///
/// The shape is checked before chrono sees it: exactly ten characters,
/// zero-padded fields, no surrounding whitespace.
pub fn parse_date(input: &str) -> EngineResult<NaiveDate> {
    if !is_iso_date_shape(input) {
        return Err(EngineError::Parse {
            input: input.to_string(),
            source: None,
        });
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|source| EngineError::Parse {
        input: input.to_string(),
        source: Some(source),
    })
}

fn is_iso_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Serde adapters that route dates through [`parse_date`].
pub(crate) mod strict_date {
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use std::collections::BTreeSet;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(D::Error::custom)
    }

    pub fn deserialize_set<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<NaiveDate>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| super::parse_date(raw).map_err(D::Error::custom))
            .collect()
    }
}

/// Clamps a caller-supplied quantity to the non-negative range.
#[inline]
pub fn clamp_quantity(quantity: i64) -> u64 {
    quantity.max(0) as u64
}
