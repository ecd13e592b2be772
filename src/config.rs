//! Engine configuration.
//!
//! Loaded from JSON or built in code. Unset fields fall back to defaults.
//!
//! ```json
//! {
//!   "max_calendar_scan_days": 3660,
//!   "view_levels": { "levels": [
//!     { "level": "Base", "multiplier": { "numerator": 1, "denominator": 1 }, "editable": true },
//!     { "level": "Package", "multiplier": { "numerator": 1, "denominator": 12 }, "editable": false }
//!   ] }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ViewLevelSet, ViewLevelSpec};
use crate::validation::validate_view_levels;

/// Default cap on consecutive non-working days crossed by one step (about ten years).
pub const DEFAULT_MAX_CALENDAR_SCAN_DAYS: u32 = 3660;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive non-working days tolerated before a calendar is treated
    /// as having no working days.
    pub max_calendar_scan_days: u32,
    /// Display aggregation levels.
    pub view_levels: ViewLevelSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_calendar_scan_days: DEFAULT_MAX_CALENDAR_SCAN_DAYS,
            view_levels: ViewLevelSet::new(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the calendar scan cap.
    pub fn with_max_calendar_scan_days(mut self, days: u32) -> Self {
        self.max_calendar_scan_days = days;
        self
    }

    /// Adds or replaces a view level.
    pub fn with_view_level(mut self, spec: ViewLevelSpec) -> Self {
        self.view_levels = self.view_levels.with_level(spec);
        self
    }

    /// Checks the configuration for consistency.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_calendar_scan_days == 0 {
            return Err(EngineError::Config(
                "max_calendar_scan_days must be positive".into(),
            ));
        }
        validate_view_levels(&self.view_levels).map_err(EngineError::Validation)
    }
}
