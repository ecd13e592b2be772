//! View levels and aggregation multipliers.
//!
//! A view level scales base quantities for read-only display, e.g.
//! components per finished unit or finished units per package. Only
//! the base level accepts edits.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Positive rational multiplier `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplier {
    /// Numerator (> 0).
    pub numerator: u32,
    /// Denominator (> 0).
    pub denominator: u32,
}

impl Multiplier {
    /// The identity multiplier.
    pub const ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    /// Creates a multiplier, rejecting zero parts.
    pub fn new(numerator: u32, denominator: u32) -> EngineResult<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(EngineError::InvalidMultiplier {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Whether both parts are positive.
    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Whether this is numerically 1.
    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    /// `round(quantity * n / d)`, ties away from zero.
    pub fn apply(&self, quantity: u64) -> u64 {
        round_ratio(
            quantity as u128 * self.numerator as u128,
            self.denominator as u128,
        )
    }

    /// `round(quantity * d / n)`, ties away from zero.
    ///
    /// Converts a displayed quantity back to base units.
    pub fn invert_apply(&self, quantity: u64) -> u64 {
        round_ratio(
            quantity as u128 * self.denominator as u128,
            self.numerator as u128,
        )
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::ONE
    }
}

/// Rounds `num / den` half away from zero for non-negative operands.
fn round_ratio(num: u128, den: u128) -> u64 {
    let rounded = (2 * num + den) / (2 * den);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Display aggregation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewLevel {
    /// Finished units; the editable base level.
    Base,
    /// Component count per finished unit.
    Component,
    /// Shipping packages of finished units.
    Package,
}

/// A view level with its multiplier and edit permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLevelSpec {
    /// Which level.
    pub level: ViewLevel,
    /// Multiplier applied to base quantities.
    pub multiplier: Multiplier,
    /// Whether edits are accepted at this level.
    pub editable: bool,
}

impl ViewLevelSpec {
    /// Creates a read-only level.
    pub fn read_only(level: ViewLevel, multiplier: Multiplier) -> Self {
        Self {
            level,
            multiplier,
            editable: false,
        }
    }

    /// The editable base level (multiplier 1).
    pub fn base() -> Self {
        Self {
            level: ViewLevel::Base,
            multiplier: Multiplier::ONE,
            editable: true,
        }
    }
}

/// The configured set of view levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLevelSet {
    /// Levels in display order.
    pub levels: Vec<ViewLevelSpec>,
}

impl ViewLevelSet {
    /// Creates a set holding only the base level.
    pub fn new() -> Self {
        Self {
            levels: vec![ViewLevelSpec::base()],
        }
    }

    /// Adds or replaces a level.
    pub fn with_level(mut self, spec: ViewLevelSpec) -> Self {
        match self.levels.iter().position(|l| l.level == spec.level) {
            Some(i) => self.levels[i] = spec,
            None => self.levels.push(spec),
        }
        self
    }

    /// Looks up a level.
    pub fn get(&self, level: ViewLevel) -> Option<&ViewLevelSpec> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// The editable level, if exactly one exists.
    pub fn editable_level(&self) -> Option<&ViewLevelSpec> {
        let mut editable = self.levels.iter().filter(|l| l.editable);
        match (editable.next(), editable.next()) {
            (Some(l), None) => Some(l),
            _ => None,
        }
    }
}

impl Default for ViewLevelSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_rejects_zero() {
        assert!(Multiplier::new(0, 1).is_err());
        assert!(Multiplier::new(1, 0).is_err());
        assert!(Multiplier::new(3, 2).is_ok());
    }

    #[test]
    fn test_apply_rounds_half_away_from_zero() {
        let half = Multiplier::new(1, 2).unwrap();
        assert_eq!(half.apply(5), 3); // 2.5 → 3
        assert_eq!(half.apply(4), 2);
        assert_eq!(half.apply(1), 1); // 0.5 → 1

        let third = Multiplier::new(1, 3).unwrap();
        assert_eq!(third.apply(4), 1); // 1.33 → 1
        assert_eq!(third.apply(5), 2); // 1.67 → 2

        let four = Multiplier::new(4, 1).unwrap();
        assert_eq!(four.apply(25), 100);
    }

    #[test]
    fn test_invert_apply() {
        let dozen = Multiplier::new(1, 12).unwrap();
        assert_eq!(dozen.invert_apply(3), 36);
        let four = Multiplier::new(4, 1).unwrap();
        assert_eq!(four.invert_apply(10), 3); // 2.5 → 3
    }

    #[test]
    fn test_apply_large_values_saturate() {
        let big = Multiplier::new(u32::MAX, 1).unwrap();
        assert_eq!(big.apply(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_level_set() {
        let set = ViewLevelSet::new()
            .with_level(ViewLevelSpec::read_only(
                ViewLevel::Component,
                Multiplier::new(4, 1).unwrap(),
            ))
            .with_level(ViewLevelSpec::read_only(
                ViewLevel::Package,
                Multiplier::new(1, 12).unwrap(),
            ));
        assert_eq!(set.levels.len(), 3);
        assert_eq!(set.editable_level().unwrap().level, ViewLevel::Base);
        assert_eq!(set.get(ViewLevel::Package).unwrap().multiplier.denominator, 12);

        let replaced = set.with_level(ViewLevelSpec::read_only(ViewLevel::Package, Multiplier::ONE));
        assert_eq!(replaced.levels.len(), 3);
        assert!(replaced.get(ViewLevel::Package).unwrap().multiplier.is_one());
    }

    #[test]
    fn test_editable_level_ambiguous() {
        let mut set = ViewLevelSet::new();
        set.levels.push(ViewLevelSpec {
            level: ViewLevel::Component,
            multiplier: Multiplier::ONE,
            editable: true,
        });
        assert!(set.editable_level().is_none());
    }
}
