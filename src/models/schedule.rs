//! Daily production schedule.
//!
//! A schedule is an ascending, unique-date list of planned daily output.
//! Zero-quantity days are never stored: every constructor and mutator
//! drops them. Sums saturate at `u64::MAX` instead of overflowing.
//!
//! # Exchange Format
//! Serialises as a JSON array of `{ "date": "YYYY-MM-DD", "quantity": n }`.
//! Deserialisation re-normalises (sorts, merges duplicates, drops zeros).

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{clamp_quantity, parse_date, strict_date, EngineResult};

/// Output planned for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyQuantity {
    /// Production date.
    #[serde(deserialize_with = "strict_date::deserialize")]
    pub date: NaiveDate,
    /// Planned units (base units).
    pub quantity: u64,
}

impl DailyQuantity {
    /// Creates a new entry.
    pub fn new(date: NaiveDate, quantity: u64) -> Self {
        Self { date, quantity }
    }
}

/// Ordered daily schedule with unique dates and no zero entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<DailyQuantity>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from arbitrary entries.
    ///
    /// Entries sharing a date are summed; zero totals are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = DailyQuantity>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for e in entries {
            let q = by_date.entry(e.date).or_insert(0);
            *q = q.saturating_add(e.quantity);
        }
        Self::from_map(by_date)
    }

    /// Builds a schedule from `(date, quantity)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, u64)>) -> Self {
        Self::from_entries(pairs.into_iter().map(|(d, q)| DailyQuantity::new(d, q)))
    }

    /// Builds a schedule from `("YYYY-MM-DD", quantity)` records.
    ///
    /// Negative quantities are clamped to zero (and so dropped).
    pub fn from_records<'a>(records: impl IntoIterator<Item = (&'a str, i64)>) -> EngineResult<Self> {
        let mut entries = Vec::new();
        for (date, quantity) in records {
            entries.push(DailyQuantity::new(parse_date(date)?, clamp_quantity(quantity)));
        }
        Ok(Self::from_entries(entries))
    }

    pub(crate) fn from_map(by_date: BTreeMap<NaiveDate, u64>) -> Self {
        Self {
            entries: by_date
                .into_iter()
                .filter(|&(_, q)| q > 0)
                .map(|(date, quantity)| DailyQuantity { date, quantity })
                .collect(),
        }
    }

    /// Entries in ascending date order.
    pub fn entries(&self) -> &[DailyQuantity] {
        &self.entries
    }

    /// Iterates entries in ascending date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DailyQuantity> {
        self.entries.iter()
    }

    /// Number of scheduled days.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.quantity))
    }

    /// Quantity planned on `date` (0 when absent).
    pub fn quantity_on(&self, date: NaiveDate) -> u64 {
        self.position(date)
            .map(|i| self.entries[i].quantity)
            .unwrap_or(0)
    }

    /// Earliest scheduled date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.entries.first().map(|e| e.date)
    }

    /// Latest scheduled date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|e| e.date)
    }

    /// Sets the quantity on `date`, removing the entry when it is 0.
    pub(crate) fn set(&mut self, date: NaiveDate, quantity: u64) {
        match (self.entries.binary_search_by_key(&date, |e| e.date), quantity) {
            (Ok(i), 0) => {
                self.entries.remove(i);
            }
            (Ok(i), q) => self.entries[i].quantity = q,
            (Err(_), 0) => {}
            (Err(i), q) => self.entries.insert(i, DailyQuantity::new(date, q)),
        }
    }

    fn position(&self, date: NaiveDate) -> Option<usize> {
        self.entries.binary_search_by_key(&date, |e| e.date).ok()
    }
}

/// Wire form of an entry; quantities arrive signed and are clamped.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(deserialize_with = "strict_date::deserialize")]
    date: NaiveDate,
    quantity: i64,
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<RawEntry>::deserialize(deserializer)?;
        Ok(Self::from_entries(
            raw.into_iter()
                .map(|r| DailyQuantity::new(r.date, clamp_quantity(r.quantity))),
        ))
    }
}

impl FromIterator<DailyQuantity> for Schedule {
    fn from_iter<I: IntoIterator<Item = DailyQuantity>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a DailyQuantity;
    type IntoIter = std::slice::Iter<'a, DailyQuantity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
