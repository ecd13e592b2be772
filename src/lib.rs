//! Calendar-aware production schedule balancing.
//!
//! Keeps a set of dependent daily production schedules consistent with one
//! primary schedule, a working-day calendar and per-stage day offsets.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `WorkingCalendar`, `Schedule`, `Process`,
//!   `ViewLevel`
//! - **`scheduler`**: Pure algorithms: strip distribution, offset derivation,
//!   manual-edit balancing, view projection
//! - **`registry`**: Immutable session snapshot with recomputing reducers
//! - **`validation`**: Process-set and view-level integrity checks
//! - **`config`**: Engine settings
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_balance::config::EngineConfig;
//! use u_balance::models::{Process, WorkingCalendar};
//! use u_balance::registry::ProcessRegistry;
//! use u_balance::scheduler::StripControls;
//!
//! let registry = ProcessRegistry::new(
//!     vec![Process::primary("assembly"), Process::new("paint", -2)],
//!     WorkingCalendar::weekdays(),
//!     EngineConfig::default(),
//! )
//! .unwrap();
//!
//! let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
//! let strip = StripControls::new(start, 5, 1000).unwrap();
//! let (registry, _) = registry.with_strip(&strip).unwrap();
//! assert_eq!(registry.process("paint").unwrap().schedule.total(), 1000);
//! ```
//!
//! # Concurrency
//!
//! Single-threaded and synchronous. Every operation completes before it
//! returns; snapshots are plain values and may be sent across threads.

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod validation;

pub use error::{EngineError, EngineResult};
