//! Core domain logic for tmpo.
//!
//! This crate contains the fundamental types and logic for:
//! - The entry and milestone model with derived durations and earnings
//! - Stats aggregation over a set of entries
//! - Milestone lifecycle rules
//! - Parsing of user-supplied dates and times

pub mod currency;
pub mod datetime;
pub mod milestone;
pub mod model;
pub mod period;
pub mod project;
pub mod stats;
pub mod types;

pub use currency::{CurrencyError, DEFAULT_CURRENCY, format_currency, validate_currency_code};
pub use datetime::{DateFormat, DateTimeError, TimeFormat};
pub use milestone::{MilestoneError, RangeMismatch, check_can_start, check_range};
pub use model::{Milestone, TimeEntry, hours, round_hours};
pub use period::Period;
pub use project::{ConfigHint, ProjectSource, ResolvedProject, resolve_project};
pub use stats::{ProjectStats, Stats, StatsScope};
pub use types::ValidationError;
