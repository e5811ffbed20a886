//! Time entries and milestones as stored by the persistence layer.
//!
//! Timestamps are absolute instants kept in UTC. Display code converts them to
//! the local time zone; no zone is stored alongside the value.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One recorded (or in-progress) span of tracked time against a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i64,
    pub project_name: String,
    pub start_time: DateTime<Utc>,
    /// `None` while the timer is running.
    pub end_time: Option<DateTime<Utc>>,
    pub description: String,
    pub hourly_rate: Option<f64>,
    /// Soft reference to a milestone of the same project, matched by name.
    pub milestone_name: Option<String>,
}

impl TimeEntry {
    /// Elapsed time, measured against the wall clock for running entries.
    pub fn duration(&self) -> TimeDelta {
        self.duration_at(Utc::now())
    }

    /// Elapsed time, measured against `now` for running entries.
    pub fn duration_at(&self, now: DateTime<Utc>) -> TimeDelta {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub const fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Duration in hours rounded to two decimals.
    ///
    /// Billing uses this value so that displayed and charged hours match.
    pub fn rounded_hours(&self) -> f64 {
        self.rounded_hours_at(Utc::now())
    }

    pub fn rounded_hours_at(&self, now: DateTime<Utc>) -> f64 {
        round_hours(self.duration_at(now))
    }

    /// Earnings for this entry, if it carries an hourly rate.
    pub fn earnings(&self) -> Option<f64> {
        self.earnings_at(Utc::now())
    }

    pub fn earnings_at(&self, now: DateTime<Utc>) -> Option<f64> {
        self.hourly_rate
            .map(|rate| self.rounded_hours_at(now) * rate)
    }
}

/// A named, time-boxed grouping of entries within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub project_name: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// `None` while the milestone is active.
    pub end_time: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn duration(&self) -> TimeDelta {
        self.duration_at(Utc::now())
    }

    pub fn duration_at(&self, now: DateTime<Utc>) -> TimeDelta {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub const fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whether `instant` falls inside the milestone's `[start, end]` window.
    ///
    /// Active milestones have no upper bound.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_time && self.end_time.is_none_or(|end| instant <= end)
    }
}

/// Converts a duration to fractional hours.
#[allow(clippy::cast_precision_loss)]
pub fn hours(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

/// Converts a duration to hours rounded to two decimals.
pub fn round_hours(duration: TimeDelta) -> f64 {
    (hours(duration) * 100.0).round() / 100.0
}
