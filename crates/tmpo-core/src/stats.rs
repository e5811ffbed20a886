//! Summary statistics over a set of time entries.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::TimeEntry;

/// Which slice of history a [`Stats`] value describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsScope {
    /// Every entry ever recorded, with the number of distinct projects in the store.
    AllTime { projects_tracked: usize },
    /// A named period such as "Today" or "This Week".
    Period { name: String },
}

/// Totals for a single project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStats {
    pub project: String,
    pub duration: TimeDelta,
    /// `Some` if at least one contributing entry had an hourly rate.
    pub earnings: Option<f64>,
    /// Share of the overall duration, `0.0` when the overall duration is zero.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total: TimeDelta,
    /// `None` when no entry in the set had an hourly rate.
    pub earnings: Option<f64>,
    pub entry_count: usize,
    /// Sorted by project name.
    pub projects: Vec<ProjectStats>,
}

#[derive(Default)]
struct Accumulator {
    duration: TimeDelta,
    earnings: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, duration: TimeDelta, earnings: Option<f64>) {
        self.duration += duration;
        if let Some(amount) = earnings {
            *self.earnings.get_or_insert(0.0) += amount;
        }
    }
}

impl Stats {
    /// Aggregates `entries`, measuring running entries against `now`.
    ///
    /// Returns `None` for an empty slice.
    pub fn compute(entries: &[TimeEntry], now: DateTime<Utc>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let mut overall = Accumulator::default();
        let mut by_project: BTreeMap<&str, Accumulator> = BTreeMap::new();

        for entry in entries {
            let duration = entry.duration_at(now);
            let earnings = entry.earnings_at(now);
            overall.add(duration, earnings);
            by_project
                .entry(entry.project_name.as_str())
                .or_default()
                .add(duration, earnings);
        }

        let projects = by_project
            .into_iter()
            .map(|(project, acc)| ProjectStats {
                project: project.to_string(),
                duration: acc.duration,
                earnings: acc.earnings,
                percentage: percentage(acc.duration, overall.duration),
            })
            .collect();

        Some(Self {
            total: overall.duration,
            earnings: overall.earnings,
            entry_count: entries.len(),
            projects,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: TimeDelta, total: TimeDelta) -> f64 {
    let total_seconds = total.num_seconds();
    if total_seconds == 0 {
        return 0.0;
    }
    part.num_seconds() as f64 / total_seconds as f64 * 100.0
}
