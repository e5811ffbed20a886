//! Entry selection shared by `log` and `export`.

use anyhow::Result;
use chrono::Local;
use tmpo_core::{Period, TimeEntry};
use tmpo_db::Database;

use crate::cli::PeriodArgs;

/// Filters given on the command line. The first one set wins, in this order:
/// milestone, period, project.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFilter<'a> {
    pub milestone: Option<&'a str>,
    pub period: Option<Period>,
    pub project: Option<&'a str>,
}

impl<'a> EntryFilter<'a> {
    pub fn new(
        milestone: Option<&'a str>,
        period: &PeriodArgs,
        project: Option<&'a str>,
    ) -> Self {
        Self {
            milestone,
            period: period.period(),
            project,
        }
    }

    /// Loads matching entries, newest first.
    ///
    /// Milestones are looked up in `current_project`. With no filter set,
    /// `limit` entries are returned (`None` or `<= 0` returns all of them).
    pub fn load(
        self,
        db: &Database,
        current_project: &str,
        limit: Option<i64>,
    ) -> Result<Vec<TimeEntry>> {
        let entries = if let Some(milestone) = self.milestone {
            db.entries_by_milestone(current_project, milestone)?
        } else if let Some(period) = self.period {
            let (start, end) = period.bounds(Local::now());
            db.entries_in_range(start, end)?
        } else if let Some(project) = self.project {
            db.entries_by_project(project)?
        } else {
            db.entries(limit.unwrap_or(0))?
        };
        Ok(entries)
    }
}
