//! Milestone lifecycle rules.
//!
//! A milestone is Active until it is finished, and Finished forever after.
//! At most one milestone per project may be active, and names are unique
//! within a project. Both rules are checked here before anything is inserted.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::Milestone;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MilestoneError {
    #[error("milestone '{name}' already exists for project '{project}', choose another name")]
    NameTaken { project: String, name: String },

    #[error(
        "milestone '{active}' is already active for project '{project}', finish it first with 'tmpo milestone finish'"
    )]
    AlreadyActive { project: String, active: String },

    #[error("no active milestone for project '{project}'")]
    NoneActive { project: String },
}

/// Checks that `name` can be started for `project`.
///
/// `existing` is the milestone already carrying that name (if any) and
/// `active` the project's currently active milestone (if any).
pub fn check_can_start(
    project: &str,
    name: &str,
    existing: Option<&Milestone>,
    active: Option<&Milestone>,
) -> Result<(), MilestoneError> {
    if existing.is_some() {
        return Err(MilestoneError::NameTaken {
            project: project.to_string(),
            name: name.to_string(),
        });
    }
    if let Some(active) = active {
        return Err(MilestoneError::AlreadyActive {
            project: project.to_string(),
            active: active.name.clone(),
        });
    }
    Ok(())
}

/// Why an entry does not fit inside a milestone's time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMismatch {
    BeforeStart {
        milestone_start: DateTime<Utc>,
    },
    AfterEnd {
        milestone_end: DateTime<Utc>,
    },
}

/// Soft check used when an entry is (re)assigned to a milestone.
///
/// Mismatches are warnings; the assignment is still allowed.
pub fn check_range(entry_start: DateTime<Utc>, milestone: &Milestone) -> Option<RangeMismatch> {
    if entry_start < milestone.start_time {
        return Some(RangeMismatch::BeforeStart {
            milestone_start: milestone.start_time,
        });
    }
    match milestone.end_time {
        Some(end) if entry_start > end => Some(RangeMismatch::AfterEnd { milestone_end: end }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn milestone(name: &str, start_hour: u32, end_hour: Option<u32>) -> Milestone {
        Milestone {
            id: 1,
            project_name: "proj".to_string(),
            name: name.to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, start_hour, 0, 0).unwrap(),
            end_time: end_hour.map(|h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()),
        }
    }

    #[test]
    fn name_taken_wins_over_already_active() {
        let taken = milestone("sprint-1", 9, Some(10));
        let active = milestone("sprint-2", 11, None);
        let err = check_can_start("proj", "sprint-1", Some(&taken), Some(&active)).unwrap_err();
        assert!(matches!(err, MilestoneError::NameTaken { .. }));
    }

    #[test]
    fn active_milestone_blocks_new_one() {
        let active = milestone("A", 9, None);
        let err = check_can_start("proj", "B", None, Some(&active)).unwrap_err();
        assert_eq!(
            err,
            MilestoneError::AlreadyActive {
                project: "proj".to_string(),
                active: "A".to_string(),
            }
        );
        assert!(err.to_string().contains("finish it first"));
        assert!(check_can_start("proj", "B", None, None).is_ok());
    }

    #[test]
    fn error_messages_are_distinct() {
        let taken = MilestoneError::NameTaken {
            project: "p".to_string(),
            name: "n".to_string(),
        };
        let active = MilestoneError::AlreadyActive {
            project: "p".to_string(),
            active: "n".to_string(),
        };
        assert_ne!(taken.to_string(), active.to_string());
    }

    #[test]
    fn range_check_flags_entries_outside_window() {
        let finished = milestone("m", 9, Some(17));
        let at = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();

        assert_eq!(check_range(at(12), &finished), None);
        assert_eq!(check_range(at(9), &finished), None);
        assert_eq!(check_range(at(17), &finished), None);
        assert!(matches!(
            check_range(at(8), &finished),
            Some(RangeMismatch::BeforeStart { .. })
        ));
        assert!(matches!(
            check_range(at(18), &finished),
            Some(RangeMismatch::AfterEnd { .. })
        ));

        let active = milestone("m", 9, None);
        assert_eq!(check_range(at(23), &active), None);
    }
}
