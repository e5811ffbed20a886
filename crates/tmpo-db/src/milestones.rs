//! Milestone persistence and lifecycle transitions.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Params, Row, params};
use tmpo_core::{Milestone, MilestoneError, check_can_start};
use tracing::debug;

use crate::{Database, DbError, format_timestamp, parse_optional_timestamp, parse_timestamp};

const MILESTONE_COLUMNS: &str = "id, project_name, name, start_time, end_time";

struct MilestoneRow {
    id: i64,
    project_name: String,
    name: String,
    start_time: String,
    end_time: Option<String>,
}

impl MilestoneRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_name: row.get(1)?,
            name: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
        })
    }

    fn into_milestone(self) -> Result<Milestone, DbError> {
        Ok(Milestone {
            id: self.id,
            start_time: parse_timestamp(&self.start_time, "milestones", self.id)?,
            end_time: parse_optional_timestamp(self.end_time, "milestones", self.id)?,
            project_name: self.project_name,
            name: self.name,
        })
    }
}

fn query_milestones<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<Milestone>, DbError> {
    let sql = format!(
        "SELECT {MILESTONE_COLUMNS} FROM milestones {filter} ORDER BY start_time DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, MilestoneRow::from_row)?;
    let mut milestones = Vec::new();
    for row in rows {
        milestones.push(row?.into_milestone()?);
    }
    Ok(milestones)
}

fn query_milestone<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Option<Milestone>, DbError> {
    let sql = format!(
        "SELECT {MILESTONE_COLUMNS} FROM milestones {filter} ORDER BY start_time DESC, id DESC LIMIT 1"
    );
    conn.query_row(&sql, params, MilestoneRow::from_row)
        .optional()?
        .map(MilestoneRow::into_milestone)
        .transpose()
}

fn active_milestone_in(conn: &Connection, project: &str) -> Result<Option<Milestone>, DbError> {
    query_milestone(
        conn,
        "WHERE project_name = ? AND end_time IS NULL",
        [project],
    )
}

fn milestone_by_name_in(
    conn: &Connection,
    project: &str,
    name: &str,
) -> Result<Option<Milestone>, DbError> {
    query_milestone(conn, "WHERE project_name = ? AND name = ?", [project, name])
}

fn insert_milestone(
    conn: &Connection,
    project: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Milestone, DbError> {
    let inserted = conn.execute(
        "INSERT INTO milestones (project_name, name, start_time) VALUES (?, ?, ?)",
        params![project, name, format_timestamp(now)],
    );
    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            return Err(MilestoneError::NameTaken {
                project: project.to_string(),
                name: name.to_string(),
            }
            .into());
        }
        Err(err) => return Err(err.into()),
    }
    let id = conn.last_insert_rowid();
    query_milestone(conn, "WHERE id = ?", [id])?.ok_or_else(|| {
        DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
    })
}

impl Database {
    /// Inserts a milestone starting now.
    ///
    /// Only `(project, name)` uniqueness is enforced here; use
    /// [`Database::start_milestone`] to also respect the single-active rule.
    pub fn create_milestone(&mut self, project: &str, name: &str) -> Result<Milestone, DbError> {
        insert_milestone(&self.conn, project, name, Utc::now())
    }

    pub fn get_milestone(&self, id: i64) -> Result<Option<Milestone>, DbError> {
        query_milestone(&self.conn, "WHERE id = ?", [id])
    }

    /// The project's unfinished milestone with the latest start time.
    pub fn active_milestone_for_project(
        &self,
        project: &str,
    ) -> Result<Option<Milestone>, DbError> {
        active_milestone_in(&self.conn, project)
    }

    pub fn milestone_by_name(
        &self,
        project: &str,
        name: &str,
    ) -> Result<Option<Milestone>, DbError> {
        milestone_by_name_in(&self.conn, project, name)
    }

    pub fn milestones_by_project(&self, project: &str) -> Result<Vec<Milestone>, DbError> {
        query_milestones(&self.conn, "WHERE project_name = ?", [project])
    }

    pub fn all_milestones(&self) -> Result<Vec<Milestone>, DbError> {
        query_milestones(&self.conn, "", [])
    }

    /// Sets the milestone's end time to now, whatever its current state.
    pub fn finish_milestone(&mut self, id: i64) -> Result<(), DbError> {
        self.finish_milestone_at(id, Utc::now())
    }

    fn finish_milestone_at(&mut self, id: i64, now: DateTime<Utc>) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE milestones SET end_time = ? WHERE id = ?",
            params![format_timestamp(now), id],
        )?;
        debug!(id, "finished milestone");
        Ok(())
    }

    /// Starts milestone `name` for `project`.
    ///
    /// Fails if the name is already used for the project or another milestone is
    /// still active.
    pub fn start_milestone(&mut self, project: &str, name: &str) -> Result<Milestone, DbError> {
        self.start_milestone_at(project, name, Utc::now())
    }

    /// [`Self::start_milestone`] with an explicit start instant.
    pub fn start_milestone_at(
        &mut self,
        project: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Milestone, DbError> {
        let tx = self.conn.transaction()?;
        let existing = milestone_by_name_in(&tx, project, name)?;
        let active = active_milestone_in(&tx, project)?;
        check_can_start(project, name, existing.as_ref(), active.as_ref())?;
        let milestone = insert_milestone(&tx, project, name, now)?;
        tx.commit()?;
        debug!(project, name, "started milestone");
        Ok(milestone)
    }

    /// Finishes the project's active milestone and returns it.
    pub fn finish_active_milestone(&mut self, project: &str) -> Result<Milestone, DbError> {
        self.finish_active_milestone_at(project, Utc::now())
    }

    /// [`Self::finish_active_milestone`] with an explicit end instant.
    pub fn finish_active_milestone_at(
        &mut self,
        project: &str,
        now: DateTime<Utc>,
    ) -> Result<Milestone, DbError> {
        let active = self
            .active_milestone_for_project(project)?
            .ok_or_else(|| MilestoneError::NoneActive {
                project: project.to_string(),
            })?;
        self.finish_milestone_at(active.id, now)?;
        Ok(Milestone {
            end_time: Some(now),
            ..active
        })
    }

    /// Name to tag a new entry for `project` with: its active milestone, if any.
    pub fn milestone_for_new_entry(&self, project: &str) -> Result<Option<String>, DbError> {
        Ok(self
            .active_milestone_for_project(project)?
            .map(|milestone| milestone.name))
    }
}
