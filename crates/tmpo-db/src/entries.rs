//! Time entry persistence.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Params, Row, params};
use tmpo_core::TimeEntry;
use tracing::debug;

use crate::{Database, DbError, format_timestamp, parse_optional_timestamp, parse_timestamp};

const ENTRY_COLUMNS: &str =
    "id, project_name, start_time, end_time, description, hourly_rate, milestone_name";

/// A `time_entries` row before timestamp parsing.
struct EntryRow {
    id: i64,
    project_name: String,
    start_time: String,
    end_time: Option<String>,
    description: Option<String>,
    hourly_rate: Option<f64>,
    milestone_name: Option<String>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_name: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            description: row.get(4)?,
            hourly_rate: row.get(5)?,
            milestone_name: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<TimeEntry, DbError> {
        Ok(TimeEntry {
            id: self.id,
            start_time: parse_timestamp(&self.start_time, "time_entries", self.id)?,
            end_time: parse_optional_timestamp(self.end_time, "time_entries", self.id)?,
            project_name: self.project_name,
            description: self.description.unwrap_or_default(),
            hourly_rate: self.hourly_rate,
            milestone_name: self.milestone_name,
        })
    }
}

fn query_entries<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<TimeEntry>, DbError> {
    query_entries_with(conn, filter, "", params)
}

/// Runs `SELECT ... {filter} ORDER BY ... {tail}` over `time_entries`.
fn query_entries_with<P: Params>(
    conn: &Connection,
    filter: &str,
    tail: &str,
    params: P,
) -> Result<Vec<TimeEntry>, DbError> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries {filter} ORDER BY start_time DESC, id DESC {tail}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, EntryRow::from_row)?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?.into_entry()?);
    }
    Ok(entries)
}

fn query_entry<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Option<TimeEntry>, DbError> {
    Ok(query_entries_with(conn, filter, "LIMIT 1", params)?
        .into_iter()
        .next())
}

fn running_entry_in(conn: &Connection) -> Result<Option<TimeEntry>, DbError> {
    query_entry(conn, "WHERE end_time IS NULL", [])
}

fn get_entry_in(conn: &Connection, id: i64) -> Result<TimeEntry, DbError> {
    query_entry(conn, "WHERE id = ?", [id])?.ok_or(DbError::EntryNotFound(id))
}

fn project_list(conn: &Connection, sql: &str) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut projects = Vec::new();
    for row in rows {
        projects.push(row?);
    }
    Ok(projects)
}

impl Database {
    /// Starts a timer for `project` at the current time.
    ///
    /// Fails with [`DbError::AlreadyRunning`] if another entry is still running.
    pub fn create_entry(
        &mut self,
        project: &str,
        description: &str,
        hourly_rate: Option<f64>,
        milestone: Option<&str>,
    ) -> Result<TimeEntry, DbError> {
        self.create_entry_at(project, description, hourly_rate, milestone, Utc::now())
    }

    fn create_entry_at(
        &mut self,
        project: &str,
        description: &str,
        hourly_rate: Option<f64>,
        milestone: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TimeEntry, DbError> {
        let tx = self.conn.transaction()?;
        if let Some(running) = running_entry_in(&tx)? {
            return Err(DbError::AlreadyRunning {
                project: running.project_name,
            });
        }
        tx.execute(
            "
            INSERT INTO time_entries (project_name, start_time, description, hourly_rate, milestone_name)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                project,
                format_timestamp(now),
                description,
                hourly_rate,
                milestone
            ],
        )?;
        let id = tx.last_insert_rowid();
        let entry = get_entry_in(&tx, id)?;
        tx.commit()?;
        debug!(id, project, "started entry");
        Ok(entry)
    }

    /// Inserts an already-completed entry.
    ///
    /// The caller validates `end > start`; the store accepts whatever it is given.
    pub fn create_manual_entry(
        &mut self,
        project: &str,
        description: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        hourly_rate: Option<f64>,
        milestone: Option<&str>,
    ) -> Result<TimeEntry, DbError> {
        self.conn.execute(
            "
            INSERT INTO time_entries (project_name, start_time, end_time, description, hourly_rate, milestone_name)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                project,
                format_timestamp(start),
                format_timestamp(end),
                description,
                hourly_rate,
                milestone
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, project, "created manual entry");
        get_entry_in(&self.conn, id)
    }

    /// The most recently started entry with no end time.
    pub fn running_entry(&self) -> Result<Option<TimeEntry>, DbError> {
        running_entry_in(&self.conn)
    }

    /// The most recently started completed entry.
    pub fn last_stopped_entry(&self) -> Result<Option<TimeEntry>, DbError> {
        query_entry(&self.conn, "WHERE end_time IS NOT NULL", [])
    }

    /// Sets the entry's end time to now.
    pub fn stop_entry(&mut self, id: i64) -> Result<(), DbError> {
        self.stop_entry_at(id, Utc::now())
    }

    fn stop_entry_at(&mut self, id: i64, now: DateTime<Utc>) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE time_entries SET end_time = ? WHERE id = ?",
            params![format_timestamp(now), id],
        )?;
        debug!(id, "stopped entry");
        Ok(())
    }

    pub fn get_entry(&self, id: i64) -> Result<TimeEntry, DbError> {
        get_entry_in(&self.conn, id)
    }

    /// Lists entries, newest first. `limit <= 0` means all of them.
    pub fn entries(&self, limit: i64) -> Result<Vec<TimeEntry>, DbError> {
        let limit = if limit <= 0 { -1 } else { limit };
        query_entries_with(&self.conn, "", "LIMIT ?", [limit])
    }

    pub fn entries_by_project(&self, project: &str) -> Result<Vec<TimeEntry>, DbError> {
        query_entries(&self.conn, "WHERE project_name = ?", [project])
    }

    pub fn completed_entries_by_project(&self, project: &str) -> Result<Vec<TimeEntry>, DbError> {
        query_entries(
            &self.conn,
            "WHERE project_name = ? AND end_time IS NOT NULL",
            [project],
        )
    }

    /// Entries whose start time lies in `[start, end]`, both ends inclusive.
    pub fn entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, DbError> {
        query_entries(
            &self.conn,
            "WHERE start_time >= ? AND start_time <= ?",
            [format_timestamp(start), format_timestamp(end)],
        )
    }

    pub fn entries_by_milestone(
        &self,
        project: &str,
        milestone: &str,
    ) -> Result<Vec<TimeEntry>, DbError> {
        query_entries(
            &self.conn,
            "WHERE project_name = ? AND milestone_name = ?",
            [project, milestone],
        )
    }

    /// Distinct project names, ascending.
    pub fn all_projects(&self) -> Result<Vec<String>, DbError> {
        project_list(
            &self.conn,
            "SELECT DISTINCT project_name FROM time_entries ORDER BY project_name",
        )
    }

    /// Distinct names of projects with at least one completed entry, ascending.
    pub fn projects_with_completed_entries(&self) -> Result<Vec<String>, DbError> {
        project_list(
            &self.conn,
            "SELECT DISTINCT project_name FROM time_entries WHERE end_time IS NOT NULL ORDER BY project_name",
        )
    }

    /// Overwrites every field of entry `id`. A missing row is not an error.
    pub fn update_time_entry(&mut self, id: i64, entry: &TimeEntry) -> Result<(), DbError> {
        self.conn.execute(
            "
            UPDATE time_entries
            SET project_name = ?, start_time = ?, end_time = ?, description = ?, hourly_rate = ?, milestone_name = ?
            WHERE id = ?
            ",
            params![
                entry.project_name,
                format_timestamp(entry.start_time),
                entry.end_time.map(format_timestamp),
                entry.description,
                entry.hourly_rate,
                entry.milestone_name,
                id,
            ],
        )?;
        debug!(id, "updated entry");
        Ok(())
    }

    /// Deletes entry `id`. Deleting a missing row succeeds.
    pub fn delete_time_entry(&mut self, id: i64) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM time_entries WHERE id = ?", [id])?;
        debug!(id, deleted, "deleted entry");
        Ok(())
    }
}
