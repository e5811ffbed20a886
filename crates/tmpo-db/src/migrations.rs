//! Ordered schema migrations applied on every open.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::debug;

use crate::{DbError, format_timestamp, parse_optional_timestamp, parse_timestamp};

/// One schema change, identified by a version recorded in `schema_migrations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// Adds a column unless `PRAGMA table_info` already lists it.
    AddColumn {
        version: i64,
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
    /// Rewrites every stored timestamp as RFC 3339 UTC.
    NormalizeTimestamps { version: i64 },
}

impl Migration {
    pub const fn version(&self) -> i64 {
        match self {
            Self::AddColumn { version, .. } | Self::NormalizeTimestamps { version } => *version,
        }
    }
}

pub const MIGRATIONS: &[Migration] = &[
    Migration::AddColumn {
        version: 1,
        table: "time_entries",
        column: "hourly_rate",
        definition: "REAL",
    },
    Migration::AddColumn {
        version: 2,
        table: "time_entries",
        column: "milestone_name",
        definition: "TEXT",
    },
    Migration::NormalizeTimestamps { version: 3 },
];

/// Tables holding `start_time` / `end_time` timestamp columns.
const TIMESTAMP_TABLES: [&str; 2] = ["time_entries", "milestones"];

pub(crate) fn apply(conn: &mut Connection, now: DateTime<Utc>) -> Result<(), DbError> {
    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        let version = migration.version();
        let recorded = is_recorded(&tx, version)?;
        match *migration {
            Migration::AddColumn {
                table,
                column,
                definition,
                ..
            } => {
                if !has_column(&tx, table, column)? {
                    debug!(table, column, "adding column");
                    tx.execute_batch(&format!(
                        "ALTER TABLE {table} ADD COLUMN {column} {definition}"
                    ))?;
                }
            }
            Migration::NormalizeTimestamps { .. } => {
                if !recorded {
                    for table in TIMESTAMP_TABLES {
                        let rewritten = normalize_timestamps(&tx, table)?;
                        debug!(table, rewritten, "normalized timestamps");
                    }
                }
            }
        }
        if !recorded {
            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)",
                params![version, format_timestamp(now)],
            )?;
            debug!(version, "recorded migration");
        }
    }
    tx.commit()?;
    Ok(())
}

fn is_recorded(tx: &Transaction<'_>, version: i64) -> Result<bool, DbError> {
    let found = tx
        .query_row(
            "SELECT 1 FROM schema_migrations WHERE version = ?",
            [version],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn has_column(tx: &Transaction<'_>, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = tx.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for row in rows {
        if row? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn normalize_timestamps(tx: &Transaction<'_>, table: &'static str) -> Result<usize, DbError> {
    let rows = {
        let mut stmt = tx.prepare(&format!("SELECT id, start_time, end_time FROM {table}"))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;
        let mut collected = Vec::new();
        for row in rows {
            collected.push(row?);
        }
        collected
    };

    let mut update = tx.prepare(&format!(
        "UPDATE {table} SET start_time = ?, end_time = ? WHERE id = ?"
    ))?;
    let mut rewritten = 0;
    for (id, start, end) in rows {
        let new_start = format_timestamp(parse_timestamp(&start, table, id)?);
        let new_end = parse_optional_timestamp(end.clone(), table, id)?.map(format_timestamp);
        if new_start != start || new_end != end {
            update.execute(params![new_start, new_end, id])?;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Database;
    use crate::tests::table_columns;

    fn legacy_store(with_hourly_rate: bool) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tmpo.db");
        let conn = Connection::open(&path).expect("open legacy db");
        let rate_column = if with_hourly_rate {
            ", hourly_rate REAL"
        } else {
            ""
        };
        conn.execute_batch(&format!(
            "
            CREATE TABLE time_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_name TEXT NOT NULL,
                start_time DATETIME NOT NULL,
                end_time DATETIME,
                description TEXT{rate_column}
            );
            INSERT INTO time_entries (project_name, start_time, end_time, description)
            VALUES ('legacy', '2024-01-01 09:00:00-05:00', '2024-01-01 10:30:00.5-05:00', 'old work');
            INSERT INTO time_entries (project_name, start_time, end_time, description)
            VALUES ('legacy', '2024-01-02 09:00:00-05:00', NULL, NULL);
            "
        ))
        .expect("create legacy schema");
        (temp, path)
    }

    #[test]
    fn legacy_store_gains_missing_columns() {
        let (_temp, path) = legacy_store(false);
        let db = Database::open(&path).expect("migrate legacy db");

        let columns = table_columns(&db.conn, "time_entries");
        assert!(columns.contains(&"hourly_rate".to_string()));
        assert!(columns.contains(&"milestone_name".to_string()));

        let entries = db.entries(0).expect("entries");
        assert_eq!(entries.len(), 2);
        let old = &entries[1];
        assert_eq!(old.project_name, "legacy");
        assert_eq!(old.description, "old work");
        assert_eq!(old.hourly_rate, None);
        assert_eq!(old.milestone_name, None);
        assert_eq!(old.duration(), chrono::TimeDelta::milliseconds(90 * 60_000 + 500));
        assert!(entries[0].is_running());
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn existing_column_is_tolerated() {
        let (_temp, path) = legacy_store(true);
        let db = Database::open(&path).expect("migrate partially upgraded db");
        let columns = table_columns(&db.conn, "time_entries");
        assert_eq!(
            columns.iter().filter(|c| c.as_str() == "hourly_rate").count(),
            1
        );
        assert!(columns.contains(&"milestone_name".to_string()));
    }

    #[test]
    fn legacy_timestamps_are_rewritten_in_utc() {
        let (_temp, path) = legacy_store(false);
        let db = Database::open(&path).expect("migrate legacy db");

        let stored: String = db
            .conn
            .query_row(
                "SELECT start_time FROM time_entries WHERE description = 'old work'",
                [],
                |row| row.get(0),
            )
            .expect("stored start");
        assert_eq!(stored, "2024-01-01T14:00:00.000Z");
    }
}
