//! Storage layer for tmpo.
//!
//! Provides persistence for time entries and milestones using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Each command invocation opens its own connection; concurrent invocations rely on
//! SQLite's own file locking.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`), so lexicographic ordering matches
//! chronological ordering. Older installations wrote
//! `2024-01-15 10:30:00.123456789-05:00`; those values are still readable and are
//! rewritten by a migration on first open.
//!
//! ## Migrations
//!
//! Columns added after the first release are listed in [`migrations`] and applied in
//! order on every open. A step whose column already exists is a no-op, so reopening
//! an up-to-date store changes nothing.
//!
//! ## Milestone references
//!
//! `time_entries.milestone_name` refers to `milestones(project_name, name)` by value.
//! There is no foreign key; entries keep the name even if the milestone row goes away.

mod entries;
mod migrations;
mod milestones;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use thiserror::Error;
use tmpo_core::MilestoneError;
use tracing::debug;

pub use migrations::{MIGRATIONS, Migration};

/// File name of the store inside the data directory.
pub const DATABASE_FILE: &str = "tmpo.db";

/// Environment variable that selects the development data directory.
pub const DEV_MODE_VAR: &str = "TMPO_DEV";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not determine home directory")]
    HomeDirUnavailable,
    #[error("failed to create data directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp in {table} row {id}: {timestamp}")]
    TimestampParse {
        table: &'static str,
        id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("time entry {0} not found")]
    EntryNotFound(i64),
    /// A timer is already running; it must be stopped before another starts.
    #[error("already tracking time for '{project}'")]
    AlreadyRunning { project: String },
    #[error(transparent)]
    Milestone(#[from] MilestoneError),
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

/// Whether the value of `TMPO_DEV` selects the development directory.
pub fn is_dev_mode(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1" | "true"))
}

/// `<home>/.tmpo`, or `<home>/.tmpo-dev` in development mode.
pub fn data_dir_for(home: &Path, dev: bool) -> PathBuf {
    home.join(if dev { ".tmpo-dev" } else { ".tmpo" })
}

/// Per-user data directory, honouring `TMPO_DEV`.
pub fn data_dir() -> Result<PathBuf, DbError> {
    let home = dirs::home_dir().ok_or(DbError::HomeDirUnavailable)?;
    let dev = is_dev_mode(std::env::var(DEV_MODE_VAR).ok().as_deref());
    Ok(data_dir_for(&home, dev))
}

impl Database {
    /// Opens the per-user store, creating the data directory if needed.
    pub fn initialize() -> Result<Self, DbError> {
        Self::initialize_in(&data_dir()?)
    }

    /// Opens `tmpo.db` inside `dir`, creating `dir` if needed.
    pub fn initialize_in(dir: &Path) -> Result<Self, DbError> {
        std::fs::create_dir_all(dir).map_err(|source| DbError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::open(&dir.join(DATABASE_FILE))
    }

    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized and migrated on open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS time_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_name TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS milestones (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_name TEXT NOT NULL,
                name TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                UNIQUE(project_name, name)
            );

            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
        )?;

        migrations::apply(&mut self.conn, Utc::now())?;

        self.conn.execute_batch(
            "
            CREATE INDEX IF NOT EXISTS idx_time_entries_start ON time_entries(start_time);
            CREATE INDEX IF NOT EXISTS idx_time_entries_milestone ON time_entries(milestone_name);
            CREATE INDEX IF NOT EXISTS idx_milestones_project_active ON milestones(project_name, end_time);
            ",
        )?;
        Ok(())
    }
}

const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

fn parse_timestamp(
    timestamp: &str,
    table: &'static str,
    id: i64,
) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .or_else(|_| DateTime::parse_from_str(timestamp, LEGACY_TIMESTAMP_FORMAT))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            table,
            id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn parse_optional_timestamp(
    timestamp: Option<String>,
    table: &'static str,
    id: i64,
) -> Result<Option<DateTime<Utc>>, DbError> {
    timestamp
        .map(|value| parse_timestamp(&value, table, id))
        .transpose()
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::TimeZone;

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "time_entries"),
            vec![
                "id",
                "project_name",
                "start_time",
                "end_time",
                "description",
                "hourly_rate",
                "milestone_name",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "milestones"),
            vec!["id", "project_name", "name", "start_time", "end_time"]
        );

        let entry_indexes = index_names(&db.conn, "time_entries");
        assert!(entry_indexes.contains("idx_time_entries_milestone"));
        assert!(entry_indexes.contains("idx_time_entries_start"));
        assert!(index_names(&db.conn, "milestones").contains("idx_milestones_project_active"));
    }

    #[test]
    fn initialize_in_creates_directory_and_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("nested").join(".tmpo");

        let db = Database::initialize_in(&dir).expect("initialize");
        drop(db);

        assert!(dir.join(DATABASE_FILE).is_file());
    }

    #[test]
    fn reopening_is_a_no_op() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(DATABASE_FILE);

        let mut db = Database::open(&path).expect("first open");
        db.create_entry("proj", "work", None, None)
            .expect("create entry");
        drop(db);

        let db = Database::open(&path).expect("second open");
        let applied: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .expect("count migrations");
        assert_eq!(applied, i64::try_from(MIGRATIONS.len()).unwrap());
        assert_eq!(db.entries(0).expect("entries").len(), 1);
    }

    #[test]
    fn dev_mode_toggle() {
        assert!(is_dev_mode(Some("1")));
        assert!(is_dev_mode(Some("true")));
        assert!(!is_dev_mode(Some("0")));
        assert!(!is_dev_mode(Some("yes")));
        assert!(!is_dev_mode(None));

        let home = Path::new("/home/me");
        assert_eq!(data_dir_for(home, false), Path::new("/home/me/.tmpo"));
        assert_eq!(data_dir_for(home, true), Path::new("/home/me/.tmpo-dev"));
    }

    #[test]
    fn timestamps_format_sortably_and_parse_legacy_values() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-15T10:30:00.000Z");
        assert_eq!(
            parse_timestamp("2024-01-15T10:30:00.000Z", "time_entries", 1).unwrap(),
            ts
        );
        assert_eq!(
            parse_timestamp("2024-01-15 05:30:00.123456789-05:00", "time_entries", 1).unwrap(),
            ts + chrono::TimeDelta::nanoseconds(123_456_789)
        );
        assert!(matches!(
            parse_timestamp("yesterday", "time_entries", 7),
            Err(DbError::TimestampParse { id: 7, .. })
        ));
    }

    pub(crate) fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }
}
