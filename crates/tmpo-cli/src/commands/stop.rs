//! Stop or pause the running timer.
//!
//! Having nothing to stop is not an error.

use std::io::Write;

use anyhow::Result;
use tmpo_core::TimeEntry;
use tmpo_db::Database;

use crate::display::{format_duration, info};

fn stop_running(db: &mut Database) -> Result<Option<TimeEntry>> {
    let Some(running) = db.running_entry()? else {
        return Ok(None);
    };
    db.stop_entry(running.id)?;
    Ok(Some(db.get_entry(running.id)?))
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    let Some(entry) = stop_running(db)? else {
        writeln!(writer, "No active time tracking session.")?;
        return Ok(());
    };
    writeln!(writer, "Stopped tracking {}", entry.project_name)?;
    info(writer, "Total Duration", format_duration(entry.duration()))?;
    Ok(())
}

pub fn pause<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    let Some(entry) = stop_running(db)? else {
        writeln!(writer, "No active time tracking session to pause.")?;
        return Ok(());
    };
    writeln!(writer, "Paused tracking {}", entry.project_name)?;
    info(writer, "Session Duration", format_duration(entry.duration()))?;
    writeln!(writer, "    Use 'tmpo resume' to continue tracking")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_closes_running_entry() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.create_entry("api", "", None, None).unwrap();

        let mut out = Vec::new();
        run(&mut out, &mut db).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("Stopped tracking api\n    Total Duration: "));
        assert!(db.running_entry().unwrap().is_none());
        assert!(db.last_stopped_entry().unwrap().is_some());
    }

    #[test]
    fn nothing_to_stop_is_benign() {
        let mut db = Database::open_in_memory().expect("open in-memory db");

        let mut out = Vec::new();
        run(&mut out, &mut db).unwrap();
        pause(&mut out, &mut db).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No active time tracking session.\nNo active time tracking session to pause.\n"
        );
    }
}
