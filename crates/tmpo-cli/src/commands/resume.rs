//! Start a new session like the most recently stopped one.

use std::io::Write;

use anyhow::{Result, bail};
use tmpo_db::Database;

use crate::display::info;

pub fn run<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    if let Some(running) = db.running_entry()? {
        bail!(
            "already tracking time for `{}`, use 'tmpo stop' to stop the current session first",
            running.project_name
        );
    }
    let Some(last) = db.last_stopped_entry()? else {
        bail!("no previous session found to resume, use 'tmpo start' to begin a new session");
    };

    // Tag with whatever is active now, not the milestone of the old session.
    let milestone = db.milestone_for_new_entry(&last.project_name)?;
    let entry = db.create_entry(
        &last.project_name,
        &last.description,
        last.hourly_rate,
        milestone.as_deref(),
    )?;

    writeln!(writer, "Resumed tracking time for {}", entry.project_name)?;
    if let Some(milestone) = &entry.milestone_name {
        info(writer, "Milestone", milestone)?;
    }
    if !entry.description.is_empty() {
        info(writer, "Description", &entry.description)?;
    }
    Ok(())
}
