//! Start a timer for the detected project.

use std::io::Write;

use anyhow::{Result, bail};
use tmpo_db::Database;

use crate::display::info;
use crate::workspace::Workspace;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    workspace: &Workspace,
    description: Option<&str>,
) -> Result<()> {
    if let Some(running) = db.running_entry()? {
        bail!(
            "already tracking time for `{}`, use 'tmpo stop' to stop the current session first",
            running.project_name
        );
    }

    let project = workspace.name();
    let milestone = db.milestone_for_new_entry(project)?;
    let entry = db.create_entry(
        project,
        description.unwrap_or_default(),
        workspace.hourly_rate(),
        milestone.as_deref(),
    )?;

    writeln!(writer, "Started tracking time for {}", entry.project_name)?;
    writeln!(writer, "    └─ Config Source: {}", workspace.project.source)?;
    if let Some(milestone) = &entry.milestone_name {
        info(writer, "Milestone", milestone)?;
    }
    if !entry.description.is_empty() {
        info(writer, "Description", &entry.description)?;
    }
    Ok(())
}
