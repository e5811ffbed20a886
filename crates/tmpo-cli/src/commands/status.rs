//! Show the running timer.

use std::io::Write;

use anyhow::Result;
use tmpo_db::Database;

use crate::Config;
use crate::display::{Formatter, format_duration, info};

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let fmt = Formatter::new(config);
    let Some(running) = db.running_entry()? else {
        writeln!(writer, "Not currently tracking time")?;
        writeln!(writer, "Use 'tmpo start' to begin tracking")?;
        return Ok(());
    };

    writeln!(writer, "Currently tracking: {}", running.project_name)?;
    info(writer, "Started", fmt.time(running.start_time))?;
    info(writer, "Duration", format_duration(running.duration()))?;
    if let Some(milestone) = &running.milestone_name {
        info(writer, "Milestone", milestone)?;
    }
    if !running.description.is_empty() {
        info(writer, "Description", &running.description)?;
    }
    Ok(())
}
