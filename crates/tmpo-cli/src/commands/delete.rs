use std::io::Write;

use anyhow::Result;
use tmpo_db::Database;

use crate::Config;
use crate::display::{Formatter, format_duration, info};

pub fn run<W: Write>(writer: &mut W, db: &mut Database, id: i64, config: &Config) -> Result<()> {
    let fmt = Formatter::new(config);
    let entry = db.get_entry(id)?;

    writeln!(writer, "Deleting entry:")?;
    info(writer, "ID", entry.id)?;
    info(writer, "Project", &entry.project_name)?;
    info(writer, "Start", fmt.date_time(entry.start_time))?;
    match entry.end_time {
        Some(end) => {
            info(writer, "End", fmt.date_time(end))?;
            info(writer, "Duration", format_duration(entry.duration()))?;
        }
        None => info(writer, "Status", "Running")?,
    }
    if !entry.description.is_empty() {
        info(writer, "Description", &entry.description)?;
    }

    db.delete_time_entry(id)?;
    writeln!(writer, "Entry deleted successfully")?;
    Ok(())
}
