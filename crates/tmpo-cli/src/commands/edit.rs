//! Edit a completed entry.
//!
//! Only the fields given on the command line change. Assigning a milestone whose
//! time range does not contain the entry prints a warning but still applies.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use tmpo_core::datetime::{parse_time, resolve_local, validate_date};
use tmpo_core::types::validate_time_range;
use tmpo_core::{DateFormat, TimeEntry, check_range};
use tmpo_db::Database;

use crate::Config;
use crate::cli::EditArgs;
use crate::display::Formatter;

const NO_MILESTONE: &str = "(None)";

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &EditArgs,
    config: &Config,
) -> Result<()> {
    let fmt = Formatter::new(config);
    let original = db.get_entry(args.id)?;
    let Some(original_end) = original.end_time else {
        bail!(
            "entry #{} is still running, stop it before editing",
            original.id
        );
    };

    let format = config.date_format;
    let start_time = replace_date_time(
        original.start_time,
        args.start_date.as_deref(),
        args.start_time.as_deref(),
        format,
    )
    .context("invalid start datetime")?;
    let end_time = replace_date_time(
        original_end,
        args.end_date.as_deref(),
        args.end_time.as_deref(),
        format,
    )
    .context("invalid end datetime")?;
    validate_time_range(start_time, end_time)?;

    let milestone_name = if args.no_milestone {
        None
    } else if let Some(name) = &args.milestone {
        let Some(milestone) = db.milestone_by_name(&original.project_name, name)? else {
            bail!(
                "milestone '{name}' not found for project '{}'",
                original.project_name
            );
        };
        if let Some(mismatch) = check_range(start_time, &milestone) {
            writeln!(writer, "Date Range Mismatch")?;
            writeln!(writer, "{}\n", fmt.range_mismatch(mismatch, start_time))?;
        }
        Some(milestone.name)
    } else {
        original.milestone_name.clone()
    };

    let edited = TimeEntry {
        start_time,
        end_time: Some(end_time),
        description: args
            .description
            .clone()
            .unwrap_or_else(|| original.description.clone()),
        milestone_name,
        ..original.clone()
    };

    let changes = describe_changes(&original, &edited, fmt);
    if changes.is_empty() {
        writeln!(writer, "No changes detected")?;
        return Ok(());
    }

    writeln!(writer, "Changes to entry: #{}\n", original.id)?;
    for change in &changes {
        writeln!(writer, "    {change}")?;
    }
    db.update_time_entry(original.id, &edited)?;
    writeln!(writer, "\nEntry updated successfully")?;
    Ok(())
}

/// Replaces the date and/or time of day of `current`, keeping whatever is not given.
fn replace_date_time(
    current: DateTime<Utc>,
    date: Option<&str>,
    time: Option<&str>,
    format: DateFormat,
) -> Result<DateTime<Utc>> {
    if date.is_none() && time.is_none() {
        return Ok(current);
    }
    let local = current.with_timezone(&Local);
    let date = match date {
        Some(date) => validate_date(date, format, Local::now())?,
        None => local.date_naive(),
    };
    let time = match time {
        Some(time) => parse_time(time)?,
        None => local.time(),
    };
    Ok(resolve_local(&Local, date.and_time(time))?.with_timezone(&Utc))
}

fn describe_changes(old: &TimeEntry, new: &TimeEntry, fmt: Formatter<'_>) -> Vec<String> {
    let mut changes = Vec::new();
    if old.start_time != new.start_time {
        changes.push(format!(
            "Start time: {} → {}",
            fmt.date_time(old.start_time),
            fmt.date_time(new.start_time)
        ));
    }
    if old.end_time != new.end_time {
        let show = |end: Option<DateTime<Utc>>| end.map(|end| fmt.date_time(end)).unwrap_or_default();
        changes.push(format!(
            "End time: {} → {}",
            show(old.end_time),
            show(new.end_time)
        ));
    }
    if old.description != new.description {
        changes.push(format!(
            "Description: {:?} → {:?}",
            old.description, new.description
        ));
    }
    if old.milestone_name != new.milestone_name {
        changes.push(format!(
            "Milestone: {} → {}",
            old.milestone_name.as_deref().unwrap_or(NO_MILESTONE),
            new.milestone_name.as_deref().unwrap_or(NO_MILESTONE)
        ));
    }
    changes
}
