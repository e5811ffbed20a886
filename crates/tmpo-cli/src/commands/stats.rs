//! Time statistics for today, this week or all time.

use std::io::Write;

use anyhow::Result;
use chrono::{Local, Utc};
use tmpo_core::{Period, Stats, StatsScope, hours};
use tmpo_db::Database;

use crate::Config;
use crate::display::{Formatter, format_duration, info};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    period: Option<Period>,
    config: &Config,
) -> Result<()> {
    let fmt = Formatter::new(config);
    let now = Utc::now();
    let (entries, scope) = match period {
        Some(period) => {
            let (start, end) = period.bounds(now.with_timezone(&Local));
            let scope = StatsScope::Period {
                name: period.name().to_string(),
            };
            (db.entries_in_range(start, end)?, scope)
        }
        None => {
            let scope = StatsScope::AllTime {
                projects_tracked: db.all_projects()?.len(),
            };
            (db.entries(0)?, scope)
        }
    };
    let stats = Stats::compute(&entries, now);
    render(writer, &scope, stats.as_ref(), fmt)
}

/// Writes the stats report. `stats` is `None` when no entries matched.
pub fn render<W: Write>(
    writer: &mut W,
    scope: &StatsScope,
    stats: Option<&Stats>,
    fmt: Formatter<'_>,
) -> Result<()> {
    let Some(stats) = stats else {
        match scope {
            StatsScope::Period { name } => writeln!(writer, "No entries for {name}.")?,
            StatsScope::AllTime { .. } => writeln!(writer, "No entries found.")?,
        }
        return Ok(());
    };

    match scope {
        StatsScope::Period { name } => writeln!(writer, "Stats for {name}\n")?,
        StatsScope::AllTime { .. } => writeln!(writer, "All-Time Statistics")?,
    }
    info(
        writer,
        "Total Time",
        format_args!(
            "{} ({:.2} hours)",
            format_duration(stats.total),
            hours(stats.total)
        ),
    )?;
    info(writer, "Total Entries", stats.entry_count)?;
    if let StatsScope::AllTime { projects_tracked } = scope {
        info(writer, "Projects Tracked", projects_tracked)?;
    }
    if let Some(earnings) = stats.earnings {
        info(writer, "Earnings", fmt.money(earnings))?;
    }

    writeln!(writer, "\n    By Project")?;
    for project in &stats.projects {
        writeln!(
            writer,
            "        {:<20}  {}  ({:.1}%)",
            project.project,
            format_duration(project.duration),
            project.percentage
        )?;
        if let Some(earnings) = project.earnings.filter(|amount| *amount > 0.0) {
            writeln!(writer, "        └─ Earnings: {}", fmt.money(earnings))?;
        }
    }
    Ok(())
}
