//! Time tracking history, grouped by day.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tmpo_core::TimeEntry;
use tmpo_db::Database;

use crate::Config;
use crate::cli::LogArgs;
use crate::commands::filter::EntryFilter;
use crate::display::{Formatter, SEPARATOR, format_duration};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    current_project: &str,
    args: &LogArgs,
    config: &Config,
) -> Result<()> {
    let filter = EntryFilter::new(args.milestone.as_deref(), &args.period, args.project.as_deref());
    let entries = filter.load(db, current_project, Some(args.limit))?;
    render(writer, &entries, Formatter::new(config), Utc::now())
}

pub fn render<W, Tz>(
    writer: &mut W,
    entries: &[TimeEntry],
    fmt: Formatter<'_, Tz>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone + Copy,
    Tz::Offset: fmt::Display,
{
    if entries.is_empty() {
        writeln!(writer, "No time entries found.")?;
        return Ok(());
    }

    writeln!(writer, "Time Entries ({} total)\n", entries.len())?;

    let mut total = TimeDelta::zero();
    let mut current_date = None;
    for entry in entries {
        let date = fmt.date_long(entry.start_time);
        if current_date.as_ref() != Some(&date) {
            if current_date.is_some() {
                writeln!(writer)?;
            }
            writeln!(writer, "─── {date} ───")?;
            current_date = Some(date);
        }

        let duration = entry.duration_at(now);
        total += duration;

        let end = entry
            .end_time
            .map_or_else(|| "(running)".to_string(), |end| fmt.time_padded(end));
        writeln!(
            writer,
            "  {} - {}  {:<20}  {}",
            fmt.time_padded(entry.start_time),
            end,
            entry.project_name,
            format_duration(duration)
        )?;
        if let Some(milestone) = &entry.milestone_name {
            let branch = if entry.description.is_empty() { "└─" } else { "├─" };
            writeln!(writer, "    {branch} Milestone: {milestone}")?;
        }
        if !entry.description.is_empty() {
            writeln!(writer, "    └─ {}", entry.description)?;
        }
    }

    writeln!(writer, "\n{SEPARATOR}")?;
    writeln!(writer, "Total Time: {}", format_duration(total))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tmpo_core::TimeFormat;

    fn entry(id: i64, day: u32, hour: u32, minutes: Option<i64>) -> TimeEntry {
        let start = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
        TimeEntry {
            id,
            project_name: "api".to_string(),
            start_time: start,
            end_time: minutes.map(|m| start + TimeDelta::minutes(m)),
            description: String::new(),
            hourly_rate: None,
            milestone_name: None,
        }
    }

    #[test]
    fn groups_entries_by_day() {
        let now = Utc.with_ymd_and_hms(2024, 1, 16, 15, 30, 0).unwrap();
        let entries = [
            TimeEntry {
                milestone_name: Some("v1".to_string()),
                ..entry(3, 16, 15, None)
            },
            TimeEntry {
                description: "review".to_string(),
                milestone_name: Some("v1".to_string()),
                ..entry(2, 16, 9, Some(45))
            },
            TimeEntry {
                description: "setup".to_string(),
                ..entry(1, 15, 13, Some(90))
            },
        ];
        let config = Config {
            time_format: TimeFormat::TwentyFourHour,
            ..Config::default()
        };

        let mut out = Vec::new();
        render(&mut out, &entries, Formatter::with_tz(&config, Utc), now).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_snapshot!(output, @r"
        Time Entries (3 total)

        ─── Tuesday, January 16, 2024 ───
          15:00 - (running)  api                   30m 0s
            └─ Milestone: v1
          09:00 - 09:45  api                   45m 0s
            ├─ Milestone: v1
            └─ review

        ─── Monday, January 15, 2024 ───
          13:00 - 14:30  api                   1h 30m 0s
            └─ setup

        ─────────────────────────────────────────
        Total Time: 2h 45m 0s
        ");
    }

    #[test]
    fn twelve_hour_times_are_padded() {
        let now = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        let config = Config::default();

        let mut out = Vec::new();
        render(&mut out, &[entry(1, 15, 9, Some(5))], Formatter::with_tz(&config, Utc), now).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("   9:00 AM -  9:05 AM  api"));
    }

    #[test]
    fn empty_history() {
        let config = Config::default();
        let mut out = Vec::new();
        render(&mut out, &[], Formatter::with_tz(&config, Utc), Utc::now()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No time entries found.\n");
    }
}
