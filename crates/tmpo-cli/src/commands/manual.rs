//! Record a completed entry after the fact.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use tmpo_core::check_range;
use tmpo_core::datetime::{validate_date, validate_end_date_time};
use tmpo_core::types::{validate_hourly_rate, validate_name};
use tmpo_db::Database;
use tracing::debug;

use crate::Config;
use crate::cli::ManualArgs;
use crate::display::{Formatter, format_duration, info};
use crate::workspace::Workspace;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    workspace: &Workspace,
    args: &ManualArgs,
    config: &Config,
) -> Result<()> {
    let fmt = Formatter::new(config);
    let project = match &args.project {
        Some(project) => validate_name("project name", project)?,
        None => workspace.name().to_string(),
    };

    let format = config.date_format;
    let now = Local::now();
    validate_date(&args.start_date, format, now).context("invalid start date")?;
    let end_date = args.end_date.as_deref().unwrap_or(&args.start_date);
    validate_date(end_date, format, now).context("invalid end date")?;
    let (start, end) =
        validate_end_date_time(&args.start_date, &args.start_time, end_date, &args.end_time, format)?;
    let (start, end) = (start.with_timezone(&Utc), end.with_timezone(&Utc));

    // The `.tmporc` rate only applies to the project it configures.
    let hourly_rate = match args.rate {
        Some(rate) => Some(validate_hourly_rate(rate)?),
        None if project == workspace.name() => workspace.hourly_rate(),
        None => None,
    };

    // An explicit milestone is kept with a warning when the entry falls outside
    // it. The active milestone is only applied to entries it covers.
    let milestone = match &args.milestone {
        Some(name) => {
            let Some(milestone) = db.milestone_by_name(&project, name)? else {
                bail!("milestone '{name}' not found for project '{project}'");
            };
            if let Some(mismatch) = check_range(start, &milestone) {
                writeln!(writer, "Date Range Mismatch")?;
                writeln!(writer, "{}\n", fmt.range_mismatch(mismatch, start))?;
            }
            Some(milestone.name)
        }
        None => match db.active_milestone_for_project(&project)? {
            Some(active) if check_range(start, &active).is_none() => Some(active.name),
            Some(active) => {
                debug!(milestone = %active.name, "entry predates active milestone, not tagging");
                None
            }
            None => None,
        },
    };

    let entry = db.create_manual_entry(
        &project,
        &args.description,
        start,
        end,
        hourly_rate,
        milestone.as_deref(),
    )?;

    writeln!(writer, "Created manual entry for {}", entry.project_name)?;
    info(writer, "Start", fmt.date_time(entry.start_time))?;
    if let Some(end) = entry.end_time {
        info(writer, "End", fmt.date_time(end))?;
    }
    info(writer, "Duration", format_duration(entry.duration()))?;
    if let Some(milestone) = &entry.milestone_name {
        info(writer, "Milestone", milestone)?;
    }
    if !entry.description.is_empty() {
        info(writer, "Description", &entry.description)?;
    }
    if let (Some(rate), Some(earnings)) = (entry.hourly_rate, entry.earnings()) {
        info(writer, "Hourly Rate", fmt.money(rate))?;
        info(writer, "Earnings", fmt.money(earnings))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::{Path, PathBuf};

    use chrono::TimeDelta;

    use crate::project_config::ProjectConfig;

    fn workspace() -> Workspace {
        let config = ProjectConfig {
            project_name: "api".to_string(),
            hourly_rate: Some(60.0),
            ..ProjectConfig::default()
        };
        Workspace::resolve(
            Some((config, PathBuf::from("/work/api/.tmporc"))),
            None,
            Path::new("/work/api"),
        )
    }

    fn args(date: &str, start: &str, end: &str) -> ManualArgs {
        ManualArgs {
            project: None,
            start_date: date.to_string(),
            start_time: start.to_string(),
            end_date: None,
            end_time: end.to_string(),
            description: String::new(),
            rate: None,
            milestone: None,
        }
    }

    fn yesterday(config: &Config) -> String {
        config
            .date_format
            .format((Local::now() - TimeDelta::days(1)).date_naive())
    }

    #[test]
    fn creates_entry_with_project_rate() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let config = Config::default();
        let args = ManualArgs {
            description: "planning".to_string(),
            ..args(&yesterday(&config), "9:00 AM", "10:30 AM")
        };

        let mut out = Vec::new();
        run(&mut out, &mut db, &workspace(), &args, &config).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("Created manual entry for api\n"));
        assert!(out.contains("    Duration: 1h 30m 0s\n"));
        assert!(out.contains("    Hourly Rate: $60.00\n"));
        assert!(out.ends_with("    Earnings: $90.00\n"));

        let entries = db.entries(0).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hourly_rate, Some(60.0));
        assert_eq!(entries[0].description, "planning");
    }

    #[test]
    fn other_project_does_not_inherit_rate() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let config = Config::default();
        let args = ManualArgs {
            project: Some("web".to_string()),
            ..args(&yesterday(&config), "09:00", "10:00")
        };

        run(&mut Vec::new(), &mut db, &workspace(), &args, &config).unwrap();
        assert_eq!(db.entries(0).unwrap()[0].hourly_rate, None);
    }

    #[test]
    fn tags_active_milestone_unless_overridden() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let config = Config::default();
        let date = yesterday(&config);
        let days_ago = |days| Utc::now() - TimeDelta::days(days);
        db.start_milestone_at("api", "old", days_ago(4)).unwrap();
        db.finish_active_milestone_at("api", days_ago(3)).unwrap();
        db.start_milestone_at("api", "current", days_ago(3)).unwrap();

        run(&mut Vec::new(), &mut db, &workspace(), &args(&date, "09:00", "10:00"), &config)
            .unwrap();
        let tagged = ManualArgs {
            milestone: Some("old".to_string()),
            ..args(&date, "11:00", "12:00")
        };
        let mut out = Vec::new();
        run(&mut out, &mut db, &workspace(), &tagged, &config).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Date Range Mismatch\nEntry starts ("));
        assert!(out.contains("after milestone ended"));

        let entries = db.entries(0).unwrap();
        assert_eq!(entries[0].milestone_name.as_deref(), Some("old"));
        assert_eq!(entries[1].milestone_name.as_deref(), Some("current"));

        let missing = ManualArgs {
            milestone: Some("nope".to_string()),
            ..args(&date, "13:00", "14:00")
        };
        assert!(run(&mut Vec::new(), &mut db, &workspace(), &missing, &config).is_err());
    }

    #[test]
    fn entry_before_active_milestone_is_not_tagged() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let config = Config::default();
        db.start_milestone("api", "sprint").unwrap();

        let mut out = Vec::new();
        let args = args(&yesterday(&config), "09:00", "10:00");
        run(&mut out, &mut db, &workspace(), &args, &config).unwrap();

        assert!(!String::from_utf8(out).unwrap().contains("Milestone"));
        assert_eq!(db.entries(0).unwrap()[0].milestone_name, None);
    }

    #[test]
    fn rejects_inverted_and_future_ranges() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        let config = Config::default();

        let inverted = args(&yesterday(&config), "5:00 PM", "9:00 AM");
        let err = run(&mut Vec::new(), &mut db, &workspace(), &inverted, &config).unwrap_err();
        assert_eq!(err.to_string(), "end time must be after start time");

        let future = config
            .date_format
            .format((Local::now() + TimeDelta::days(3)).date_naive());
        let future = args(&future, "9:00 AM", "10:00 AM");
        assert!(run(&mut Vec::new(), &mut db, &workspace(), &future, &config).is_err());

        assert!(db.entries(0).unwrap().is_empty());
    }
}
