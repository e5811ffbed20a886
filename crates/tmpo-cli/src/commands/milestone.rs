//! `tmpo milestone start | finish | status | list`.

use std::io::Write;

use anyhow::Result;
use chrono::TimeDelta;
use tmpo_core::Milestone;
use tmpo_core::types::validate_name;
use tmpo_db::Database;

use crate::Config;
use crate::cli::MilestoneAction;
use crate::display::{Formatter, format_duration, info};
use crate::workspace::Workspace;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    workspace: &Workspace,
    action: &MilestoneAction,
    config: &Config,
) -> Result<()> {
    let fmt = Formatter::new(config);
    let project = workspace.name();
    match action {
        MilestoneAction::Start { name } => start(writer, db, project, name),
        MilestoneAction::Finish => finish(writer, db, project),
        MilestoneAction::Status => status(writer, db, project, fmt),
        MilestoneAction::List { project: other, all } => {
            let scope = if *all { None } else { Some(other.as_deref().unwrap_or(project)) };
            list(writer, db, scope, fmt)
        }
    }
}

fn start<W: Write>(writer: &mut W, db: &mut Database, project: &str, name: &str) -> Result<()> {
    let name = validate_name("milestone name", name)?;
    let milestone = db.start_milestone(project, &name)?;
    writeln!(
        writer,
        "Started milestone {} for {}",
        milestone.name, milestone.project_name
    )?;
    writeln!(writer, "    └─ New time entries will be automatically tagged")?;
    Ok(())
}

fn finish<W: Write>(writer: &mut W, db: &mut Database, project: &str) -> Result<()> {
    let milestone = db.finish_active_milestone(project)?;
    let entries = db.entries_by_milestone(project, &milestone.name)?;
    writeln!(writer, "Finished milestone {}", milestone.name)?;
    info(writer, "Duration", format_duration(milestone.duration()))?;
    info(writer, "Entries", entries.len())?;
    Ok(())
}

fn status<W: Write>(writer: &mut W, db: &Database, project: &str, fmt: Formatter<'_>) -> Result<()> {
    let Some(milestone) = db.active_milestone_for_project(project)? else {
        writeln!(writer, "No active milestone")?;
        writeln!(writer, "Use 'tmpo milestone start' to start a new milestone.")?;
        return Ok(());
    };
    let entries = db.entries_by_milestone(project, &milestone.name)?;
    let total = entries
        .iter()
        .fold(TimeDelta::zero(), |sum, entry| sum + entry.duration());

    writeln!(writer, "Active Milestone: {}", milestone.name)?;
    info(writer, "Project", project)?;
    info(writer, "Started", fmt.date_time(milestone.start_time))?;
    info(writer, "Duration", format_duration(milestone.duration()))?;
    info(writer, "Entries", entries.len())?;
    info(writer, "Total Time", format_duration(total))?;
    Ok(())
}

/// Lists milestones of one project, or of all projects when `project` is `None`.
fn list<W: Write>(
    writer: &mut W,
    db: &Database,
    project: Option<&str>,
    fmt: Formatter<'_>,
) -> Result<()> {
    let milestones = match project {
        Some(project) => db.milestones_by_project(project)?,
        None => db.all_milestones()?,
    };
    if milestones.is_empty() {
        writeln!(writer, "No milestones found")?;
        return Ok(());
    }

    match project {
        Some(project) => writeln!(writer, "Milestones for {project}\n")?,
        None => writeln!(writer, "All Milestones\n")?,
    }

    let (active, finished): (Vec<&Milestone>, Vec<&Milestone>) =
        milestones.iter().partition(|m| m.is_active());
    for (heading, group) in [("Active", active), ("Finished", finished)] {
        if group.is_empty() {
            continue;
        }
        writeln!(writer, "─── {heading} ───")?;
        for milestone in group {
            let count = db
                .entries_by_milestone(&milestone.project_name, &milestone.name)?
                .len();
            if project.is_none() {
                writeln!(writer, "  {} ({})", milestone.name, milestone.project_name)?;
            } else {
                writeln!(writer, "  {}", milestone.name)?;
            }
            let span = match milestone.end_time {
                Some(end) => format!(
                    "{} - {}",
                    fmt.date_time(milestone.start_time),
                    fmt.date_time(end)
                ),
                None => format!("Started: {}", fmt.date_time(milestone.start_time)),
            };
            writeln!(
                writer,
                "    {span}  Duration: {}  Entries: {count}\n",
                format_duration(milestone.duration())
            )?;
        }
    }
    Ok(())
}
