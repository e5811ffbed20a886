//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tmpo_core::Period;

/// Minimal CLI time tracker for developers.
///
/// Tracks time against the project you are working in, detected from a
/// `.tmporc` file, the enclosing git repository, or the directory name.
#[derive(Debug, Parser)]
#[command(name = "tmpo", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an additional settings file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking time for the current project.
    Start {
        /// What you are working on.
        description: Option<String>,
    },

    /// Stop the running timer.
    Stop,

    /// Pause the running timer; continue with `tmpo resume`.
    Pause,

    /// Start a new session like the last stopped one.
    Resume,

    /// Show the running timer.
    Status,

    /// View time tracking history.
    Log(LogArgs),

    /// Show time statistics.
    Stats(PeriodArgs),

    /// Record a completed entry.
    Manual(ManualArgs),

    /// Edit a completed entry.
    Edit(EditArgs),

    /// Delete an entry.
    Delete {
        /// Entry id, as shown by `tmpo log`.
        id: i64,
    },

    /// Export entries to CSV or JSON.
    Export(ExportArgs),

    /// Manage milestones.
    #[command(subcommand)]
    Milestone(MilestoneAction),

    /// Create a `.tmporc` in the current directory.
    Init(InitArgs),

    /// Show or change global settings.
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// Only today.
    #[arg(short, long, conflicts_with = "week")]
    pub today: bool,

    /// Only this week (Monday to Sunday).
    #[arg(short, long)]
    pub week: bool,
}

impl PeriodArgs {
    pub const fn period(&self) -> Option<Period> {
        if self.today {
            Some(Period::Today)
        } else if self.week {
            Some(Period::Week)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Number of entries to show; 0 shows everything.
    #[arg(short, long, default_value_t = 10)]
    pub limit: i64,

    /// Filter by project name.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Filter by milestone of the current project.
    #[arg(short, long)]
    pub milestone: Option<String>,

    #[command(flatten)]
    pub period: PeriodArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ManualArgs {
    /// Project name; defaults to the detected project.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Start date in the configured date format.
    #[arg(long)]
    pub start_date: String,

    /// Start time, e.g. `9:30 AM` or `14:30`.
    #[arg(long)]
    pub start_time: String,

    /// End date; defaults to the start date.
    #[arg(long)]
    pub end_date: Option<String>,

    /// End time, e.g. `5:00 PM` or `17:00`.
    #[arg(long)]
    pub end_time: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Hourly rate; defaults to the project's configured rate.
    #[arg(long)]
    pub rate: Option<f64>,

    /// Milestone to tag the entry with; defaults to the active milestone.
    #[arg(short, long)]
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct EditArgs {
    /// Entry id, as shown by `tmpo log`.
    pub id: i64,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub start_time: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub end_time: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Assign the entry to an existing milestone of its project.
    #[arg(short, long, conflicts_with = "no_milestone")]
    pub milestone: Option<String>,

    /// Remove the entry's milestone.
    #[arg(long)]
    pub no_milestone: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Output file name.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter by project name.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Filter by milestone of the current project.
    #[arg(short, long)]
    pub milestone: Option<String>,

    #[command(flatten)]
    pub period: PeriodArgs,
}

#[derive(Debug, Subcommand)]
pub enum MilestoneAction {
    /// Start a milestone for the current project.
    Start {
        name: String,
    },
    /// Finish the active milestone.
    Finish,
    /// Show the active milestone.
    Status,
    /// List milestones.
    List {
        /// Show milestones of this project instead of the current one.
        #[arg(short, long, conflicts_with = "all")]
        project: Option<String>,
        /// Show milestones of every project.
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct InitArgs {
    /// Write the detected project name with no rate or description.
    #[arg(
        short = 'a',
        long,
        conflicts_with_all = ["name", "rate", "description", "export_path"]
    )]
    pub accept_defaults: bool,

    /// Project name; defaults to the detected one.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Hourly rate for billing.
    #[arg(short, long)]
    pub rate: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Default export directory for this project.
    #[arg(short, long)]
    pub export_path: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// ISO 4217 currency code, e.g. USD or EUR.
    #[arg(long)]
    pub currency: Option<String>,

    /// MM/DD/YYYY, DD/MM/YYYY or YYYY-MM-DD.
    #[arg(long)]
    pub date_format: Option<String>,

    /// 12-hour or 24-hour.
    #[arg(long)]
    pub time_format: Option<String>,

    /// Default export directory.
    #[arg(long, conflicts_with = "clear_export_path")]
    pub export_path: Option<String>,

    /// Remove the default export directory.
    #[arg(long)]
    pub clear_export_path: bool,

    /// IANA timezone such as America/New_York, or UTC.
    #[arg(long, conflicts_with = "clear_timezone")]
    pub timezone: Option<String>,

    /// Go back to the local timezone.
    #[arg(long)]
    pub clear_timezone: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_defaults_to_ten_entries() {
        let cli = Cli::try_parse_from(["tmpo", "log"]).unwrap();
        let Some(Commands::Log(args)) = cli.command else {
            panic!("expected log command");
        };
        assert_eq!(args.limit, 10);
        assert!(!args.period.today);
    }

    #[test]
    fn today_and_week_conflict() {
        assert!(Cli::try_parse_from(["tmpo", "stats", "--today", "--week"]).is_err());
    }

    #[test]
    fn export_format_parses() {
        let cli = Cli::try_parse_from(["tmpo", "export", "-f", "json", "-t"]).unwrap();
        let Some(Commands::Export(args)) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.format, ExportFormat::Json);
        assert!(args.period.today);
    }
}
