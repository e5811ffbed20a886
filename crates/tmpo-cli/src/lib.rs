//! tmpo CLI library.
//!
//! Argument parsing, settings, project detection and the subcommands of the
//! `tmpo` binary.

mod cli;
pub mod commands;
mod config;
pub mod display;
pub mod export;
pub mod project_config;
pub mod workspace;

pub use cli::{
    Cli, Commands, ConfigArgs, EditArgs, ExportArgs, ExportFormat, InitArgs, LogArgs, ManualArgs,
    MilestoneAction, PeriodArgs,
};
pub use config::{Config, SETTINGS_FILE, expand_home};
