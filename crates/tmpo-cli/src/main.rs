use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tmpo_cli::commands::{
    config, delete, edit, export, init, log, manual, milestone, resume, start, stats, status, stop,
};
use tmpo_cli::workspace::{Workspace, default_project_name};
use tmpo_cli::{Cli, Commands, Config};
use tmpo_db::Database;

/// Load settings and open the database in the data directory.
fn open_database(data_dir: &Path, config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(data_dir, config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let db = Database::initialize_in(data_dir).context("failed to open database")?;
    Ok((db, config))
}

fn detect_workspace() -> Result<Workspace> {
    Ok(Workspace::detect(&current_dir()?))
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to determine the current directory")
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tracing may already be initialized (e.g. in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let data_dir = tmpo_db::data_dir().context("failed to locate the data directory")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let config_path = cli.config.as_deref();

    match command {
        Commands::Start { description } => {
            let (mut db, _config) = open_database(&data_dir, config_path)?;
            start::run(&mut out, &mut db, &detect_workspace()?, description.as_deref())?;
        }
        Commands::Stop => {
            let (mut db, _config) = open_database(&data_dir, config_path)?;
            stop::run(&mut out, &mut db)?;
        }
        Commands::Pause => {
            let (mut db, _config) = open_database(&data_dir, config_path)?;
            stop::pause(&mut out, &mut db)?;
        }
        Commands::Resume => {
            let (mut db, _config) = open_database(&data_dir, config_path)?;
            resume::run(&mut out, &mut db)?;
        }
        Commands::Status => {
            let (db, config) = open_database(&data_dir, config_path)?;
            status::run(&mut out, &db, &config)?;
        }
        Commands::Log(args) => {
            let (db, config) = open_database(&data_dir, config_path)?;
            log::run(&mut out, &db, detect_workspace()?.name(), args, &config)?;
        }
        Commands::Stats(args) => {
            let (db, config) = open_database(&data_dir, config_path)?;
            stats::run(&mut out, &db, args.period(), &config)?;
        }
        Commands::Manual(args) => {
            let (mut db, config) = open_database(&data_dir, config_path)?;
            manual::run(&mut out, &mut db, &detect_workspace()?, args, &config)?;
        }
        Commands::Edit(args) => {
            let (mut db, config) = open_database(&data_dir, config_path)?;
            edit::run(&mut out, &mut db, args, &config)?;
        }
        Commands::Delete { id } => {
            let (mut db, config) = open_database(&data_dir, config_path)?;
            delete::run(&mut out, &mut db, *id, &config)?;
        }
        Commands::Export(args) => {
            let (db, config) = open_database(&data_dir, config_path)?;
            export::run(&mut out, &db, &detect_workspace()?, args, &config)?;
        }
        Commands::Milestone(action) => {
            let (mut db, config) = open_database(&data_dir, config_path)?;
            milestone::run(&mut out, &mut db, &detect_workspace()?, action, &config)?;
        }
        Commands::Init(args) => {
            // No database needed
            let cwd = current_dir()?;
            init::run(&mut out, &cwd, &default_project_name(&cwd), args)?;
        }
        Commands::Config(args) => config::run(&mut out, &data_dir, args)?,
    }

    Ok(())
}
