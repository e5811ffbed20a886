//! Write entries to a CSV or JSON file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tmpo_db::Database;
use tracing::debug;

use crate::Config;
use crate::cli::{ExportArgs, ExportFormat};
use crate::commands::filter::EntryFilter;
use crate::config::expand_home;
use crate::export::{output_path, write_csv, write_json};
use crate::workspace::Workspace;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    workspace: &Workspace,
    args: &ExportArgs,
    config: &Config,
) -> Result<()> {
    let filter = EntryFilter::new(args.milestone.as_deref(), &args.period, args.project.as_deref());
    let entries = filter.load(db, workspace.name(), None)?;
    if entries.is_empty() {
        writeln!(writer, "No entries to export.")?;
        return Ok(());
    }

    let export_dir = export_dir(workspace, config)?;
    let path = output_path(
        args.output.as_deref(),
        args.format,
        export_dir.as_deref(),
        Local::now().date_naive(),
    );
    debug!(path = %path.display(), count = entries.len(), "exporting entries");

    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let out = BufWriter::new(file);
    let now = Utc::now();
    match args.format {
        ExportFormat::Csv => write_csv(out, &entries, &Local, now)?,
        ExportFormat::Json => write_json(out, &entries, &Local, now)?,
    }

    writeln!(
        writer,
        "Exported {} entries to {}",
        entries.len(),
        path.display()
    )?;
    Ok(())
}

/// Project export path, then the global one. The directory is created if missing.
fn export_dir(workspace: &Workspace, config: &Config) -> Result<Option<PathBuf>> {
    let dir = workspace
        .export_path()
        .and_then(expand_home)
        .or_else(|| config.export_dir());
    if let Some(dir) = &dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(dir)
}
