//! Create a `.tmporc` for the current directory.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tmpo_core::types::{parse_hourly_rate, validate_name};

use crate::cli::InitArgs;
use crate::display::info;
use crate::project_config::{self, ProjectConfig};

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn run<W: Write>(writer: &mut W, dir: &Path, default_name: &str, args: &InitArgs) -> Result<()> {
    let config = if args.accept_defaults {
        ProjectConfig {
            project_name: default_name.to_string(),
            ..ProjectConfig::default()
        }
    } else {
        let project_name = match non_blank(args.name.as_deref()) {
            Some(name) => validate_name("project name", &name)?,
            None => default_name.to_string(),
        };
        ProjectConfig {
            project_name,
            hourly_rate: parse_hourly_rate(args.rate.as_deref().unwrap_or_default())?,
            description: non_blank(args.description.as_deref()),
            export_path: non_blank(args.export_path.as_deref()),
        }
    };

    project_config::create(dir, &config)?;

    writeln!(writer, "Created .tmporc for project {}", config.project_name)?;
    if let Some(rate) = config.rate() {
        info(writer, "Hourly Rate", format_args!("{rate:.2}"))?;
    }
    if let Some(description) = &config.description {
        info(writer, "Description", description)?;
    }
    if let Some(path) = config.export_path() {
        info(writer, "Export path", path)?;
    }
    writeln!(writer, "\nYou can edit .tmporc to customize your project settings.")?;
    writeln!(
        writer,
        "Use 'tmpo config' to set global preferences like currency and time formats."
    )?;
    Ok(())
}
