//! Per-project `.tmporc` files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const PROJECT_CONFIG_FILE: &str = ".tmporc";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project_name: String,
    /// `0` (or absent) disables billing.
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides the global export directory for this project.
    #[serde(default)]
    pub export_path: Option<String>,
}

impl ProjectConfig {
    /// The configured rate, if billing is enabled.
    pub fn rate(&self) -> Option<f64> {
        self.hourly_rate.filter(|rate| *rate > 0.0)
    }

    pub fn export_path(&self) -> Option<&str> {
        self.export_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    /// Renders the commented file written by `tmpo init`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# tmpo project configuration\n");
        out.push_str("# This file configures time tracking settings for this project\n\n");
        out.push_str("# Project name (used to identify time entries)\n");
        let _ = writeln!(out, "project_name: {}\n", yaml_string(&self.project_name));
        out.push_str("# [OPTIONAL] Hourly rate for billing calculations (set to 0 to disable)\n");
        let _ = writeln!(out, "hourly_rate: {:.2}\n", self.hourly_rate.unwrap_or(0.0));
        out.push_str("# [OPTIONAL] Description for this project\n");
        let _ = writeln!(
            out,
            "description: {}\n",
            yaml_string(self.description.as_deref().unwrap_or(""))
        );
        out.push_str(
            "# [OPTIONAL] Default export path for this project (overrides global export path)\n",
        );
        let _ = writeln!(
            out,
            "export_path: {}",
            yaml_string(self.export_path.as_deref().unwrap_or(""))
        );
        out
    }
}

/// Quotes a value as a YAML double-quoted scalar.
fn yaml_string(value: &str) -> String {
    // JSON strings are valid YAML double-quoted scalars.
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Searches `start` and its ancestors for a `.tmporc`.
pub fn find(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

pub fn load(path: &Path) -> Result<ProjectConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Finds and loads the nearest `.tmporc`, returning it with its path.
pub fn find_and_load(start: &Path) -> Result<Option<(ProjectConfig, PathBuf)>> {
    find(start)
        .map(|path| load(&path).map(|config| (config, path)))
        .transpose()
}

/// Writes `config` to `dir/.tmporc`, refusing to overwrite an existing file.
pub fn create(dir: &Path, config: &ProjectConfig) -> Result<PathBuf> {
    let path = dir.join(PROJECT_CONFIG_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::write(&path, config.render())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
