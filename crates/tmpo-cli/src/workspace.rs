//! The project the current directory belongs to.

use std::path::{Path, PathBuf};
use std::process::Command;

use tmpo_core::{ConfigHint, ResolvedProject, resolve_project};
use tracing::{debug, warn};

use crate::project_config::{self, ProjectConfig};

/// Detected project plus its `.tmporc`, if there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub project: ResolvedProject,
    pub config: Option<ProjectConfig>,
    pub config_path: Option<PathBuf>,
}

impl Workspace {
    /// Detects the project for `cwd`. An unreadable `.tmporc` is skipped and
    /// detection falls back to git or the directory name.
    pub fn detect(cwd: &Path) -> Self {
        let found = project_config::find_and_load(cwd).unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring project config");
            None
        });
        let git_root = git_toplevel(cwd);
        Self::resolve(found, git_root.as_deref(), cwd)
    }

    /// Builds a workspace from already-discovered inputs.
    pub fn resolve(
        found: Option<(ProjectConfig, PathBuf)>,
        git_root: Option<&Path>,
        cwd: &Path,
    ) -> Self {
        let (config, config_path) = found.map_or((None, None), |(c, p)| (Some(c), Some(p)));
        let hint = config_path.as_deref().and_then(Path::parent).map(|dir| ConfigHint {
            dir,
            project_name: config.as_ref().map(|c| c.project_name.as_str()),
        });
        let project = resolve_project(hint, git_root, cwd);
        debug!(project = %project.name, source = %project.source, "detected project");
        Self {
            project,
            config,
            config_path,
        }
    }

    pub fn name(&self) -> &str {
        &self.project.name
    }

    /// Hourly rate from the project's `.tmporc`.
    pub fn hourly_rate(&self) -> Option<f64> {
        self.config.as_ref().and_then(ProjectConfig::rate)
    }

    pub fn export_path(&self) -> Option<&str> {
        self.config.as_ref().and_then(ProjectConfig::export_path)
    }
}

/// Project name for a new `.tmporc` in `cwd`: the git root name, else the directory name.
pub fn default_project_name(cwd: &Path) -> String {
    resolve_project(None, git_toplevel(cwd).as_deref(), cwd).name
}

/// `git rev-parse --show-toplevel`, or `None` outside a repository.
fn git_toplevel(cwd: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(cwd)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let root = String::from_utf8(output.stdout).ok()?;
    let root = root.trim();
    (!root.is_empty()).then(|| PathBuf::from(root))
}
