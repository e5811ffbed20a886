//! Project name detection.

use std::fmt;
use std::path::Path;

/// Where a project name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSource {
    /// A `.tmporc` file in the current directory or one of its parents.
    Config,
    /// The top-level directory of the enclosing git repository.
    Git,
    /// The current working directory.
    Directory,
}

impl fmt::Display for ProjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => ".tmporc",
            Self::Git => "git repository",
            Self::Directory => "directory name",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
    pub name: String,
    pub source: ProjectSource,
}

/// A `.tmporc` discovered while walking up from the working directory.
#[derive(Debug, Clone, Copy)]
pub struct ConfigHint<'a> {
    /// Directory containing the file.
    pub dir: &'a Path,
    /// `project_name` from the file, possibly blank.
    pub project_name: Option<&'a str>,
}

/// Picks the project name: configured name, then the `.tmporc` directory,
/// then the git top-level directory, then the working directory.
pub fn resolve_project(
    config: Option<ConfigHint<'_>>,
    git_root: Option<&Path>,
    cwd: &Path,
) -> ResolvedProject {
    if let Some(hint) = config {
        let configured = hint
            .project_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from);
        if let Some(name) = configured.or_else(|| dir_name(hint.dir)) {
            return ResolvedProject {
                name,
                source: ProjectSource::Config,
            };
        }
    }

    if let Some(name) = git_root.and_then(dir_name) {
        return ResolvedProject {
            name,
            source: ProjectSource::Git,
        };
    }

    ResolvedProject {
        name: dir_name(cwd).unwrap_or_else(|| cwd.display().to_string()),
        source: ProjectSource::Directory,
    }
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(String::from)
}
