//! Global settings loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use tmpo_core::{DEFAULT_CURRENCY, DateFormat, TimeFormat};

/// File name of the global settings inside the data directory.
pub const SETTINGS_FILE: &str = "config.yaml";

/// User-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Currency code used when displaying earnings.
    pub currency: String,
    pub date_format: DateFormat,
    pub time_format: TimeFormat,
    /// Directory exports are written to unless a project overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<String>,
    /// IANA zone name or abbreviation. Stored and shown only; times are
    /// always rendered in the system zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            date_format: DateFormat::default(),
            time_format: TimeFormat::default(),
            export_path: None,
            timezone: None,
        }
    }
}

impl Config {
    /// Location of the settings file inside `data_dir`.
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// Loads settings: defaults, then `<data dir>/config.yaml`, then
    /// `config_path`, then `TMPO_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(data_dir: &Path, config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(Self::path_in(data_dir)));

        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }

        figment.merge(Env::prefixed("TMPO_")).extract()
    }

    /// Loads only what is stored in `<data dir>/config.yaml`, over the defaults.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_stored(data_dir: &Path) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(Self::path_in(data_dir)))
            .extract()
    }

    /// Writes the settings to `<data dir>/config.yaml`.
    pub fn save(&self, data_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        let path = Self::path_in(data_dir);
        let yaml = serde_yaml::to_string(self).context("failed to serialize settings")?;
        std::fs::write(&path, yaml)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// The export directory with a leading `~` expanded.
    pub fn export_dir(&self) -> Option<PathBuf> {
        self.export_path.as_deref().and_then(expand_home)
    }
}

/// Expands a leading `~` to the home directory. Blank paths yield `None`.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir()?;
            let rest = rest.trim_start_matches(['/', '\\']);
            Some(if rest.is_empty() {
                home
            } else {
                home.join(rest)
            })
        }
        None => Some(PathBuf::from(path)),
    }
}
