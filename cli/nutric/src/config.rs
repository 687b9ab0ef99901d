use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "nutric.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings read from `nutric.toml`. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Config {
    /// JSON or NDJSON file of child records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<PathBuf>,

    /// JSON or NDJSON file of units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schools: Option<PathBuf>,

    #[serde(default)]
    pub output: OutputFormat,

    /// Reject heights the linear model cannot score instead of reporting inf/NaN.
    #[serde(default)]
    pub checked: bool,

    /// Recompute stored statuses after loading.
    #[serde(default)]
    pub reclassify: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("'{}' already exists", .0.display())]
    AlreadyExists(PathBuf),
}

impl Config {
    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // Relative data paths are taken from the config file's directory.
        Ok(cfg.relative_to(path.parent().unwrap_or_else(|| Path::new(""))))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Writes a starter config; refuses to overwrite unless `force`.
    pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let cfg = Config {
            records: Some(PathBuf::from("records.ndjson")),
            schools: Some(PathBuf::from("schools.json")),
            ..Config::default()
        };
        let text = cfg.to_toml()?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let fix = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.records = self.records.map(fix);
        self.schools = self.schools.map(fix);
        self
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}
