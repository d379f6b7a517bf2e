//! `shelf.toml` configuration.
//!
//! Resolution order, later wins: built-in defaults, the config file, the
//! `SHELF_SOURCE` environment variable, then whatever the CLI passes.

use crate::view::{DEFAULT_ARCHIVE_URL, DEFAULT_PLACEHOLDER, ViewOptions};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "shelf.toml";
pub const ENV_SOURCE: &str = "SHELF_SOURCE";
pub const DEFAULT_SOURCE: &str = "library.csv";
pub const DEFAULT_FILTER_FIELDS: [&str; 3] = ["category", "type", "author"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShelfConfig {
    /// Catalog location: a path or an `http(s)` URL.
    pub source: String,
    /// Fields offered as checkbox facets, in display order.
    pub filter_fields: Vec<String>,
    /// Card image used when a record has no thumbnail.
    pub placeholder: String,
    /// Archive lookup template with an `{id}` slot.
    pub archive_url: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            filter_fields: DEFAULT_FILTER_FIELDS.iter().map(|s| s.to_string()).collect(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
        }
    }
}

impl ShelfConfig {
    /// Load configuration for a run started in `cwd`.
    ///
    /// An explicit path must exist. Without one, `shelf.toml` in `cwd` is used
    /// when present and defaults otherwise. The environment override is
    /// applied last.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config.with_source_override(std::env::var(ENV_SOURCE).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("reading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Replace `source` when `value` is set and non-empty.
    pub fn with_source_override(mut self, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            debug!("source overridden to {value}");
            self.source = value;
        }
        self
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions::from(self)
    }
}
