//! Persistent CLI configuration
//!
//! Stores default output format, log filter and summary preference in a JSON
//! file. Command line flags override whatever the file says.

use serde::{Deserialize, Serialize};
use spinbit_core::records::writer::OutputFormat;
use std::path::Path;
use thiserror::Error;

/// Default tracing filter directive
pub const DEFAULT_LOG_FILTER: &str = "spinbit=info";

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Errors reading a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output row format
    #[serde(default)]
    pub format: OutputFormat,
    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Print per-flow statistics after processing
    #[serde(default)]
    pub summary: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            log_filter: default_log_filter(),
            summary: false,
        }
    }
}

impl AppConfig {
    /// Read and parse a config file
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load config from disk, falling back to defaults on any error
    ///
    /// The error is handed back next to the defaults so the caller can report
    /// it once logging is initialised.
    pub fn load(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::read(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Save config to disk, creating parent directories if needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Config saved to disk");
        Ok(())
    }
}
