//! Shared configuration for the `pfserver` binary and the `pfserverd` runtime.
//!
//! Configuration is a static JSON record read once at process start. Loading
//! produces an immutable [`ServerConfig`] that every component borrows (or
//! shares through an `Arc`) instead of consulting process-wide globals.
//! [`RuntimePaths`] derives the PID and log file locations from it so the CLI
//! and the daemon agree on the on-disk layout.

mod defaults;
mod runtime;

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    CONFIG_FILE_NAME, CONFIG_PATH_ENV_VAR, DEFAULT_LOG_FILTER, default_config_path,
    default_log_filter_string,
};
pub use runtime::{LOG_FILE_NAME, PID_FILE_NAME, RuntimePaths, RuntimePathsError};

/// How the directory listing renders its page header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "bool", into = "bool")]
pub enum HeaderMode {
    /// Show the configured header image.
    Image,
    /// Show the configured header text as a heading.
    #[default]
    Text,
}

impl From<bool> for HeaderMode {
    fn from(header_image: bool) -> Self {
        if header_image { Self::Image } else { Self::Text }
    }
}

impl From<HeaderMode> for bool {
    fn from(mode: HeaderMode) -> Self {
        matches!(mode, HeaderMode::Image)
    }
}

/// Immutable server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Directory tree exposed over HTTP; also hosts the PID and log files.
    pub doc_root: PathBuf,
    /// TCP port the listener binds on all interfaces.
    pub port: u16,
    /// Entry names hidden from directory listings (exact match).
    pub excluded_files: BTreeSet<String>,
    /// Header rendering mode, stored as the `header_image` flag.
    #[serde(rename = "header_image")]
    pub header_mode: HeaderMode,
    /// Heading text used in [`HeaderMode::Text`].
    pub header_text: String,
    /// Image source used in [`HeaderMode::Image`], relative to the page.
    pub header_image_file: String,
    /// Tracing filter expression for the daemon log.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
}

impl ServerConfig {
    /// Builds a configuration with text headers and no exclusions.
    #[must_use]
    pub fn new(doc_root: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            doc_root: doc_root.into(),
            port,
            excluded_files: BTreeSet::new(),
            header_mode: HeaderMode::Text,
            header_text: String::from("pfserver"),
            header_image_file: String::new(),
            log_filter: default_log_filter_string(),
        }
    }

    /// Reads, parses, and validates the JSON configuration at `path`.
    ///
    /// A relative `doc_root` is resolved against the current directory so the
    /// daemon keeps a usable path after it changes its working directory.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        config.with_absolute_doc_root()
    }

    fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Checks invariants that the JSON schema alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.doc_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingDocRoot);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }
        Ok(())
    }

    fn with_absolute_doc_root(mut self) -> Result<Self, ConfigError> {
        if self.doc_root.is_relative() {
            self.doc_root = std::path::absolute(&self.doc_root).map_err(|source| {
                ConfigError::ResolveDocRoot {
                    path: self.doc_root.clone(),
                    source,
                }
            })?;
        }
        Ok(self)
    }

    /// Returns true when `name` must not appear in listings.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_files.contains(name)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("configuration file not found or unreadable at {path:?}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The file did not hold a valid configuration record.
    #[error("invalid JSON in configuration file {path:?}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// `doc_root` was empty.
    #[error("configuration must name a non-empty doc_root")]
    MissingDocRoot,
    /// `port` was outside 1..=65535.
    #[error("port {port} is outside the range 1-65535")]
    InvalidPort {
        /// Rejected port.
        port: u16,
    },
    /// A relative `doc_root` could not be made absolute.
    #[error("failed to resolve doc_root {path:?}: {source}")]
    ResolveDocRoot {
        /// Configured path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
