//! Derives runtime artefact paths shared by the CLI and daemon.
//!
//! The PID and log files live directly under the document root. Both binaries
//! need to agree on the layout so lifecycle commands can interact with the
//! files written by the running server.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ServerConfig;

/// File name of the PID record under the document root.
pub const PID_FILE_NAME: &str = "server.pid";

/// File name of the append-only log under the document root.
pub const LOG_FILE_NAME: &str = "server.log";

/// Canonical paths for runtime artefacts written by the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    doc_root: PathBuf,
    pid_path: PathBuf,
    log_path: PathBuf,
}

impl RuntimePaths {
    /// Derives runtime paths without touching the filesystem.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let doc_root = config.doc_root.clone();
        Self {
            pid_path: doc_root.join(PID_FILE_NAME),
            log_path: doc_root.join(LOG_FILE_NAME),
            doc_root,
        }
    }

    /// Creates the document root (and any missing parents).
    pub fn prepare(&self) -> Result<(), RuntimePathsError> {
        fs::create_dir_all(&self.doc_root).map_err(|source| RuntimePathsError::DocRoot {
            path: self.doc_root.clone(),
            source,
        })
    }

    /// Directory exposed over HTTP and holding runtime artefacts.
    pub fn doc_root(&self) -> &Path {
        self.doc_root.as_path()
    }

    /// Path to the PID file.
    pub fn pid_path(&self) -> &Path {
        self.pid_path.as_path()
    }

    /// Path to the log file.
    pub fn log_path(&self) -> &Path {
        self.log_path.as_path()
    }
}

/// Errors raised while preparing daemon runtime paths.
#[derive(Debug, Error)]
pub enum RuntimePathsError {
    /// Creating the document root failed.
    #[error("failed to prepare document root '{path}': {source}")]
    DocRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_paths_under_doc_root() {
        let config = ServerConfig::new("/srv/files", 8000);
        let paths = RuntimePaths::from_config(&config);
        assert_eq!(paths.doc_root(), Path::new("/srv/files"));
        assert_eq!(paths.pid_path(), Path::new("/srv/files/server.pid"));
        assert_eq!(paths.log_path(), Path::new("/srv/files/server.log"));
    }

    #[test]
    fn prepare_creates_nested_doc_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("nested").join("public");
        let paths = RuntimePaths::from_config(&ServerConfig::new(&root, 8000));
        paths.prepare().expect("doc root should be created");
        assert!(root.is_dir());
        paths.prepare().expect("existing doc root is accepted");
    }
}
