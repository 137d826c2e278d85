//! Error types for daemon lifecycle operations.

use std::io;
use std::path::PathBuf;

use pfserverd::LaunchError;
use thiserror::Error;

/// Errors raised while executing lifecycle commands.
///
/// Stop and status outcomes such as "not running" are values, not errors;
/// only failures the operator must act on end up here.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to read pid file {path:?}: {source}")]
    ReadPid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove pid file {path:?}: {source}")]
    RemovePid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to signal server pid {pid}: {source}")]
    SignalFailed {
        pid: u32,
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("platform does not support server lifecycle signalling")]
    UnsupportedPlatform,
    #[error("failed to write lifecycle output: {0}")]
    Io(#[source] io::Error),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}
