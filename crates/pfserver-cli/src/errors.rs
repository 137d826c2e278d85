//! Error types for the CLI runtime.

use pfserver_config::ConfigError;
use thiserror::Error;

use crate::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("Specify -u to start or -d to stop the server.")]
    MissingAction,
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[from] ConfigError),
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),
}
