//! CLI argument definitions for `pfserver`.

use std::path::PathBuf;

use clap::Parser;
use pfserver_config::{CONFIG_PATH_ENV_VAR, default_config_path};

use crate::lifecycle::LifecycleCommand;

/// Command-line interface for the `pfserver` file server.
#[derive(Parser, Debug)]
#[command(name = "pfserver", version, about = "Serve a directory over HTTP")]
pub(crate) struct Cli {
    /// Starts the server in the background.
    #[arg(short = 'u', long = "up")]
    pub(crate) up: bool,
    /// Stops the running server.
    #[arg(short = 'd', long = "down")]
    pub(crate) down: bool,
    /// Reports whether the server is running.
    #[arg(short = 's', long = "status")]
    pub(crate) status: bool,
    /// Path to the JSON configuration file.
    #[arg(
        long = "config-path",
        value_name = "PATH",
        env = CONFIG_PATH_ENV_VAR,
        default_value_os_t = default_config_path()
    )]
    pub(crate) config_path: PathBuf,
}

impl Cli {
    /// The requested lifecycle command; `--up` wins over `--down`, which wins
    /// over `--status`.
    pub(crate) fn command(&self) -> Option<LifecycleCommand> {
        if self.up {
            Some(LifecycleCommand::Start)
        } else if self.down {
            Some(LifecycleCommand::Stop)
        } else if self.status {
            Some(LifecycleCommand::Status)
        } else {
            None
        }
    }
}
