//! High-level orchestration for the start/stop/status commands.

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use pfserver_config::{RuntimePaths, ServerConfig};
use pfserverd::{LaunchMode, RunOutcome, Server};

use super::error::LifecycleError;
use super::monitoring::{server_status, wait_for_ready};
use super::shutdown::{StopOutcome, StopPolicy, stop_server};
use super::types::{LifecycleCommand, LifecycleOutput};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Production lifecycle controller.
#[derive(Debug)]
pub struct SystemLifecycle {
    policy: StopPolicy,
    mode: LaunchMode,
}

impl Default for SystemLifecycle {
    fn default() -> Self {
        Self {
            policy: StopPolicy::default(),
            mode: LaunchMode::detect(),
        }
    }
}

impl SystemLifecycle {
    #[cfg(test)]
    pub(crate) fn with_policy(policy: StopPolicy, mode: LaunchMode) -> Self {
        Self { policy, mode }
    }

    pub fn handle<W: Write, E: Write>(
        &mut self,
        command: LifecycleCommand,
        config: &ServerConfig,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        match command {
            LifecycleCommand::Start => self.start(config, output),
            LifecycleCommand::Stop => self.stop(config, output),
            LifecycleCommand::Status => self.status(config, output),
        }
    }

    /// Binds the listener and hands the process over to the server.
    ///
    /// In background mode [`Server::run`] returns in two processes. The
    /// launcher waits for the daemon's PID record before it reports the
    /// outcome; the daemon only returns here after it has shut down.
    fn start<W: Write, E: Write>(
        &mut self,
        config: &ServerConfig,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        let paths = RuntimePaths::from_config(config);
        if server_status(&paths)? {
            output.stdout_line(format_args!("Server is already running."))?;
            return Ok(ExitCode::SUCCESS);
        }
        let server = Server::bind(config.clone())?;
        output.stdout_line(format_args!(
            "Starting server on http://localhost:{}.",
            config.port
        ))?;
        match server.run(self.mode)? {
            RunOutcome::Detached => {
                let ready = wait_for_ready(&paths, STARTUP_TIMEOUT)?;
                write_start_report(output, config.port, &paths, ready)
            }
            RunOutcome::Stopped => Ok(ExitCode::SUCCESS),
        }
    }

    fn stop<W: Write, E: Write>(
        &mut self,
        config: &ServerConfig,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        let paths = RuntimePaths::from_config(config);
        let outcome = stop_server(&paths, &self.policy)?;
        write_stop_outcome(output, outcome)?;
        Ok(if outcome.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn status<W: Write, E: Write>(
        &mut self,
        config: &ServerConfig,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        let paths = RuntimePaths::from_config(config);
        if server_status(&paths)? {
            output.stdout_line(format_args!(
                "Server is running on http://localhost:{}/",
                config.port
            ))?;
        } else {
            output.stdout_line(format_args!("Server is not running."))?;
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn write_start_report<W: Write, E: Write>(
    output: &mut LifecycleOutput<W, E>,
    port: u16,
    paths: &RuntimePaths,
    ready: bool,
) -> Result<ExitCode, LifecycleError> {
    if !ready {
        output.stderr_line(format_args!(
            "Failed to start server. Check logs for details."
        ))?;
        return Ok(ExitCode::FAILURE);
    }
    output.stdout_line(format_args!(
        "Server is running. Access it at http://localhost:{port}/"
    ))?;
    output.stdout_line(format_args!(
        "Server logs are available in {}",
        paths.log_path().display()
    ))?;
    Ok(ExitCode::SUCCESS)
}

fn write_stop_outcome<W: Write, E: Write>(
    output: &mut LifecycleOutput<W, E>,
    outcome: StopOutcome,
) -> Result<(), LifecycleError> {
    match outcome {
        StopOutcome::NotRunning => output.stdout_line(format_args!("Server is not running.")),
        StopOutcome::Stopped => output.stdout_line(format_args!("Server has been stopped.")),
        StopOutcome::Forced => {
            output.stdout_line(format_args!(
                "Server shutdown timed out. Forcing termination..."
            ))?;
            output.stdout_line(format_args!("Server has been stopped."))
        }
        StopOutcome::ProcessGone => {
            output.stdout_line(format_args!("Server process no longer exists."))
        }
        StopOutcome::PermissionDenied => output.stderr_line(format_args!(
            "Permission denied while trying to terminate server process."
        )),
    }
}
