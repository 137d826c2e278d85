//! Command-line runtime for the `pfserver` file server.
//!
//! The runtime parses flags, loads the JSON configuration, and dispatches to
//! the lifecycle controller. Output streams are injected so tests can capture
//! what an operator would see.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use pfserver_config::ServerConfig;

mod cli;
mod errors;
mod lifecycle;

use cli::Cli;
use errors::AppError;
pub use lifecycle::{
    LifecycleCommand, LifecycleError, LifecycleOutput, StopOutcome, StopPolicy, SystemLifecycle,
};

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut lifecycle = SystemLifecycle::default();
    match execute(args, &mut lifecycle, stdout, stderr) {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<I, W, E>(
    args: I,
    lifecycle: &mut SystemLifecycle,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<ExitCode, AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = Cli::try_parse_from(args).map_err(AppError::CliUsage)?;
    let command = cli.command().ok_or(AppError::MissingAction)?;
    let config = ServerConfig::load_from_path(&cli.config_path)?;
    let mut output = LifecycleOutput::new(&mut *stdout, &mut *stderr);
    Ok(lifecycle.handle(command, &config, &mut output)?)
}
