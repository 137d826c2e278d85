//! Server shutdown: SIGTERM, a bounded wait, then SIGKILL.

use std::io;
use std::thread;
use std::time::Duration;

use pfserver_config::RuntimePaths;

use super::error::LifecycleError;
use super::monitoring::{PidRecord, process_is_alive, read_pid, remove_pid_file};

const DEFAULT_ATTEMPTS: u32 = 5;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// How long to wait for a graceful exit before forcing termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    /// Liveness checks made after SIGTERM.
    pub attempts: u32,
    /// Pause between checks.
    pub interval: Duration,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No PID file was present.
    NotRunning,
    /// The server exited after SIGTERM.
    Stopped,
    /// The server ignored SIGTERM and was killed.
    Forced,
    /// The recorded process had already gone (or the record was unusable).
    ProcessGone,
    /// The recorded process belongs to another user.
    PermissionDenied,
}

impl StopOutcome {
    /// Whether the invocation should exit successfully.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::PermissionDenied)
    }
}

/// Stops the recorded server and removes its PID file.
///
/// The PID file is removed after every outcome, so repeated calls settle on
/// [`StopOutcome::NotRunning`].
pub(crate) fn stop_server(
    paths: &RuntimePaths,
    policy: &StopPolicy,
) -> Result<StopOutcome, LifecycleError> {
    let outcome = match read_pid(paths.pid_path())? {
        None => return Ok(StopOutcome::NotRunning),
        Some(PidRecord::Unparsable) => StopOutcome::ProcessGone,
        Some(PidRecord::Pid(pid)) => terminate(pid, policy)?,
    };
    remove_pid_file(paths.pid_path())?;
    Ok(outcome)
}

#[cfg(unix)]
fn terminate(pid: u32, policy: &StopPolicy) -> Result<StopOutcome, LifecycleError> {
    match signal_daemon(pid, libc::SIGTERM) {
        Ok(()) => {}
        Err(error) => return classify_signal_failure(error),
    }
    for _ in 0..policy.attempts {
        if !process_is_alive(pid) {
            return Ok(StopOutcome::Stopped);
        }
        thread::sleep(policy.interval);
    }
    if !process_is_alive(pid) {
        return Ok(StopOutcome::Stopped);
    }
    match signal_daemon(pid, libc::SIGKILL) {
        Ok(()) => Ok(StopOutcome::Forced),
        Err(error) => match classify_signal_failure(error)? {
            // Exited between the last check and the kill.
            StopOutcome::ProcessGone => Ok(StopOutcome::Stopped),
            other => Ok(other),
        },
    }
}

#[cfg(not(unix))]
fn terminate(_pid: u32, _policy: &StopPolicy) -> Result<StopOutcome, LifecycleError> {
    Err(LifecycleError::UnsupportedPlatform)
}

#[cfg(unix)]
fn classify_signal_failure(error: LifecycleError) -> Result<StopOutcome, LifecycleError> {
    match &error {
        LifecycleError::SignalFailed { source, .. } => match source.raw_os_error() {
            Some(libc::ESRCH) => Ok(StopOutcome::ProcessGone),
            Some(libc::EPERM) => Ok(StopOutcome::PermissionDenied),
            _ => Err(error),
        },
        _ => Err(error),
    }
}

/// Sends `signal` to the server process.
///
/// # Errors
///
/// Returns `SignalFailed` when `kill(2)` fails, for example with `ESRCH`
/// when the process does not exist or `EPERM` when it belongs to another
/// user.
#[cfg(unix)]
pub(crate) fn signal_daemon(pid: u32, signal: libc::c_int) -> Result<(), LifecycleError> {
    let raw = libc::pid_t::try_from(pid).map_err(|_| LifecycleError::SignalFailed {
        pid,
        source: io::Error::from_raw_os_error(libc::ESRCH),
    })?;
    // SAFETY: `kill(2)` is memory-safe even when the PID is invalid; the
    // kernel simply returns an error.
    let result = unsafe { libc::kill(raw, signal) };
    if result == 0 {
        Ok(())
    } else {
        Err(LifecycleError::SignalFailed {
            pid,
            source: io::Error::last_os_error(),
        })
    }
}
