//! PID file reading and liveness probing.
//!
//! Probing is inherently racy: the recorded process may exit between the
//! read and the liveness check. Callers treat the answer as a snapshot.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use pfserver_config::RuntimePaths;

use super::error::LifecycleError;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Contents of the PID file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PidRecord {
    /// A PID that can be safely signalled.
    Pid(u32),
    /// Anything else: garbage, zero, or a value outside `pid_t`.
    Unparsable,
}

impl PidRecord {
    fn parse(content: &str) -> Self {
        match content.trim().parse::<u32>() {
            Ok(pid) if pid != 0 && i32::try_from(pid).is_ok() => Self::Pid(pid),
            _ => Self::Unparsable,
        }
    }
}

/// Reads the PID file, returning `None` when it does not exist.
pub(crate) fn read_pid(path: &Path) -> Result<Option<PidRecord>, LifecycleError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(PidRecord::parse(&content))),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LifecycleError::ReadPid {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Deletes the PID file; a file that is already gone is not an error.
pub(crate) fn remove_pid_file(path: &Path) -> Result<(), LifecycleError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LifecycleError::RemovePid {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Checks `pid` with signal 0. A process owned by another user (`EPERM`)
/// counts as alive.
#[cfg(unix)]
pub(crate) fn process_is_alive(pid: u32) -> bool {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: signal 0 performs only the existence and permission checks.
    let result = unsafe { libc::kill(raw, 0) };
    result == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub(crate) fn process_is_alive(_pid: u32) -> bool {
    false
}

/// Reports whether a live server is recorded, deleting stale records.
pub(crate) fn server_status(paths: &RuntimePaths) -> Result<bool, LifecycleError> {
    match read_pid(paths.pid_path())? {
        None => Ok(false),
        Some(PidRecord::Pid(pid)) if process_is_alive(pid) => Ok(true),
        Some(_) => {
            remove_pid_file(paths.pid_path())?;
            Ok(false)
        }
    }
}

/// Waits for a freshly detached server to record itself.
///
/// Returns `true` once the PID file names a live process, or `false` when
/// `timeout` passes first. Unlike [`server_status`] this never deletes the
/// record: a half-started daemon may still be about to replace it.
pub(crate) fn wait_for_ready(paths: &RuntimePaths, timeout: Duration) -> Result<bool, LifecycleError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(PidRecord::Pid(pid)) = read_pid(paths.pid_path())?
            && process_is_alive(pid)
        {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
