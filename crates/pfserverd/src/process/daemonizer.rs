//! Implements the daemonisation backend for the `pfserver` process.

use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use daemonize_me::Daemon;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, fork};
use thiserror::Error;

use pfserver_config::RuntimePaths;

/// The side of the detach a caller finds itself on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {
    /// The launching process. The daemon carries on in another process.
    Launcher,
    /// The detached daemon.
    Daemon,
}

/// Abstraction over daemonisation strategies.
pub trait Daemonizer: Send + Sync {
    /// Detaches into the background, redirecting standard output and standard
    /// error to the log file. Returns in both the launcher and the daemon.
    fn daemonize(&self, paths: &RuntimePaths) -> Result<Detached, DaemonizeError>;
}

/// Errors surfaced by the daemonisation backend.
#[derive(Debug, Error)]
pub enum DaemonizeError {
    /// The log file could not be opened for the redirected streams.
    #[error("failed to open log file '{path}': {source}")]
    OpenLog {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Forking failed.
    #[error("failed to fork: {source}")]
    Fork {
        /// Underlying OS error.
        #[source]
        source: nix::errno::Errno,
    },
    /// The first child exited unsuccessfully before handing over.
    #[error("detaching process exited with {status:?}")]
    Intermediate {
        /// How the first child ended.
        status: WaitStatus,
    },
    /// System-level daemonisation failed.
    #[error("{0}")]
    System(#[from] daemonize_me::DaemonError),
}

/// Daemoniser built on `daemonize-me`.
///
/// The launcher forks a first child and waits for it, so it can go on to
/// report whether the daemon came up. The first child runs `daemonize-me`,
/// which forks again and starts a new session with the log file as stdout and
/// stderr. The session leader then forks once more and exits, leaving a
/// daemon that can never reacquire a controlling terminal.
#[derive(Debug, Default)]
pub struct SystemDaemonizer;

impl SystemDaemonizer {
    /// Builds a new system daemoniser.
    pub fn new() -> Self {
        Self
    }
}

impl Daemonizer for SystemDaemonizer {
    fn daemonize(&self, paths: &RuntimePaths) -> Result<Detached, DaemonizeError> {
        let stdout = open_log(paths.log_path())?;
        let stderr = stdout
            .try_clone()
            .map_err(|source| DaemonizeError::OpenLog {
                path: paths.log_path().to_path_buf(),
                source,
            })?;
        if let ForkResult::Parent { child } = fork_process()? {
            return match waitpid(child, None) {
                Ok(WaitStatus::Exited(_, 0)) => Ok(Detached::Launcher),
                Ok(status) => Err(DaemonizeError::Intermediate { status }),
                Err(source) => Err(DaemonizeError::Fork { source }),
            };
        }
        let mut daemon = Daemon::new();
        daemon = daemon.work_dir(paths.doc_root());
        daemon = daemon.name(OsStr::new(env!("CARGO_PKG_NAME")));
        daemon = daemon.stdout(stdout);
        daemon = daemon.stderr(stderr);
        daemon.start()?;
        match fork_process()? {
            ForkResult::Parent { .. } => process::exit(0),
            ForkResult::Child => Ok(Detached::Daemon),
        }
    }
}

fn fork_process() -> Result<ForkResult, DaemonizeError> {
    // SAFETY: the server forks before it spawns any threads of its own; the
    // child only runs daemonisation and then the server itself.
    unsafe { fork() }.map_err(|source| DaemonizeError::Fork { source })
}

/// Opens the log file for appending, creating it when absent.
pub(crate) fn open_log(path: &Path) -> Result<File, DaemonizeError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| DaemonizeError::OpenLog {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfserver_config::ServerConfig;
    use std::fs;
    use std::io::Write;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn open_log_appends_to_existing_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("server.log");
        fs::write(&path, "first\n").expect("seed log");

        let mut file = open_log(&path).expect("open log");
        file.write_all(b"second\n").expect("append");

        assert_eq!(fs::read_to_string(&path).expect("read log"), "first\nsecond\n");
    }

    #[test]
    fn unopenable_log_fails_before_forking() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ServerConfig::new(dir.path(), 8000);
        let paths = RuntimePaths::from_config(&config);
        fs::create_dir(paths.log_path()).expect("occupy log path with a directory");

        let error = SystemDaemonizer::new()
            .daemonize(&paths)
            .expect_err("a directory cannot be a log file");
        assert!(matches!(error, DaemonizeError::OpenLog { .. }));
    }

    #[test]
    fn daemon_is_not_a_session_leader() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ServerConfig::new(dir.path(), 8000);
        let paths = RuntimePaths::from_config(&config);
        let report = dir.path().join("session.txt");
        let launcher = std::process::id();

        match SystemDaemonizer::new().daemonize(&paths) {
            Ok(Detached::Daemon) => {
                let pid = nix::unistd::getpid();
                let sid = nix::unistd::getsid(None).map_or(-1, nix::unistd::Pid::as_raw);
                let _ = fs::write(&report, format!("{} {sid}\n", pid.as_raw()));
                // SAFETY: leaves the forked copy of the test harness at once.
                unsafe { nix::libc::_exit(0) }
            }
            Ok(Detached::Launcher) => {}
            Err(_) if std::process::id() != launcher => {
                // SAFETY: a forked copy must never resume the test harness.
                unsafe { nix::libc::_exit(1) }
            }
            Err(error) => panic!("daemonise failed: {error}"),
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        let content = loop {
            if let Ok(content) = fs::read_to_string(&report)
                && content.ends_with('\n')
            {
                break content;
            }
            assert!(Instant::now() < deadline, "daemon never reported");
            thread::sleep(Duration::from_millis(25));
        };
        let (pid, sid) = content.trim().split_once(' ').expect("pid and sid");
        assert_ne!(pid, sid, "daemon must not lead its session");
        assert_ne!(pid, launcher.to_string());
    }
}
