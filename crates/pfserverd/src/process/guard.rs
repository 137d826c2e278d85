use std::fs;
use std::io;
use std::path::Path;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::{info, warn};

use pfserver_config::RuntimePaths;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::files::atomic_write;

/// Owns the PID record for the lifetime of the running server.
///
/// Dropping the guard removes the PID file, but only while it still records
/// this process: a `stop` invocation may already have deleted it.
#[derive(Debug)]
pub(crate) struct ProcessGuard {
    paths: RuntimePaths,
    pid: Option<u32>,
}

impl ProcessGuard {
    pub(crate) fn acquire(paths: RuntimePaths) -> Result<Self, LaunchError> {
        handle_existing_pid(&paths)?;
        Ok(Self { paths, pid: None })
    }

    pub(crate) fn write_pid(&mut self, pid: u32) -> Result<(), LaunchError> {
        let path = self.paths.pid_path();
        atomic_write(path, format!("{pid}\n").as_bytes()).map_err(|source| {
            LaunchError::PidWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.pid = Some(pid);
        info!(
            target: PROCESS_TARGET,
            pid,
            file = %path.display(),
            "pid file written"
        );
        Ok(())
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        let Some(pid) = self.pid else {
            return;
        };
        if read_pid(self.paths.pid_path()) != Some(pid) {
            return;
        }
        match fs::remove_file(self.paths.pid_path()) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => {
                warn!(
                    target: PROCESS_TARGET,
                    file = %self.paths.pid_path().display(),
                    error = %error,
                    "failed to remove pid file"
                );
            }
            _ => {}
        }
    }
}

fn handle_existing_pid(paths: &RuntimePaths) -> Result<(), LaunchError> {
    if !paths.pid_path().exists() {
        return Ok(());
    }
    if let Some(pid) = read_pid(paths.pid_path())
        && pid != 0
    {
        match check_process(pid) {
            Ok(true) => {
                info!(
                    target: PROCESS_TARGET,
                    pid,
                    "refusing to start: existing server alive"
                );
                return Err(LaunchError::AlreadyRunning { pid });
            }
            Ok(false) => {}
            Err(error) => return Err(error),
        }
    }
    warn!(
        target: PROCESS_TARGET,
        file = %paths.pid_path().display(),
        "existing server not detected; removing stale pid file"
    );
    remove_file(paths.pid_path())
}

fn read_pid(path: &Path) -> Option<u32> {
    let content = fs::read_to_string(path).ok()?;
    content.trim().parse::<u32>().ok()
}

fn remove_file(path: &Path) -> Result<(), LaunchError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LaunchError::Cleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn check_process(pid: u32) -> Result<bool, LaunchError> {
    let Ok(raw) = i32::try_from(pid) else {
        return Ok(false);
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => Ok(true),
        Err(Errno::EPERM) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(LaunchError::CheckProcess { pid, source: errno }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfserver_config::ServerConfig;
    use std::process::Command;
    use tempfile::TempDir;

    fn temp_paths() -> (TempDir, RuntimePaths) {
        let dir = TempDir::new().expect("temp dir");
        let paths = RuntimePaths::from_config(&ServerConfig::new(dir.path(), 8000));
        (dir, paths)
    }

    fn reaped_pid() -> u32 {
        let mut child = Command::new("true").spawn().expect("spawn true");
        let pid = child.id();
        child.wait().expect("reap child");
        pid
    }

    #[test]
    fn refuses_when_recorded_process_is_alive() {
        let (_dir, paths) = temp_paths();
        let own = std::process::id();
        fs::write(paths.pid_path(), format!("{own}\n")).expect("seed pid");

        let error = ProcessGuard::acquire(paths.clone()).expect_err("should refuse");
        assert!(matches!(error, LaunchError::AlreadyRunning { pid } if pid == own));
        assert_eq!(read_pid(paths.pid_path()), Some(own), "pid file untouched");
    }

    #[test]
    fn clears_stale_pid_file() {
        let (_dir, paths) = temp_paths();
        fs::write(paths.pid_path(), format!("{}\n", reaped_pid())).expect("seed pid");

        let _guard = ProcessGuard::acquire(paths.clone()).expect("stale pid is cleared");
        assert!(!paths.pid_path().exists());
    }

    #[test]
    fn clears_unparsable_pid_file() {
        let (_dir, paths) = temp_paths();
        fs::write(paths.pid_path(), "not-a-pid").expect("seed pid");

        let _guard = ProcessGuard::acquire(paths.clone()).expect("garbage is cleared");
        assert!(!paths.pid_path().exists());
    }

    #[test]
    fn drop_removes_own_pid_file() {
        let (_dir, paths) = temp_paths();
        let mut guard = ProcessGuard::acquire(paths.clone()).expect("acquire");
        guard.write_pid(4242).expect("write pid");
        assert_eq!(read_pid(paths.pid_path()), Some(4242));

        drop(guard);
        assert!(!paths.pid_path().exists());
    }

    #[test]
    fn drop_leaves_foreign_pid_file() {
        let (_dir, paths) = temp_paths();
        let mut guard = ProcessGuard::acquire(paths.clone()).expect("acquire");
        guard.write_pid(4242).expect("write pid");
        fs::write(paths.pid_path(), "31337\n").expect("replace pid");

        drop(guard);
        assert_eq!(read_pid(paths.pid_path()), Some(31337));
    }
}
