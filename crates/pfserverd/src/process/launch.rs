//! Supervises daemon launch sequencing and runtime orchestration.

use std::env;
use std::fs;
use std::sync::Arc;

use tracing::info;

use pfserver_config::{RuntimePaths, ServerConfig};

use crate::http::{self, Site};
use crate::router::Router;
use crate::telemetry;
use crate::transport::SocketListener;

use super::daemonizer::{Daemonizer, Detached, SystemDaemonizer};
use super::errors::LaunchError;
use super::guard::ProcessGuard;
use super::shutdown::{ShutdownSignal, ShutdownWatch, SystemShutdownSignal};
use super::{BIND_HOST, FOREGROUND_ENV_VAR, PROCESS_TARGET};

/// Launch mode for the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Fork into the background and detach from the controlling terminal.
    Background,
    /// Remain attached to the terminal; primarily used for debugging and tests.
    Foreground,
}

impl LaunchMode {
    /// Selects [`LaunchMode::Foreground`] when `PFSERVER_FOREGROUND` is set.
    #[must_use]
    pub fn detect() -> Self {
        if env::var_os(FOREGROUND_ENV_VAR).is_some() {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// How [`Server::run`] ended in the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The caller is the launcher; the server carries on in the background.
    Detached,
    /// The server ran in this process and has shut down.
    Stopped,
}

/// Process-level collaborators needed to control daemon lifecycle.
pub(crate) struct ProcessControl<D, S> {
    pub(crate) mode: LaunchMode,
    pub(crate) daemonizer: D,
    pub(crate) shutdown: S,
}

/// A server whose document root exists and whose listener is bound, but which
/// has not yet detached or written its PID file.
///
/// Splitting binding from running lets the launcher report bind failures on
/// the terminal and guarantees no PID file ever names a server that could not
/// listen.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    paths: RuntimePaths,
    listener: SocketListener,
}

impl Server {
    /// Creates the document root and binds `0.0.0.0:port`.
    pub fn bind(config: ServerConfig) -> Result<Self, LaunchError> {
        Self::bind_to(config, BIND_HOST)
    }

    pub(crate) fn bind_to(config: ServerConfig, host: &str) -> Result<Self, LaunchError> {
        let paths = RuntimePaths::from_config(&config);
        paths.prepare()?;
        let listener = SocketListener::bind(host, config.port)?;
        Ok(Self {
            config,
            paths,
            listener,
        })
    }

    /// Runtime artefact locations for this server.
    #[must_use]
    pub fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    #[cfg(test)]
    pub(crate) fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Detaches (unless `mode` is foreground) and serves until a termination
    /// signal arrives.
    ///
    /// In background mode this returns twice: [`RunOutcome::Detached`] in the
    /// launching process, and [`RunOutcome::Stopped`] in the daemon once it
    /// has shut down.
    pub fn run(self, mode: LaunchMode) -> Result<RunOutcome, LaunchError> {
        self.run_with(ProcessControl {
            mode,
            daemonizer: SystemDaemonizer::new(),
            shutdown: SystemShutdownSignal::new(),
        })
    }

    /// Runs the server with injected collaborators.
    pub(crate) fn run_with<D, S>(
        self,
        process: ProcessControl<D, S>,
    ) -> Result<RunOutcome, LaunchError>
    where
        D: Daemonizer,
        S: ShutdownSignal + 'static,
    {
        let ProcessControl {
            mode,
            daemonizer,
            shutdown,
        } = process;
        let Self {
            config,
            paths,
            listener,
        } = self;

        if matches!(mode, LaunchMode::Background)
            && daemonizer.daemonize(&paths)? == Detached::Launcher
        {
            return Ok(RunOutcome::Detached);
        }
        telemetry::initialise(&config)?;
        info!(
            target: PROCESS_TARGET,
            ?mode,
            "starting server runtime"
        );

        let mut guard = ProcessGuard::acquire(paths.clone())?;
        guard.write_pid(std::process::id())?;

        let root = fs::canonicalize(paths.doc_root()).map_err(|source| LaunchError::DocRoot {
            path: paths.doc_root().to_path_buf(),
            source,
        })?;
        let port = config.port;
        let app = http::app(Site::new(Router::new(root), Arc::new(config)));
        let (watch, released) = ShutdownWatch::spawn(shutdown)?;
        info!(target: PROCESS_TARGET, "Server started on port {port}");

        listener.serve(app, released)?;
        watch.join()?;
        info!(
            target: PROCESS_TARGET,
            "shutdown sequence completed"
        );
        Ok(RunOutcome::Stopped)
    }
}
