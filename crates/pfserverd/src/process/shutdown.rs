//! Termination signals and their hand-off to the HTTP server.

use std::future::Future;
use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The thread waiting for signals could not be started.
    #[error("failed to spawn shutdown signal listener: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The thread waiting for signals panicked.
    #[error("shutdown signal listener panicked")]
    ListenerPanicked,
}

/// Shutdown listener that waits for termination signals.
///
/// SIGKILL cannot be intercepted; a forced stop skips the graceful sequence
/// and leaves PID cleanup to the stopping invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl SystemShutdownSignal {
    /// Builds a signal listener.
    pub fn new() -> Self {
        Self
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(
                target: PROCESS_TARGET,
                signal,
                "shutdown signal received"
            );
        }
        Ok(())
    }
}

/// A blocking [`ShutdownSignal`] running on its own thread.
pub(crate) struct ShutdownWatch {
    waiter: JoinHandle<Result<(), ShutdownError>>,
}

impl ShutdownWatch {
    /// Starts waiting for `signal`.
    ///
    /// The returned future resolves as soon as the wait ends, successfully or
    /// not; [`ShutdownWatch::join`] then reports how it ended.
    pub(crate) fn spawn<S>(
        signal: S,
    ) -> Result<(Self, impl Future<Output = ()> + Send + 'static), ShutdownError>
    where
        S: ShutdownSignal + 'static,
    {
        let (notify, notified) = oneshot::channel::<()>();
        let waiter = thread::Builder::new()
            .name(String::from("shutdown-signal"))
            .spawn(move || {
                let outcome = signal.wait();
                let _ = notify.send(());
                outcome
            })
            .map_err(|source| ShutdownError::Spawn { source })?;
        let released = async move {
            // A dropped sender also means the wait is over.
            let _ = notified.await;
        };
        Ok((Self { waiter }, released))
    }

    pub(crate) fn join(self) -> Result<(), ShutdownError> {
        self.waiter
            .join()
            .map_err(|_| ShutdownError::ListenerPanicked)?
    }
}
