//! Collaborators injected into the server during tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use pfserver_config::RuntimePaths;

use crate::process::daemonizer::{Daemonizer, Detached};
use crate::process::shutdown::ShutdownSignal;
use crate::process::{DaemonizeError, ShutdownError};

/// Records daemonisation requests without forking.
///
/// By default the caller carries on as the daemon; [`TestDaemonizer::launcher`]
/// plays the launching side instead.
#[derive(Clone)]
pub(crate) struct TestDaemonizer {
    calls: Arc<AtomicUsize>,
    side: Detached,
}

impl Default for TestDaemonizer {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            side: Detached::Daemon,
        }
    }
}

impl TestDaemonizer {
    pub(crate) fn launcher() -> Self {
        Self {
            side: Detached::Launcher,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Daemonizer for TestDaemonizer {
    fn daemonize(&self, _paths: &RuntimePaths) -> Result<Detached, DaemonizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.side)
    }
}

/// Shutdown signal released explicitly by the test.
#[derive(Clone)]
pub(crate) struct TestShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl TestShutdownSignal {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    pub(crate) fn triggered() -> Self {
        let signal = Self::new();
        signal.trigger();
        signal
    }

    pub(crate) fn trigger(&self) {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        *triggered = true;
        cvar.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let (lock, cvar) = &*self.inner;
        let mut triggered = lock.lock().expect("shutdown mutex poisoned");
        while !*triggered {
            triggered = cvar
                .wait(triggered)
                .expect("shutdown mutex poisoned during wait");
        }
        Ok(())
    }
}
