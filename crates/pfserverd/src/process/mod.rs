//! Daemon process supervision: binding, daemonisation, PID management, and
//! shutdown handling.

pub(crate) mod daemonizer;
mod errors;
mod files;
pub(crate) mod guard;
pub(crate) mod launch;
pub(crate) mod shutdown;

pub use daemonizer::DaemonizeError;
pub use errors::LaunchError;
pub use launch::{LaunchMode, RunOutcome, Server};
pub use shutdown::ShutdownError;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const FOREGROUND_ENV_VAR: &str = "PFSERVER_FOREGROUND";
/// Listener host: every IPv4 interface, matching a bind to `("", port)`.
pub(crate) const BIND_HOST: &str = "0.0.0.0";
