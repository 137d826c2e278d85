//! Runtime for the `pfserver` HTTP file server.
//!
//! The daemon publishes a document root over HTTP/1.x with `axum`:
//! directories render as HTML download listings and regular files are served
//! by `tower-http`, with guessed content types, byte ranges and conditional
//! requests. Every target is resolved inside the canonical document root, so
//! `..` segments, encoded separators, and escaping symlinks all report
//! `404 File not found`.
//!
//! Launching happens in two steps. [`Server::bind`] creates the document root
//! and binds the listener while the process is still attached to the
//! terminal, so bind failures reach the operator. [`Server::run`] then
//! detaches (unless foreground mode is requested), installs telemetry, records
//! the PID file, and serves until a termination signal arrives. The PID file
//! is removed on graceful shutdown. In background mode the launching process
//! gets [`RunOutcome::Detached`] back straight away and can check the PID file
//! to confirm the daemon came up.

mod http;
mod listing;
mod process;
mod router;
mod telemetry;
mod transport;

pub use process::{DaemonizeError, LaunchError, LaunchMode, RunOutcome, Server, ShutdownError};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
