//! TCP listener for the HTTP endpoint.
//!
//! The port is bound with the standard library while the process is still
//! attached to its terminal. Serving happens later, after daemonisation, on a
//! `tokio` runtime created in the detached process.

mod errors;
mod listener;

pub(crate) use self::errors::ListenerError;
pub(crate) use self::listener::SocketListener;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
