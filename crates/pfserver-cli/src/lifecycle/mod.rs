//! Lifecycle management for the `pfserver` daemon.
//!
//! The module is split into focused submodules:
//! - [`types`] defines the command model and output helpers.
//! - [`error`] captures the error surface exposed to the CLI.
//! - [`monitoring`] reads the PID file and checks liveness.
//! - [`shutdown`] signals the daemon and escalates to a forced stop.
//! - [`controller`] implements the high-level start/stop/status flows.

mod controller;
mod error;
mod monitoring;
mod shutdown;
mod types;

pub use controller::SystemLifecycle;
pub use error::LifecycleError;
pub use shutdown::{StopOutcome, StopPolicy};
pub use types::{LifecycleCommand, LifecycleOutput};
