//! HTTP front end built on `axum`.
//!
//! Every request lands in a single fallback handler that asks the
//! [`Router`](crate::router::Router) what the target names. Listings are
//! rendered here; regular files are handed to `tower-http`, which takes care
//! of content types, conditional requests, and byte ranges. Responses carry
//! `Connection: close`, so each connection serves one request.

mod files;
mod handler;
pub(crate) mod response;

pub(crate) use self::handler::{Site, app};

pub(crate) const HTTP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::http");
