//! Maps request targets onto the document root.
//!
//! The router never lets a target escape the root: the joined path is
//! canonicalised (resolving `..` segments and symlinks) and must still sit
//! under the canonical root before anything is listed or served.

use std::fs;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use tracing::warn;

use crate::http::HTTP_TARGET;

/// Outcome of resolving a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    /// Render a listing of this directory.
    Listing(PathBuf),
    /// Hand this regular file to the file responder.
    File(PathBuf),
    /// Nothing servable exists at the target (or it lies outside the root).
    NotFound,
}

/// Resolves request targets against a canonical document root.
#[derive(Debug, Clone)]
pub(crate) struct Router {
    root: PathBuf,
}

impl Router {
    /// Builds a router; `root` must already be canonical.
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub(crate) fn resolve(&self, target: &str) -> Route {
        let relative = normalise_target(target);
        let candidate = self.root.join(&relative);
        let Ok(resolved) = fs::canonicalize(&candidate) else {
            return Route::NotFound;
        };
        if !resolved.starts_with(&self.root) {
            warn!(
                target: HTTP_TARGET,
                request = target,
                "refusing target outside document root"
            );
            return Route::NotFound;
        }
        match fs::metadata(&resolved) {
            Ok(metadata) if metadata.is_dir() => Route::Listing(resolved),
            Ok(_) => Route::File(resolved),
            Err(_) => Route::NotFound,
        }
    }
}

/// Drops any query or fragment, percent-decodes the path, and strips one
/// leading `/`. An empty result addresses the root itself.
fn normalise_target(target: &str) -> String {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    decoded.strip_prefix('/').unwrap_or(&decoded).to_owned()
}
