//! Request handling for the document root.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use pfserver_config::ServerConfig;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::listing::render_listing;
use crate::router::{Route, Router};

use super::HTTP_TARGET;
use super::files::serve_file;
use super::response::{FILE_NOT_FOUND, UNSUPPORTED_METHOD, error_response};

/// Everything a request needs: the router and the immutable configuration.
#[derive(Debug)]
pub(crate) struct Site {
    router: Router,
    config: Arc<ServerConfig>,
}

impl Site {
    pub(crate) fn new(router: Router, config: Arc<ServerConfig>) -> Self {
        Self { router, config }
    }

    async fn respond(&self, request: Request) -> Response {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return error_response(StatusCode::NOT_IMPLEMENTED, UNSUPPORTED_METHOD);
        }
        let route = self.router.resolve(request_target(&request));
        match route {
            Route::Listing(dir) => match render_listing(&dir, &self.config) {
                Ok(page) => Html(page).into_response(),
                Err(error) => {
                    warn!(
                        target: HTTP_TARGET,
                        path = %dir.display(),
                        %error,
                        "directory listing failed"
                    );
                    error_response(StatusCode::NOT_FOUND, error.reason())
                }
            },
            Route::File(path) => serve_file(&path, request).await,
            Route::NotFound => error_response(StatusCode::NOT_FOUND, FILE_NOT_FOUND),
        }
    }
}

/// Builds the application: one fallback handler for every target.
pub(crate) fn app(site: Site) -> axum::Router {
    axum::Router::new()
        .fallback(serve_target)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONNECTION,
            HeaderValue::from_static("close"),
        ))
        .with_state(Arc::new(site))
}

async fn serve_target(State(site): State<Arc<Site>>, request: Request) -> Response {
    let method = request.method().clone();
    let target = request_target(&request).to_owned();
    let version = request.version();
    let response = site.respond(request).await;
    info!(
        target: HTTP_TARGET,
        %method,
        request_target = %target,
        ?version,
        status = response.status().as_u16(),
        "request served"
    );
    response
}

fn request_target(request: &Request) -> &str {
    request
        .uri()
        .path_and_query()
        .map_or("/", |target| target.as_str())
}
