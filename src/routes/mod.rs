//! HTTP route assembly.
//!
//! Each route module exposes a `router()`; [`build`] merges them and wraps
//! the result in the shared middleware stack: request tracing outermost,
//! then session cookies, then the request body limit. Handlers receive the
//! shared [`AppState`] and the session id minted by the middleware.

mod convert;
mod history;
mod pages;

pub use convert::X_CONVERSION_FAILURES;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;

use crate::middleware::{session_middleware, trace_middleware};
use crate::state::AppState;

/// Build the application router.
pub fn build(state: Arc<AppState>) -> Router {
    let max_request = state.config.max_request_bytes();
    Router::new()
        .merge(pages::router())
        .merge(convert::router())
        .merge(history::router())
        .layer(DefaultBodyLimit::max(max_request))
        .layer(from_fn(session_middleware))
        .layer(from_fn(trace_middleware))
        .with_state(state)
}
