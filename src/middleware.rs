//! Request middleware: tracing spans and session cookies.
//!
//! Both middlewares run for every route. [`trace_middleware`] wraps each
//! request in a span carrying a UUID trace id (reused from the incoming
//! `X-Trace-Id` header when present) and logs the status and latency on
//! the way out. [`session_middleware`] guarantees every handler sees a
//! session id: it reads the session cookie or mints a fresh UUID, stashes
//! it in request extensions, and sets the cookie on the response when it
//! minted one — including on error responses, so history written during a
//! failed conversion is not orphaned.

use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Session cookie name. `HttpOnly` + `SameSite=Lax`: the id is only ever
/// read server-side, and cross-site POSTs should not ride along.
pub const SESSION_COOKIE: &str = "heifbox_session";

/// The caller's session id, extracted by handlers via
/// `Extension<SessionId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        let mut response = next.run(req).await;

        if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn session_middleware(mut req: Request<Body>, next: Next) -> Response {
    let existing = session_from_headers(req.headers());
    let id = existing.unwrap_or_else(Uuid::new_v4);
    req.extensions_mut().insert(SessionId(id));

    let mut response = next.run(req).await;

    if existing.is_none() {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Pull the session UUID out of the `Cookie` header(s), if any.
fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE {
                    if let Ok(id) = Uuid::parse_str(value.trim()) {
                        return Some(id);
                    }
                }
            }
        }
    }
    None
}

fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
