//! Session history routes.
//!
//! `GET /history` returns the current session's conversion records, oldest
//! first; `POST /clear-history` wipes them. Both are keyed by the session
//! cookie minted in [`crate::middleware`], so one browser never sees
//! another's history.

use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use crate::middleware::SessionId;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history", get(history))
        .route("/clear-history", post(clear_history))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(session)): Extension<SessionId>,
) -> Json<Value> {
    Json(json!({ "history": state.sessions.list(session) }))
}

async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(session)): Extension<SessionId>,
) -> Json<Value> {
    state.sessions.clear(session);
    Json(json!({ "cleared": true }))
}
