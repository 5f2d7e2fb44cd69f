//! Unified server error type.
//!
//! Handlers return `Result<T, ServerError>`; the [`IntoResponse`] impl maps
//! each variant to a status code with a JSON `{"error": …}` body so every
//! failure reaches the user as a readable message. Internal faults are
//! logged in full and reported generically — implementation details never
//! leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::archive::ArchiveError;

/// All errors that can cross the HTTP boundary.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request itself is unusable: no files, bad format field, too
    /// many files. Nothing was converted.
    #[error("{0}")]
    Validation(String),

    /// Every file in the batch failed; `details` holds one
    /// "filename: reason" line per file.
    #[error("no files could be converted")]
    AllFailed { details: Vec<String> },

    /// The multipart body could not be read (malformed, or over the
    /// request size limit). Surfaced by the framework.
    #[error("upload failed: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Building the batch archive failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Unclassified internal fault (e.g. a panicked worker task).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ServerError::AllFailed { details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "no files could be converted",
                    "details": details,
                })),
            )
                .into_response(),
            ServerError::Multipart(e) => {
                let status = e.status();
                let message = format!("upload failed: {}", e.body_text());
                (status, Json(json!({ "error": message }))).into_response()
            }
            ServerError::Archive(e) => {
                error!(error = %e, "archive construction failed");
                internal_response()
            }
            ServerError::Internal(message) => {
                error!(message = %message, "internal server error");
                internal_response()
            }
        }
    }
}

fn internal_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("conversion task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = ServerError::Validation("no files uploaded".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn all_failed_maps_to_unprocessable() {
        let response = ServerError::AllFailed {
            details: vec!["a.heic: could not decode image data: corrupt".into()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_hides_detail_from_clients() {
        let response = ServerError::Internal("worker panicked mid-decode".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body assertions happen at the router level; here it is enough
        // that the variant formats generically.
        assert_eq!(
            ServerError::Internal("x".into()).to_string(),
            "internal error: x"
        );
    }
}
