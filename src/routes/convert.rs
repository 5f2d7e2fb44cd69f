//! The conversion upload route.
//!
//! `POST /convert` takes a multipart form: repeated `files` parts plus one
//! `format` field (`png` | `jpeg`). The whole batch is converted on the
//! blocking pool, one history record is appended per file, and the reply
//! is the converted bytes themselves — a single image when one file was
//! submitted, a ZIP archive when several were. Per-file failures in a
//! batch ride along in the `X-Conversion-Failures` header; if nothing
//! converted the reply is an error listing every failure.

use std::sync::Arc;

use axum::Extension;
use axum::extract::{Multipart, State};
use axum::http::HeaderValue;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::json;
use tracing::{info, warn};

use crate::archive::{self, ARCHIVE_NAME};
use crate::convert::{self, ConversionRequest, ConvertedFile, FailedFile, UploadedFile};
use crate::error::ServerError;
use crate::imaging::OutputFormat;
use crate::middleware::SessionId;
use crate::session::ConversionRecord;
use crate::state::AppState;

/// Batch failure report header. JSON array of `{file, reason}` objects;
/// filenames are sanitized to ASCII before they get here, so the value is
/// always a valid header.
pub static X_CONVERSION_FAILURES: &str = "x-conversion-failures";

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/convert", post(convert))
}

async fn convert(
    State(state): State<Arc<AppState>>,
    Extension(SessionId(session)): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut format: Option<OutputFormat> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                // Browsers submit an empty part when no file was picked.
                let Some(filename) = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                else {
                    continue;
                };
                let bytes = field.bytes().await?;
                files.push(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            "format" => {
                let value = field.text().await?;
                format = Some(OutputFormat::parse(&value).ok_or_else(|| {
                    ServerError::Validation(format!(
                        "invalid output format {value:?} (expected \"png\" or \"jpeg\")"
                    ))
                })?);
            }
            other => {
                return Err(ServerError::Validation(format!(
                    "unexpected form field {other:?}"
                )));
            }
        }
    }

    let format =
        format.ok_or_else(|| ServerError::Validation("missing output format field".into()))?;
    if files.is_empty() {
        return Err(ServerError::Validation("no files uploaded".into()));
    }
    let max_files = state.config.limits.max_files;
    if files.len() > max_files {
        return Err(ServerError::Validation(format!(
            "too many files: {} uploaded, at most {max_files} per request",
            files.len()
        )));
    }

    let submitted = files.len();
    let request = ConversionRequest { files, format };
    let max_file_bytes = state.config.max_file_bytes();
    let worker = Arc::clone(&state);

    // Decode and encode are CPU-bound; keep them off the async workers.
    let outcomes = tokio::task::spawn_blocking(move || {
        convert::convert_batch(&request, worker.decoder.as_ref(), max_file_bytes)
    })
    .await?;

    // One history record per file, success or failure, in submission order.
    for outcome in &outcomes {
        state.sessions.append(
            session,
            ConversionRecord::new(outcome.source_name(), format, outcome.is_converted()),
        );
    }

    let (converted, failed) = convert::partition(outcomes);
    for failure in &failed {
        warn!(
            file = %failure.source_name,
            reason = %failure.reason,
            "file did not convert"
        );
    }
    info!(
        session = %session,
        submitted,
        converted = converted.len(),
        failed = failed.len(),
        format = format.label(),
        "conversion request handled"
    );

    if converted.is_empty() {
        return Err(ServerError::AllFailed {
            details: failed
                .iter()
                .map(|f| format!("{}: {}", f.source_name, f.reason))
                .collect(),
        });
    }

    if submitted == 1 {
        // Exactly one file submitted and it converted (otherwise we'd have
        // bailed above): hand the image straight back.
        let file = converted
            .into_iter()
            .next()
            .ok_or_else(|| ServerError::Internal("converted batch is empty".into()))?;
        Ok(file_response(file, format))
    } else {
        let bytes = archive::bundle(&converted)?;
        Ok(archive_response(bytes, &failed))
    }
}

fn file_response(file: ConvertedFile, format: OutputFormat) -> Response {
    (
        [
            (CONTENT_TYPE, format.mime().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.output_name),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

fn archive_response(bytes: Vec<u8>, failed: &[FailedFile]) -> Response {
    let mut response = (
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response();

    if let Some(report) = failure_report(failed) {
        response.headers_mut().insert(X_CONVERSION_FAILURES, report);
    }
    response
}

fn failure_report(failed: &[FailedFile]) -> Option<HeaderValue> {
    if failed.is_empty() {
        return None;
    }
    let report: Vec<_> = failed
        .iter()
        .map(|f| json!({ "file": f.source_name, "reason": f.reason.to_string() }))
        .collect();
    let encoded = serde_json::to_string(&report).ok()?;
    HeaderValue::from_str(&encoded).ok()
}
