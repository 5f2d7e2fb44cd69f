//! The single HTML page of the service.
//!
//! `GET /` serves a self-contained converter page: drop zone, format
//! picker, convert button, and the session history panel. Styling and
//! behavior are embedded from `static/` at compile time, so the binary
//! serves everything itself with no asset routes.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::config::LimitsConfig;
use crate::state::AppState;

const CSS: &str = include_str!("../../static/app.css");
const JS: &str = include_str!("../../static/app.js");

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.config.limits).into_string())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Renders the page header with the app name and tagline
fn page_header() -> Markup {
    html! {
        header.page-header {
            h1 { "heifbox" }
            p.tagline { "Convert HEIC and HEIF photos to PNG or JPEG, right here." }
        }
    }
}

/// Renders the drop zone and the hidden file input behind it
fn drop_zone(limits: &LimitsConfig) -> Markup {
    html! {
        div.drop-zone id="drop-zone" {
            p.drop-hint { "Drop HEIC files here, or click to choose" }
            p.drop-limits {
                "Up to " (limits.max_files) " files per batch, "
                (limits.max_file_mib) " MiB each."
            }
            input type="file" id="file-input" multiple?
                accept=".heic,.heif,image/heic,image/heif" hidden?;
        }
        ul.file-list id="file-list" {}
    }
}

/// Renders the output format picker (PNG is the default)
fn format_picker() -> Markup {
    html! {
        fieldset.format-picker {
            legend { "Output format" }
            label {
                input type="radio" name="format" value="png" checked?;
                span { "PNG" }
                small { " lossless" }
            }
            label {
                input type="radio" name="format" value="jpeg";
                span { "JPEG" }
                small { " quality 95" }
            }
        }
    }
}

/// Renders the convert button and the live status line
fn convert_controls() -> Markup {
    html! {
        div.controls {
            button.convert id="convert-btn" disabled? { "Convert" }
            p.status id="status" aria-live="polite" {}
        }
    }
}

/// Renders the session history panel
fn history_panel() -> Markup {
    html! {
        section.history {
            div.history-head {
                h2 { "History" }
                button.clear id="clear-history" { "Clear" }
            }
            ul.history-list id="history-list" {
                li.history-empty { "Nothing converted yet." }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the converter page
fn render_index(limits: &LimitsConfig) -> Markup {
    let content = html! {
        (page_header())
        main.converter {
            (drop_zone(limits))
            (format_picker())
            (convert_controls())
        }
        (history_panel())
    };
    base_document("heifbox", content)
}

// ============================================================================
// Tests
// ============================================================================
