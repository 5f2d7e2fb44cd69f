//! Centralized filename handling for uploads and outputs.
//!
//! Uploaded filenames come straight from the browser and end up in response
//! headers, ZIP entry names, history records, and logs — so they are
//! sanitized to a safe ASCII subset first. Output names swap the extension
//! for the target format's, and duplicates within one batch get a numeric
//! suffix so ZIP entries never collide.
//!
//! ## Examples
//!
//! - `IMG 0042 (kitchen).heic` → `IMG_0042__kitchen_.heic`
//! - `photo.heic` + `png` → `photo.png`
//! - second `photo.png` in a batch → `photo-1.png`

use std::collections::HashSet;

/// Fallback when sanitizing leaves nothing usable.
const FALLBACK_NAME: &str = "upload";

/// Reduce a client-supplied filename to a safe ASCII name.
///
/// Path components are stripped (only the final segment survives), and any
/// character outside `[A-Za-z0-9._-]` becomes `_`. Names that end up empty
/// or dot-only fall back to `upload`.
pub fn sanitize(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.' || c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Swap (or append) the extension: `photo.heic` + `png` → `photo.png`.
pub fn with_extension(filename: &str, extension: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.{extension}"),
        _ => format!("{filename}.{extension}"),
    }
}

/// Return `name`, suffixed with `-1`, `-2`, … before the extension if it is
/// already taken, and record the result in `taken`.
pub fn uniquify(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) if !s.is_empty() => (s, Some(e)),
        _ => (name, None),
    };

    for n in 1.. {
        let candidate = match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }
    unreachable!("suffix search is unbounded");
}
