//! Suggested file names for exported images.
//!
//! An export is named after its source so a batch stays recognisable:
//!
//! ```text
//! 001-Dawn-Harbour.jpg  →  Image-Filtered-Dawn-Harbour-1718000000123.jpg
//! IMG 2041.JPG          →  Image-Filtered-IMG-2041-1718000000123.jpg
//! (batch item 3)        →  Image-Filtered-Dawn-Harbour-1718000000123-003.jpg
//! ```
//!
//! - A leading `NNN-` ordering prefix on the source stem is dropped.
//! - Anything outside `[A-Za-z0-9_-]` becomes a dash; runs collapse.
//! - The millisecond timestamp keeps repeated runs apart.
//! - Inside one batch, labels and milliseconds can coincide (`001-Pier.jpg`
//!   and `002-Pier.jpg`), so batch items also carry their 1-based position.

use crate::imaging::OutputFormat;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Strip a leading `NNN-` ordering prefix from a file stem.
///
/// - `"020-My-Photo"` → `"My-Photo"`
/// - `"Museum"` → `"Museum"`
/// - `"001"` / `"001-"` → `""`
/// - `"wip-drafts"` → `"wip-drafts"` (prefix must be numeric)
pub fn strip_order_prefix(stem: &str) -> &str {
    if let Some((prefix, rest)) = stem.split_once('-')
        && !prefix.is_empty()
        && prefix.bytes().all(|b| b.is_ascii_digit())
    {
        return rest;
    }
    if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
        return "";
    }
    stem
}

/// Replace unsafe characters with dashes and collapse repeats.
fn sanitize(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Human-readable label for a source path, without ordering prefix.
pub fn source_label(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize(strip_order_prefix(&stem))
}

/// `<prefix>-<label>-<millis>[-<NNN>].<ext>`; the label is omitted when empty.
///
/// `sequence` is the 1-based position of the source within a batch.
pub fn export_file_name(
    prefix: &str,
    source: &Path,
    millis: u128,
    sequence: Option<usize>,
    format: OutputFormat,
) -> String {
    let prefix = sanitize(prefix);
    let label = source_label(source);
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if !prefix.is_empty() {
        parts.push(prefix);
    }
    if !label.is_empty() {
        parts.push(label);
    }
    parts.push(millis.to_string());
    if let Some(n) = sequence {
        parts.push(format!("{:0>3}", n));
    }
    format!("{}.{}", parts.join("-"), format.extension())
}

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
