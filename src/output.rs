//! CLI output formatting.
//!
//! Every entity is shown by positional index and label first, with paths as
//! indented context lines:
//!
//! ```text
//! Adjustments
//!     contrast: 50
//!     negative: on
//!
//! 001 Dawn-Harbour (1200x800, rotated 90°)
//!     Source: shots/001-Dawn-Harbour.jpg
//!     Image saved: filtered/Image-Filtered-Dawn-Harbour-1718000000123-001.jpg
//! 002 broken
//!     Source: shots/broken.jpg
//!     Failed to load image: Decode failed: ...
//!
//! Exported 1 image, 1 failed
//! ```
//!
//! Each `format_*` function is pure and returns `Vec<String>` for testing;
//! the `print_*` wrappers write to stdout.

use crate::export::{ExportEvent, ExportSummary, Notice};
use crate::imaging::{AdjustmentState, ColorMatrix, Filter};
use crate::naming::source_label;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Index + label for a source; falls back to the file name when the label is empty.
fn source_header(index: usize, source: &Path) -> String {
    let label = source_label(source);
    if label.is_empty() {
        let filename = source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        format!("{} ({})", format_index(index), filename)
    } else {
        format!("{} {}", format_index(index), label)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Adjustments and matrices
// ============================================================================

/// List the adjustments that will be applied, in composition order.
pub fn format_adjustments(state: &AdjustmentState) -> Vec<String> {
    let mut lines = vec!["Adjustments".to_string()];
    let filters = state.active_filters();
    if filters.is_empty() {
        lines.push(format!("{}none", indent(1)));
    }
    for filter in filters {
        let line = match filter {
            Filter::Grayscale(a) => format!("gray: {}", a.value()),
            Filter::Brightness(a) => format!("brightness: {}", a.value()),
            Filter::Contrast(a) => format!("contrast: {}", a.value()),
            Filter::Sepia(a) => format!("sepia: {}", a.value()),
            Filter::Negative => "negative: on".to_string(),
        };
        lines.push(format!("{}{}", indent(1), line));
    }
    lines
}

/// One labelled line per output channel.
///
/// ```text
/// R [   1.0500    0.0000    0.0000    0.0000   -6.4000]
/// ```
pub fn format_matrix(matrix: &ColorMatrix) -> Vec<String> {
    let rendered = matrix.to_string();
    ["R", "G", "B", "A"]
        .iter()
        .zip(rendered.lines())
        .map(|(channel, row)| format!("{} {}", channel, row))
        .collect()
}

pub fn print_matrix(state: &AdjustmentState, matrix: &ColorMatrix) {
    for line in format_adjustments(state) {
        println!("{}", line);
    }
    println!();
    for line in format_matrix(matrix) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Sources picked up for export.
pub fn format_sources(sources: &[PathBuf]) -> Vec<String> {
    let mut lines = vec![format!("Sources ({})", sources.len())];
    for (i, source) in sources.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), source_header(i + 1, source)));
    }
    lines
}

pub fn print_sources(sources: &[PathBuf]) {
    for line in format_sources(sources) {
        println!("{}", line);
    }
}

/// Lines for one export progress event.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started { total } => vec![format!("Exporting {}", plural(*total, "image"))],
        ExportEvent::Saved { index, outcome } => {
            let mut header = format!(
                "{} ({}x{}",
                source_header(*index, &outcome.source),
                outcome.width,
                outcome.height
            );
            if outcome.rotation_degrees != 0 {
                header.push_str(&format!(", rotated {}°", outcome.rotation_degrees));
            }
            header.push(')');
            vec![
                header,
                format!("{}Source: {}", indent(1), outcome.source.display()),
                format!("{}{}: {}", indent(1), Notice::Saved, outcome.handle),
            ]
        }
        ExportEvent::Failed {
            index,
            source,
            notice,
            error,
        } => vec![
            source_header(*index, source),
            format!("{}Source: {}", indent(1), source.display()),
            format!("{}{}: {}", indent(1), notice, error),
        ],
    }
}

pub fn format_summary(summary: &ExportSummary) -> Vec<String> {
    let mut line = format!("Exported {}", plural(summary.saved, "image"));
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    vec![line]
}

pub fn print_summary(summary: &ExportSummary) {
    println!();
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
