//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Trim
//!
//! ```text
//! 001 signature.png (640x480)
//!     Trimmed: 212x58 at (37, 201)
//!     Output: signature-trimmed.png
//! 002 blank.png (100x100)
//!     Unchanged: fully transparent
//!     Output: blank-trimmed.png
//!
//! Trimmed 1 of 2 images
//! ```
//!
//! ## Bbox
//!
//! ```text
//! signature.png (640x480)
//!     Box: left 37, top 201, right 248, bottom 258
//!     Size: 212x58
//! ```
//!
//! ## Logs
//!
//! ```text
//! 001 10:15:30 INFO  sigtrim::imaging::operations: Trimmed 640x480 -> 212x58
//! 002 10:15:31 ERROR panic: index out of bounds
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::diagnostics::{LogEntry, Origin};
use crate::imaging::{BackendError, BoundingBox, Dimensions, TrimOutcome};
use chrono::Local;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn dims(d: Dimensions) -> String {
    format!("{}x{}", d.width, d.height)
}

// ============================================================================
// Trim output
// ============================================================================

/// Format the lines for one trimmed file.
pub fn format_trim_outcome(index: usize, outcome: &TrimOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({})",
        format_index(index),
        display_name(&outcome.source),
        dims(outcome.source_dims)
    )];
    match outcome.bbox {
        Some(bbox) if outcome.was_trimmed() => lines.push(format!(
            "{}Trimmed: {} at ({}, {})",
            indent(1),
            dims(outcome.output_dims),
            bbox.left,
            bbox.top
        )),
        Some(_) => lines.push(format!("{}Unchanged: no transparent border", indent(1))),
        None => lines.push(format!("{}Unchanged: fully transparent", indent(1))),
    }
    lines.push(format!("{}Output: {}", indent(1), outcome.output.display()));
    lines
}

/// Format a file that could not be trimmed.
pub fn format_trim_failure(index: usize, source: &Path, error: &BackendError) -> Vec<String> {
    vec![
        format!("{} {}", format_index(index), display_name(source)),
        format!("{}Failed: {}", indent(1), error),
    ]
}

/// Format a whole batch: per-file blocks, then a summary line.
pub fn format_trim_batch<'a>(
    results: impl IntoIterator<Item = (&'a Path, &'a Result<TrimOutcome, BackendError>)>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total = 0;
    let mut trimmed = 0;
    let mut failed = 0;

    for (i, (source, result)) in results.into_iter().enumerate() {
        total += 1;
        match result {
            Ok(outcome) => {
                if outcome.was_trimmed() {
                    trimmed += 1;
                }
                lines.extend(format_trim_outcome(i + 1, outcome));
            }
            Err(e) => {
                failed += 1;
                lines.extend(format_trim_failure(i + 1, source, e));
            }
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Trimmed {} of {} image{}",
        trimmed,
        total,
        if total == 1 { "" } else { "s" }
    );
    if failed > 0 {
        summary.push_str(&format!(", {} failed", failed));
    }
    lines.push(summary);
    lines
}

pub fn print_trim_batch<'a>(
    results: impl IntoIterator<Item = (&'a Path, &'a Result<TrimOutcome, BackendError>)>,
) {
    for line in format_trim_batch(results) {
        println!("{}", line);
    }
}

// ============================================================================
// Bbox output
// ============================================================================

/// Format the bounding box report for one file.
pub fn format_bbox(source: &Path, dimensions: Dimensions, bbox: Option<BoundingBox>) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", display_name(source), dims(dimensions))];
    match bbox {
        Some(b) => {
            lines.push(format!(
                "{}Box: left {}, top {}, right {}, bottom {}",
                indent(1),
                b.left,
                b.top,
                b.right,
                b.bottom
            ));
            lines.push(format!("{}Size: {}x{}", indent(1), b.width(), b.height()));
        }
        None => lines.push(format!("{}Box: none (fully transparent)", indent(1))),
    }
    lines
}

pub fn print_bbox(source: &Path, dimensions: Dimensions, bbox: Option<BoundingBox>) {
    for line in format_bbox(source, dimensions, bbox) {
        println!("{}", line);
    }
}

// ============================================================================
// Logs output
// ============================================================================

/// Format persisted log entries, oldest first, with local-time clocks.
pub fn format_log_entries(entries: &[LogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No log entries".to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let target = match entry.origin {
                Origin::Panic => "panic",
                Origin::Log => entry.target.as_str(),
            };
            format!(
                "{} {} {:<5} {}: {}",
                format_index(i + 1),
                entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                entry.level,
                target,
                entry.message
            )
        })
        .collect()
}

pub fn print_log_entries(entries: &[LogEntry]) {
    for line in format_log_entries(entries) {
        println!("{}", line);
    }
}
