//! JSON output helpers.
//!
//! `--json` promises exactly one JSON document on stdout per run. Success
//! summaries are built by the enroll command; this module owns the error
//! object every failing `--json` path prints instead.

use anyhow::{Context, Result};

/// Format the error object for `--json` runs.
///
/// `code` is the pipeline classification of the failure: `connectivity`,
/// `privilege`, `resolution`, `installation`, or `verification`, with
/// `enrollment` covering failures outside the staged pipeline.
///
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (it cannot for this shape:
/// `serde_json` only fails on non-finite floats and non-string map keys).
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let body = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&body).context("JSON serialization failed")
}
