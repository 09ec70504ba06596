//! Result → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): `id  state  (created ...)`, `(error) ...`
//! - **JSON** (`--json`): `serde_json::to_string_pretty` of the document
//! - **Raw** (`--raw`): bare values, one per line

use streamstate::{Error, RaceReport, Stream};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a stream snapshot.
pub fn format_stream(stream: &Stream, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(stream)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Raw => stream.state.to_string(),
        OutputMode::Human => format!(
            "{}  {}  (created {})",
            stream.id,
            stream.state,
            stream.created_at.to_rfc3339()
        ),
    }
}

/// Format an acknowledgement with no document.
pub fn format_ok(mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => "{\"ok\": true}".to_string(),
        OutputMode::Raw => String::new(),
        OutputMode::Human => "OK".to_string(),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": err.to_string(),
            "kind": error_kind(err),
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => err.to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format a race report. Human mode is the verification program's line.
pub fn format_race_report(report: &RaceReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "trials": report.trials,
            "conflicts": report.conflicts,
            "rejected": report.rejected,
            "interrupted_wins": report.interrupted_wins,
            "finished_wins": report.finished_wins,
            "both_committed": report.both_committed,
        }))
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Raw => format!("{} {}", report.conflicts, report.trials),
        OutputMode::Human => report.summary(),
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::NotFound(_) => "not_found",
        Error::InvalidTransition { .. } => "invalid_transition",
        Error::Conflict { .. } => "conflict",
        Error::Unavailable(_) => "unavailable",
        Error::Io(_) => "io",
        Error::Serialization(_) => "serialization",
        Error::Corruption(_) => "corruption",
        Error::InvalidInput(_) => "invalid_input",
    }
}
