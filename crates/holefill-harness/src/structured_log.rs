//! Structured JSONL logging for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL log record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or stderr.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// New entry stamped with the current system time.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: format!("{:?}", std::time::SystemTime::now()),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            scenario: None,
            op: None,
            outcome: None,
            details: None,
        }
    }
}

/// Writes JSONL log lines to a file or stderr.
pub struct LogEmitter {
    out: Box<dyn Write + Send>,
}

impl LogEmitter {
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        Ok(Self { out: Box::new(file) })
    }

    #[must_use]
    pub fn to_stderr() -> Self {
        Self {
            out: Box::new(std::io::stderr()),
        }
    }

    /// Serializes `entry` as one JSON line.
    pub fn emit(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry)?;
        writeln!(self.out, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let entry = LogEntry::new("harness::verify::0001", LogLevel::Info, "scenario_result");
        let json = serde_json::to_string(&entry).expect("serialize");
        assert!(json.contains(r#""level":"info""#));
        assert!(!json.contains("scenario"), "unset options must be skipped: {json}");
    }

    #[test]
    fn entry_round_trips() {
        let mut entry = LogEntry::new("harness::verify::0002", LogLevel::Warn, "scenario_result");
        entry.scenario = Some(String::from("first_fit_carving"));
        entry.outcome = Some(String::from("fail"));
        let json = serde_json::to_string(&entry).expect("serialize");
        let back: LogEntry = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.scenario.as_deref(), Some("first_fit_carving"));
        assert_eq!(back.level, LogLevel::Warn);
    }
}
