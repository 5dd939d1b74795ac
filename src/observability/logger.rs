//! Structured JSON event logger
//!
//! One log line per event, written synchronously with no buffering. Output
//! is deterministic: keys are emitted in sorted order, so identical events
//! produce identical lines.

use std::fmt;
use std::io::{self, Write};

use serde_json::{Map, Value};

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info,
    /// Recoverable issues, rejected requests
    Warn,
    /// Operation failures
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event logger writing one JSON object per line.
pub struct Logger;

impl Logger {
    /// Log at INFO level to stdout.
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::write_line(&mut io::stdout(), Severity::Info, event, fields);
    }

    /// Log at WARN level to stdout.
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::write_line(&mut io::stdout(), Severity::Warn, event, fields);
    }

    /// Log at ERROR level to stderr.
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::write_line(&mut io::stderr(), Severity::Error, event, fields);
    }

    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        // serde_json's map keeps keys sorted, which gives deterministic
        // output and handles escaping.
        let mut map = Map::new();
        map.insert("event".to_string(), Value::String(event.to_string()));
        map.insert(
            "severity".to_string(),
            Value::String(severity.as_str().to_string()),
        );
        for (key, value) in fields {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        Value::Object(map).to_string()
    }

    fn write_line<W: Write>(
        writer: &mut W,
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
    ) -> io::Result<()> {
        let line = Self::render(severity, event, fields);
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}
