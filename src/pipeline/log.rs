use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
    Progress,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Progress => "progress",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Append-only run log. Cleared only when a new run starts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ProgressLog {
    entries: Vec<LogEntry>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, severity: Severity, message: S, payload: Option<Value>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
            severity,
            payload,
        });
    }

    pub fn info<S: Into<String>>(&mut self, message: S) {
        self.push(Severity::Info, message, None);
    }

    pub fn error<S: Into<String>>(&mut self, message: S) {
        self.push(Severity::Error, message, None);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
