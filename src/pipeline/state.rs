use crate::pipeline::context::RunLedger;
use crate::record::Record;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Resetting,
    Processing,
    Completed,
    Failed,
}

/// Per-file status. Serialized as a plain integer, with `-1` for failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProgress {
    Percent(u8),
    Failed,
}

impl FileProgress {
    pub const STARTED: FileProgress = FileProgress::Percent(0);
    pub const DONE: FileProgress = FileProgress::Percent(100);

    pub fn as_i16(&self) -> i16 {
        match self {
            Self::Percent(p) => *p as i16,
            Self::Failed => -1,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl Serialize for FileProgress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.as_i16())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub message: String,
}

/// Everything a run publishes. Owned by the orchestrator.
#[derive(Debug)]
pub struct RunState {
    pub(crate) phase: RunPhase,
    pub(crate) file_progress: IndexMap<String, FileProgress>,
    pub(crate) failures: Vec<FileFailure>,
    pub(crate) records: Vec<Record>,
    pub(crate) ledger: RunLedger,
    pub(crate) elapsed: Duration,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            file_progress: IndexMap::new(),
            failures: Vec::new(),
            records: Vec::new(),
            ledger: RunLedger::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn file_progress(&self) -> &IndexMap<String, FileProgress> {
        &self.file_progress
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// The published data set. Survives a run that extracted nothing.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ledger(&self) -> &RunLedger {
        &self.ledger
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Clears per-run bookkeeping. The published records are left alone.
    pub(crate) fn reset(&mut self) {
        self.phase = RunPhase::Resetting;
        self.file_progress.clear();
        self.failures.clear();
        self.ledger.reset();
        self.elapsed = Duration::ZERO;
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
