use crate::pipeline::log::{ProgressLog, Severity};
use crate::record::sanitize::{generate_id, sanitize, RawFields};
use crate::record::Record;
use crate::ui::signals::CancellationSignal;
use serde_json::json;
use std::collections::HashSet;
use tracing::warn;

pub const DEFAULT_PROGRESS_STRIDE: usize = 10;

/// Progress notification handed to the injected callback.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    /// One-based position of the item within the file.
    pub processed: usize,
    /// Number of candidate items in the file.
    pub total: usize,
    /// Records admitted so far in the whole run.
    pub run_total: usize,
    pub record: &'a Record,
}

/// Per-run bookkeeping shared by every file of a run.
#[derive(Debug, Default)]
pub struct RunLedger {
    log: ProgressLog,
    seen_ids: HashSet<String>,
    processed: usize,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &ProgressLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ProgressLog {
        &mut self.log
    }

    /// Running count of records produced in this run.
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub(crate) fn reset(&mut self) {
        self.log.clear();
        self.seen_ids.clear();
        self.processed = 0;
    }
}

/// What a parser borrows from the run while it works on one file.
pub struct ExtractionContext<'a> {
    signal: &'a CancellationSignal,
    ledger: &'a mut RunLedger,
    stride: usize,
    on_progress: Option<&'a dyn Fn(&ProgressEvent<'_>)>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(signal: &'a CancellationSignal, ledger: &'a mut RunLedger) -> Self {
        Self {
            signal,
            ledger,
            stride: DEFAULT_PROGRESS_STRIDE,
            on_progress: None,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn with_progress(mut self, callback: &'a dyn Fn(&ProgressEvent<'_>)) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Per-item checkpoint. Logs the stop once and tells the parser to return
    /// what it has.
    pub fn stop_requested(&mut self) -> bool {
        if self.signal.is_stop_requested() {
            self.ledger.log.info("Processing stopped by user");
            return true;
        }
        false
    }

    /// Sanitize a raw item and register its id for this run.
    pub fn admit(&mut self, raw: &RawFields) -> Record {
        let mut record = sanitize(raw);

        if !self.ledger.seen_ids.insert(record.id.clone()) {
            let replacement = generate_id();
            warn!(duplicate = %record.id, replacement = %replacement, "duplicate record id re-keyed");
            record.id = replacement;
            self.ledger.seen_ids.insert(record.id.clone());
        }

        self.ledger.processed += 1;
        record
    }

    /// Emits a progress entry when `index` falls on the stride.
    pub fn report_progress(&mut self, index: usize, total: usize, record: &Record, what: &str) {
        if index % self.stride != 0 {
            return;
        }

        let processed = index + 1;
        self.ledger.log.push(
            Severity::Progress,
            format!("Processing {}: {}/{}", what, processed, total),
            Some(json!({
                "processed": processed,
                "total": total,
                "entity": record,
            })),
        );

        if let Some(callback) = self.on_progress {
            callback(&ProgressEvent {
                processed,
                total,
                run_total: self.ledger.processed,
                record,
            });
        }
    }
}
