use crate::config::Config;
use crate::error::{TomeError, Result};
use crate::parser::{FileKind, MarkupParser, ParserSet, StructuredDataParser};
use crate::pipeline::context::{ExtractionContext, ProgressEvent, RunLedger};
use crate::pipeline::log::Severity;
use crate::pipeline::state::{FileFailure, FileProgress, RunPhase, RunState};
use crate::record::Record;
use crate::scanner::{FileFilter, SelectedFile};
use crate::ui::signals::CancellationSignal;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info};

/// File-level notification, sent when a file starts and when it settles.
#[derive(Debug, Clone, Copy)]
pub struct FileEvent<'a> {
    pub index: usize,
    pub total: usize,
    pub file: &'a SelectedFile,
    pub progress: FileProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub records: usize,
    pub failed_files: usize,
    pub stopped: bool,
}

/// Runs the parsers over a selection and publishes the combined data set.
pub struct FileOrchestrator {
    filter: FileFilter,
    parsers: ParserSet,
    stride: usize,
    signal: CancellationSignal,
    state: RunState,
}

impl FileOrchestrator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            filter: FileFilter::new(&config.filters),
            parsers: ParserSet::new(
                StructuredDataParser::new().with_typed_details(config.processing.typed_details),
                MarkupParser::new(&config.markup)?,
            ),
            stride: config.processing.progress_stride,
            signal: CancellationSignal::new(),
            state: RunState::new(),
        })
    }

    pub fn with_signal(mut self, signal: CancellationSignal) -> Self {
        self.signal = signal;
        self
    }

    /// Handle for stopping the current run from elsewhere.
    pub fn signal(&self) -> &CancellationSignal {
        &self.signal
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        self.state.records()
    }

    /// Splits a selection into files a parser accepts and files it does not.
    pub fn partition<'s>(
        &self,
        selection: &'s [SelectedFile],
    ) -> (Vec<(&'s SelectedFile, FileKind)>, Vec<&'s SelectedFile>) {
        let mut accepted = Vec::new();
        let mut excluded = Vec::new();

        for file in selection {
            match self.filter.accepted_kind(&file.path) {
                Some(kind) => accepted.push((file, kind)),
                None => excluded.push(file),
            }
        }

        (accepted, excluded)
    }

    pub async fn process(
        &mut self,
        selection: &[SelectedFile],
        file_callback: Option<&dyn Fn(&FileEvent<'_>)>,
        record_callback: Option<&dyn Fn(&ProgressEvent<'_>)>,
    ) -> Result<RunOutcome> {
        let start_time = Instant::now();

        self.state.reset();
        self.signal.reset();

        let (accepted, excluded) = self.partition(selection);
        for file in &excluded {
            let reason = TomeError::UnsupportedType {
                extension: file.extension.clone(),
            };
            debug!(file = %file.display_path(), %reason, "excluded from run");
        }

        if accepted.is_empty() {
            self.state.phase = RunPhase::Failed;
            return Err(TomeError::NoValidFiles {
                accepted_extensions: self.filter.get_extensions().clone(),
            });
        }

        info!(files = accepted.len(), excluded = excluded.len(), "starting extraction run");
        self.state.phase = RunPhase::Processing;

        let total = accepted.len();
        let mut combined = Vec::new();

        for (index, (file, kind)) in accepted.into_iter().enumerate() {
            let key = file.display_path();
            self.state
                .ledger
                .log_mut()
                .info(format!("Starting to process file: {}", file.filename));
            self.state.file_progress.insert(key.clone(), FileProgress::STARTED);
            notify(file_callback, index, total, file, FileProgress::STARTED);

            let extracted = match self.read_file(file).await {
                Ok(content) => {
                    debug!(file = %key, kind = kind.as_str(), "dispatching to parser");
                    let parser = self.parsers.for_kind(kind);
                    let mut ctx = ExtractionContext::new(&self.signal, &mut self.state.ledger)
                        .with_stride(self.stride);
                    if let Some(callback) = record_callback {
                        ctx = ctx.with_progress(callback);
                    }
                    parser.parse(&content, &mut ctx)
                }
                Err(e) => Err(e),
            };

            let progress = match extracted {
                Ok(records) => {
                    let count = records.len();
                    self.state.ledger.log_mut().push(
                        Severity::Success,
                        format!("Successfully processed {} entries from {}", count, file.filename),
                        Some(json!({ "totalEntries": count })),
                    );
                    combined.extend(records);
                    FileProgress::DONE
                }
                Err(e) => {
                    info!(file = %key, error = %e, "file failed");
                    self.state
                        .ledger
                        .log_mut()
                        .error(format!("Error processing {}: {}", file.filename, e));
                    self.state.failures.push(FileFailure {
                        file: key.clone(),
                        message: e.to_string(),
                    });
                    FileProgress::Failed
                }
            };

            self.state.file_progress.insert(key, progress);
            notify(file_callback, index, total, file, progress);
        }

        self.state.elapsed = start_time.elapsed();
        let failed_files = self.state.failures.len();

        if combined.is_empty() {
            self.state.phase = RunPhase::Failed;
            return Err(TomeError::NoDataExtracted { failed_files });
        }

        let outcome = RunOutcome {
            records: combined.len(),
            failed_files,
            stopped: self.signal.is_stop_requested(),
        };

        self.state.records = combined;
        self.state.phase = RunPhase::Completed;
        info!(
            records = outcome.records,
            failed_files,
            elapsed_ms = self.state.elapsed.as_millis() as u64,
            "extraction run completed"
        );

        Ok(outcome)
    }

    async fn read_file(&self, file: &SelectedFile) -> Result<String> {
        let metadata = tokio::fs::metadata(&file.path).await?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Err(TomeError::FileTooLarge {
                size: metadata.len(),
                max_size: self.filter.get_max_file_size(),
            });
        }

        // Invalid UTF-8 sequences become U+FFFD instead of failing the file.
        let bytes = tokio::fs::read(&file.path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn ledger(&self) -> &RunLedger {
        self.state.ledger()
    }
}

fn notify(
    callback: Option<&dyn Fn(&FileEvent<'_>)>,
    index: usize,
    total: usize,
    file: &SelectedFile,
    progress: FileProgress,
) {
    if let Some(callback) = callback {
        callback(&FileEvent {
            index,
            total,
            file,
            progress,
        });
    }
}
