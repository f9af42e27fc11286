pub mod context;
pub mod log;
pub mod orchestrator;
pub mod state;

pub use context::{ExtractionContext, ProgressEvent, RunLedger, DEFAULT_PROGRESS_STRIDE};
pub use log::{LogEntry, ProgressLog, Severity};
pub use orchestrator::{FileEvent, FileOrchestrator, RunOutcome};
pub use state::{FileFailure, FileProgress, RunPhase, RunState};
