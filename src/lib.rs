pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, FilterConfig, MarkupConfig, OutputConfig, ProcessingConfig};
pub use error::{Result, TomeError, UserFriendlyError};

// Core functionality re-exports
pub use parser::{FileKind, MarkupParser, OutlineParser, RecordParser, StructuredDataParser};
pub use pipeline::{
    ExtractionContext, FileOrchestrator, FileProgress, LogEntry, ProgressEvent, ProgressLog,
    RunOutcome, RunPhase, Severity,
};
pub use record::{Record, RecordDetails, RecordKind};
pub use report::{format_for_llm, DatasetSummary, ExtractionReport};
pub use scanner::{FileFilter, FileSelector, SelectedFile};
pub use ui::{CancellationSignal, InterruptHandler, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Main library interface: one configured extractor driving runs for the CLI.
pub struct TomeExtract {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    interrupts: InterruptHandler,
    orchestrator: FileOrchestrator,
}

impl TomeExtract {
    /// Create an extractor and route Ctrl+C to its stop signal.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let signal = CancellationSignal::new();
        let interrupts = InterruptHandler::install(signal)?;
        Self::assemble(config, output_mode, verbose, quiet, interrupts)
    }

    /// Create an extractor without a process-wide signal handler
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let interrupts = InterruptHandler::detached(CancellationSignal::new());
        Self::assemble(config, output_mode, verbose, quiet, interrupts)
            .expect("default selectors compile")
    }

    fn assemble(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        interrupts: InterruptHandler,
    ) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(output_mode == OutputMode::Human && !quiet);
        let orchestrator =
            FileOrchestrator::new(&config)?.with_signal(interrupts.signal().clone());

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            interrupts,
            orchestrator,
        })
    }

    /// Create an extractor from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(config, cli_args.output_mode(), cli_args.verbose, cli_args.quiet)
    }

    /// Expand paths into the ordered selection a run works on.
    pub fn select_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<SelectedFile>> {
        let selector = FileSelector::new(&self.config.filters);
        selector.select(paths)
    }

    /// Split a selection into parseable and skipped files without reading them.
    pub fn plan<'s>(
        &self,
        selection: &'s [SelectedFile],
    ) -> (Vec<&'s SelectedFile>, Vec<&'s SelectedFile>) {
        let (accepted, excluded) = self.orchestrator.partition(selection);
        (accepted.into_iter().map(|(file, _)| file).collect(), excluded)
    }

    /// Run the pipeline over `paths` and report on the published data set.
    pub async fn extract(&mut self, paths: &[PathBuf]) -> Result<ExtractionReport> {
        self.output_formatter.start_operation("Extracting records");

        let selection = self.select_files(paths)?;
        self.output_formatter
            .debug(&format!("Selected {} file(s)", selection.len()));

        let accepted = self.plan(&selection).0.len();
        let file_bar = self.progress_manager.create_file_progress(accepted as u64);

        let on_file = {
            let pb = file_bar.clone();
            move |event: &pipeline::FileEvent<'_>| ui::progress::update_file_progress(&pb, event)
        };
        let on_record = {
            let pb = file_bar.clone();
            move |event: &ProgressEvent<'_>| ui::progress::update_record_progress(&pb, event)
        };

        let outcome = self
            .orchestrator
            .process(&selection, Some(&on_file), Some(&on_record))
            .await;

        let elapsed = self.orchestrator.state().elapsed();
        match &outcome {
            Ok(outcome) => ui::progress::finish_progress_with_summary(
                &file_bar,
                &format!("Extracted {} records", outcome.records),
                elapsed,
            ),
            Err(_) => file_bar.abandon(),
        }
        self.progress_manager.clear();

        let outcome = outcome?;
        if outcome.stopped {
            self.output_formatter
                .warning("Stopped early; the data set holds the records read before the stop");
        }
        if outcome.failed_files > 0 {
            self.output_formatter.warning(&format!(
                "{} file(s) could not be processed",
                outcome.failed_files
            ));
        }

        Ok(self.report())
    }

    /// Report on the current published state.
    pub fn report(&self) -> ExtractionReport {
        ExtractionReport::from_state(self.orchestrator.state(), self.config.output.preview_rows)
    }

    /// Write the published records to the requested outputs.
    pub fn export(&self, dataset: Option<&Path>, llm_context: Option<&Path>) -> Result<()> {
        let records = self.orchestrator.records();

        if let Some(path) = dataset {
            report::write_dataset(records, path)?;
            self.output_formatter.success(&format!(
                "Wrote {} records to {}",
                records.len(),
                path.display()
            ));
        }

        if let Some(path) = llm_context {
            report::write_llm_context(records, path)?;
            self.output_formatter
                .success(&format!("Wrote LLM context to {}", path.display()));
        }

        Ok(())
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(TomeError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_log(&self) -> &ProgressLog {
        self.orchestrator.ledger().log()
    }

    pub fn records(&self) -> &[Record] {
        self.orchestrator.records()
    }

    /// Ask the current run to stop at its next record.
    pub fn request_stop(&self) {
        self.orchestrator.signal().request_stop();
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupts.was_interrupted()
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &TomeError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Install the `tracing` subscriber. `RUST_LOG` takes precedence over
/// `default_directive`.
pub fn init_tracing(default_directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Convenience function to extract records with minimal setup
pub async fn extract_simple(paths: &[PathBuf]) -> Result<Vec<Record>> {
    let selector = FileSelector::new(&Config::default().filters);
    let selection = selector.select(paths)?;

    let mut orchestrator = FileOrchestrator::new(&Config::default())?;
    orchestrator.process(&selection, None, None).await?;

    Ok(orchestrator.records().to_vec())
}
