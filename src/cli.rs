use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tome-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract tabletop-game records from JSON, HTML and Markdown files")]
#[command(
    long_about = "tome-extract reads reference files (JSON record lists, HTML documents and \
                  Markdown outlines), turns every entry into a uniform record and reports \
                  what it found."
)]
#[command(before_help = "📜 tome-extract - Tabletop Record Extraction")]
#[command(after_help = "EXAMPLES:\n  \
    tome-extract spells.json monsters.html\n  \
    tome-extract campaign/ --output dataset.json --show-log\n  \
    tome-extract notes/ --formats md,markdown --preview 25\n  \
    tome-extract items.json --llm-context context.txt --output-format plain\n  \
    tome-extract --generate-config --config tome-extract.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "generate_config")]
    pub paths: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Write the extracted records as JSON
    #[arg(short, long, help = "Write the published data set to this JSON file")]
    pub output: Option<PathBuf>,

    /// Write the records as language-model context text
    #[arg(long, value_name = "FILE")]
    pub llm_context: Option<PathBuf>,

    /// File formats to accept (comma-separated)
    #[arg(short, long, help = "File extensions to accept (e.g., json,md)")]
    pub formats: Option<String>,

    /// Maximum file size; plain numbers are megabytes
    #[arg(long, value_parser = parse_size_string, help = "Maximum file size (e.g., 5, 512KB, 2MB)")]
    pub max_size: Option<u64>,

    /// Number of preview rows in the summary
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,

    /// Emit a progress entry every N records
    #[arg(long, value_name = "N")]
    pub progress_stride: Option<usize>,

    /// Attach spell, item and character details to JSON records
    #[arg(long)]
    pub typed_details: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the full processing log after the run
    #[arg(long)]
    pub show_log: bool,

    /// Dry run (show what would be parsed without parsing)
    #[arg(long, help = "List accepted and skipped files without parsing them")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_formats(self.formats.clone())
            .with_max_file_size(self.max_size)
            .with_progress_stride(self.progress_stride)
            .with_preview_rows(self.preview)
            .with_typed_details(self.typed_details)
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from(&self.output_format)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        match self.verbosity_level() {
            0 => "tome_extract=warn",
            1 => "tome_extract=info",
            2 => "tome_extract=debug",
            _ => "tome_extract=trace",
        }
    }
}

/// Parses sizes such as `512KB`, `2MB` or `1GB`. A bare number is megabytes.
pub fn parse_size_string(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (number_str, multiplier) = if s.ends_with("kb") || s.ends_with('k') {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024)
    } else if s.ends_with("mb") || s.ends_with('m') {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with("gb") || s.ends_with('g') {
        (
            s.trim_end_matches("gb").trim_end_matches('g'),
            1024 * 1024 * 1024,
        )
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        (s.as_str(), 1024 * 1024)
    };

    let number: f64 = number_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number format: {}", number_str))?;

    if number < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    Ok((number * multiplier as f64) as u64)
}
