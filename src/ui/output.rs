use crate::error::{format_bytes, TomeError, UserFriendlyError};
use crate::pipeline::{FileProgress, ProgressLog, Severity};
use crate::report::{CategoryCount, ExtractionReport};
use crate::scanner::SelectedFile;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

const DESCRIPTION_WIDTH: usize = 48;

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &TomeError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Summary, breakdowns and preview of a finished run.
    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_report(report);
                }
            }
        }
    }

    pub fn print_log(&self, log: &ProgressLog) {
        match self.mode {
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(log).unwrap_or_else(|_| "[]".to_string());
                println!("{}", json_output);
            }
            OutputMode::Human => {
                self.print_header("Processing Log");
                for entry in log.entries() {
                    let time = entry.timestamp.format("%H:%M:%S%.3f");
                    if self.use_colors {
                        let message = match entry.severity {
                            Severity::Success => style(entry.message.as_str()).green(),
                            Severity::Error => style(entry.message.as_str()).red(),
                            Severity::Progress => style(entry.message.as_str()).dim(),
                            Severity::Info => style(entry.message.as_str()).cyan(),
                        };
                        println!("{} {}", style(time).dim(), message);
                    } else {
                        println!("{} [{}] {}", time, entry.severity.as_str(), entry.message);
                    }
                }
            }
            OutputMode::Plain => {
                for entry in log.entries() {
                    println!(
                        "{} {} {}",
                        entry.timestamp.to_rfc3339(),
                        entry.severity.as_str().to_uppercase(),
                        entry.message
                    );
                }
            }
        }
    }

    /// Dry-run listing of what a run would and would not parse.
    pub fn print_selection(&self, accepted: &[&SelectedFile], excluded: &[&SelectedFile]) {
        match self.mode {
            OutputMode::Json => {
                let names = |files: &[&SelectedFile]| -> Vec<String> {
                    files.iter().map(|f| f.display_path()).collect()
                };
                self.print_json_object(&serde_json::json!({
                    "type": "selection",
                    "accepted": names(accepted),
                    "excluded": names(excluded),
                }));
            }
            _ => {
                self.print_header("Dry Run");
                println!("Would process {} file(s):", accepted.len());
                for file in accepted {
                    let size = std::fs::metadata(&file.path)
                        .map(|m| format_bytes(m.len()))
                        .unwrap_or_else(|_| "unreadable".to_string());
                    println!("  + {} ({})", file.display_path(), size);
                }

                if !excluded.is_empty() {
                    println!();
                    println!("Would skip {} file(s):", excluded.len());
                    for file in excluded {
                        println!("  - {}", file.display_path());
                    }
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        let summary = &report.summary;

        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Extraction completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Extraction completed!");
        }

        println!();
        println!("  Records:         {}", self.highlight(summary.total_records.to_string()));
        println!(
            "  Files:           {} ok, {} failed",
            self.highlight(report.succeeded_files().to_string()),
            report.failed_files()
        );
        println!(
            "  Time taken:      {}",
            self.highlight(format_duration(Duration::from_millis(report.elapsed_ms)))
        );
        self.print_separator();

        print_counts("Records by type:", &summary.by_type);
        print_counts("Records by source:", &summary.by_source);

        if !summary.by_kind.is_empty() {
            println!("Recognised kinds:");
            for (kind, count) in &summary.by_kind {
                println!("  {}: {}", kind, count);
            }
            println!();
        }

        if !summary.preview.is_empty() {
            println!(
                "Preview (first {} of {}):",
                summary.preview.len(),
                summary.total_records
            );
            println!("  {:<24} {:<14} {:<16} Description", "Name", "Type", "Source");
            for record in &summary.preview {
                println!(
                    "  {:<24} {:<14} {:<16} {}",
                    truncate(&record.name, 24),
                    truncate(&record.record_type, 14),
                    truncate(&record.source, 16),
                    truncate(&record.description, DESCRIPTION_WIDTH)
                );
            }
            println!();
        }

        if !report.errors.is_empty() {
            println!("Issues encountered:");
            for failure in &report.errors {
                println!("  - {}: {}", failure.file, failure.message);
            }
            println!();
        }
    }

    fn print_plain_report(&self, report: &ExtractionReport) {
        println!("REPORT: Extraction completed");
        println!("Records: {}", report.summary.total_records);
        for (file, progress) in &report.files {
            let status = match progress {
                FileProgress::Failed => "FAILED".to_string(),
                FileProgress::Percent(p) => format!("{}%", p),
            };
            println!("File: {} {}", file, status);
        }
        for count in &report.summary.by_type {
            println!("Type: {} {}", count.name, count.count);
        }
        println!("Duration: {}ms", report.elapsed_ms);

        if !report.errors.is_empty() {
            println!("Errors: {}", report.errors.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn print_counts(title: &str, counts: &[CategoryCount]) {
    if counts.is_empty() {
        return;
    }

    println!("{}", title);
    for count in counts {
        println!("  {}: {}", count.name, count.count);
    }
    println!();
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
