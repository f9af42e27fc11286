use clap::Parser;
use std::process;
use tome_extract::{
    init_tracing, Cli, OutputFormatter, OutputMode, TomeError, TomeExtract, UserFriendlyError,
};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.log_directive());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let mut tome = match TomeExtract::from_cli(&cli) {
        Ok(tome) => tome,
        Err(e) => {
            print_startup_error(&cli, &e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &tome);
    }

    let result = tome.extract(&cli.paths).await;

    // JSON output carries the log inside the report when the run succeeds.
    let json_output = tome.output_formatter().mode() == OutputMode::Json;
    if cli.show_log && !(json_output && result.is_ok()) {
        tome.output_formatter().print_log(tome.progress_log());
    }

    match result {
        Ok(report) => {
            if let Err(e) = tome.export(cli.output.as_deref(), cli.llm_context.as_deref()) {
                tome.handle_error(&e);
                return exit_code_for(&e);
            }

            let report = if cli.show_log && json_output {
                report.with_log(tome.progress_log())
            } else {
                report
            };
            tome.output_formatter().print_extraction_report(&report);

            completion_code(report.errors.len(), tome.was_interrupted())
        }
        Err(e) => {
            tome.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &TomeError) -> i32 {
    match error {
        TomeError::NoValidFiles { .. } => 3,
        TomeError::NoDataExtracted { .. } => 4,
        TomeError::Config { .. } => 5,
        _ => 1,
    }
}

/// Exit code for a run that published data.
fn completion_code(failed_files: usize, interrupted: bool) -> i32 {
    if interrupted {
        130
    } else if failed_files > 0 {
        2
    } else {
        0
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "tome-extract.toml".to_string());

    match TomeExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  tome-extract <paths>... --config {}", config_path);
            println!("\nEdit the file to change accepted formats, limits and HTML selectors.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, tome: &TomeExtract) -> i32 {
    let formatter = tome.output_formatter();

    formatter.info("DRY RUN MODE - No files will be parsed");

    let selection = match tome.select_files(&cli.paths) {
        Ok(selection) => selection,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return exit_code_for(&e);
        }
    };

    let config = tome.config();
    formatter.info("Configuration that would be used:");
    formatter.info(&format!("  Extensions: {}", config.filters.extensions.join(", ")));
    formatter.info(&format!("  Max file size: {} bytes", config.filters.max_file_size));
    formatter.info(&format!("  Progress stride: {}", config.processing.progress_stride));

    let (accepted, excluded) = tome.plan(&selection);
    formatter.print_selection(&accepted, &excluded);

    if accepted.is_empty() {
        let error = TomeError::NoValidFiles {
            accepted_extensions: config.filters.extensions.clone(),
        };
        formatter.print_user_friendly_error(&error);
        return exit_code_for(&error);
    }

    formatter.success("Dry run completed successfully");
    0
}

fn print_startup_error(cli: &Cli, error: &TomeError) {
    let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tome-extract").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        let config_arg = config_path.to_string_lossy().to_string();

        let cli = cli(&["--generate-config", "--config", &config_arg]);

        assert_eq!(handle_generate_config(&cli), 0);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[filters]"));
        assert!(content.contains("block_selector"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&TomeError::NoValidFiles {
                accepted_extensions: vec![]
            }),
            3
        );
        assert_eq!(exit_code_for(&TomeError::NoDataExtracted { failed_files: 1 }), 4);
        assert_eq!(
            exit_code_for(&TomeError::Config {
                message: "bad".to_string()
            }),
            5
        );
        assert_eq!(
            exit_code_for(&TomeError::Export {
                path: "x".to_string(),
                message: "denied".to_string()
            }),
            1
        );
    }

    #[test]
    fn test_completion_codes() {
        assert_eq!(completion_code(0, false), 0);
        assert_eq!(completion_code(3, false), 2);
        assert_eq!(completion_code(0, true), 130);
        assert_eq!(completion_code(1, true), 130);
    }
}
