//! pdfbinder - Bind PDF files into one document with a table of contents.
//!
//! Reads a JSON configuration describing sections and source documents,
//! concatenates the documents, and generates a clickable TOC page.

use clap::Parser;
use log::LevelFilter;
use std::process;

use pdfbinder::cli::Cli;
use pdfbinder::config::{Config, OverwriteMode};
use pdfbinder::error::BinderError;
use pdfbinder::io::PdfWriter;
use pdfbinder::merge;
use pdfbinder::output::{self, OutputFormatter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run the application and handle errors
    if let Err(err) = run(cli).await {
        OutputFormatter::default().error(&format!("Error: {err}"));
        process::exit(err.exit_code());
    }
}

/// Route library diagnostics through env_logger.
///
/// `RUST_LOG` wins; otherwise only warnings, or debug output with `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), BinderError> {
    let config = cli.load_config().await?;
    let formatter = output::create_formatter(&config);

    // Print header
    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfbinder::NAME, pdfbinder::VERSION));
        formatter.blank_line();
    }

    formatter.debug(&format!("Input directory: {}", config.input_dir.display()));
    formatter.debug(&format!(
        "Schema: {} document name(s)",
        config.schema.file_count()
    ));

    // Handle output file existence
    if !config.dry_run {
        handle_output_overwrite(&config, &formatter).await?;
    }

    if config.dry_run {
        formatter.info("DRY RUN MODE - No files will be created");
    } else {
        formatter.info("Binding documents...");
    }

    let report = merge::bind_pdfs(&config).await?;

    if config.json {
        println!("{}", output::report_to_json(&report)?);
    } else {
        output::display_warnings(&formatter, &report.warnings);
        if config.dry_run || formatter.is_verbose() {
            output::display_entries(&formatter, &report);
        }
        formatter.blank_line();
        output::display_summary(&formatter, &report);
    }

    if config.dry_run {
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        formatter.info("  Run without --dry-run to create the bound PDF");
        return Ok(());
    }

    formatter.success(&format!(
        "Successfully created {} ({})",
        config.output.display(),
        pdfbinder::utils::format_file_size(report.file_size.unwrap_or(0))
    ));

    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), BinderError> {
    // Check if output exists
    if !PdfWriter::new().exists(&config.output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(BinderError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask in quiet or JSON mode
            if formatter.is_quiet() {
                return Err(BinderError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            // Simple yes/no prompt
            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| BinderError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(BinderError::Cancelled)
            }
        }
    }
}
