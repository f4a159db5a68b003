//! Output formatting and display for pdfbinder.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Warning display
//! - The bind report, as text or JSON
//! - Quiet and verbose modes
//!
//! # Examples
//!
//! ```no_run
//! use pdfbinder::output::OutputFormatter;
//! use pdfbinder::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Binding documents...");
//! formatter.success("Bind completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::config::Config;
use crate::error::{BinderError, Result, Warning};
use crate::merge::BindReport;

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Display every warning.
pub fn display_warnings(formatter: &OutputFormatter, warnings: &[Warning]) {
    for warning in warnings {
        formatter.warning(&warning.to_string());
    }
}

/// Display the TOC a report describes.
///
/// Visible entries are listed indented by level. In verbose mode hidden
/// entries and the inserted files are listed too.
pub fn display_entries(formatter: &OutputFormatter, report: &BindReport) {
    formatter.section(&format!("Table of contents (page {})", report.toc_page));
    for entry in &report.entries {
        let depth = entry.level.saturating_sub(1) as usize;
        if entry.visible {
            formatter.list_item(depth, &format!("{} .... {}", entry.title, entry.page));
        } else if formatter.is_verbose() {
            formatter.list_item(depth, &format!("({} .... {}, hidden)", entry.title, entry.page));
        }
    }

    if formatter.is_verbose() {
        formatter.section("Documents");
        for file in &report.files {
            let pages = match file.pages {
                0 => "no pages".to_string(),
                1 => format!("page {}", file.first_page),
                n => format!("pages {}-{}", file.first_page, file.first_page + n - 1),
            };
            formatter.detail(&file.path.display().to_string(), &pages);
        }
    }
}

/// Display the summary line and statistics of a report.
pub fn display_summary(formatter: &OutputFormatter, report: &BindReport) {
    formatter.info(&format!(
        "Bound {} file(s) into {} page(s) in {:.2}s",
        report.files.len(),
        report.total_pages,
        report.elapsed.as_secs_f64()
    ));

    if formatter.is_verbose() {
        formatter.blank_line();
        formatter.section("Statistics");
        formatter.detail("Input files", &report.files.len().to_string());
        formatter.detail("Input size", &report.format_input_size());
        formatter.detail("Total pages", &report.total_pages.to_string());
        formatter.detail("TOC rows", &report.toc_rows.to_string());
        formatter.detail("Outline items", &report.outline_items.to_string());
        formatter.detail("Warnings", &report.warnings.len().to_string());
    }
}

/// Serialize a report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn report_to_json(report: &BindReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| BinderError::other(format!("Failed to serialize report: {e}")))
}
