//! CLI argument parsing for pdfbinder.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, merging with the configuration file, and help
//! text generation.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbinder::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Binding documents from {}", cli.config.display());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{CompressionLevel, Config, ConfigFile, Metadata, OverwriteMode};
use crate::error::Result;

/// Bind PDF files into one document with a clickable table of contents.
///
/// pdfbinder reads a JSON configuration whose schema lists sections and
/// source documents, concatenates the documents in schema order, and
/// renders a table of contents page whose rows link to each section.
#[derive(Parser, Debug)]
#[command(name = "pdfbinder")]
#[command(version)]
#[command(about = "Bind PDF files into one document with a table of contents", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// JSON configuration file describing the document
    ///
    /// The file holds the schema (sections and source documents) plus
    /// output settings. Relative paths inside it are resolved against
    /// the directory that contains it.
    ///
    /// Example:
    ///   pdfbinder dossier.json -o out/dossier.pdf
    #[arg(value_name = "CONFIG", env = "PDFBINDER_CONFIG")]
    pub config: PathBuf,

    /// Output PDF file path (overrides "output" in the configuration)
    ///
    /// Use --force to overwrite existing files without confirmation.
    #[arg(short, long, value_name = "FILE", env = "PDFBINDER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Directory holding the source documents (overrides "input_dir")
    #[arg(short, long, value_name = "DIR", env = "PDFBINDER_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Dry run - walk the schema and report without creating output
    ///
    /// Loads every source document, computes the page numbers the
    /// table of contents would show, and prints them without writing
    /// the output file.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show every inserted document and TOC entry
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    ///
    /// By default, pdfbinder will prompt before overwriting an existing file.
    /// Use this flag to skip the confirmation prompt.
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    ///
    /// If the output file already exists, exit with an error
    /// instead of prompting or overwriting.
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for output PDF (overrides "compression")
    ///
    /// - none: No compression (preserves exact structure)
    /// - standard: Compress content streams
    /// - maximum: Compress streams and drop unused objects (default)
    #[arg(short, long, value_name = "LEVEL", env = "PDFBINDER_COMPRESSION")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: Option<String>,

    /// Heading of the table of contents page
    #[arg(long, value_name = "TEXT")]
    pub heading: Option<String>,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Continue processing even if some PDFs fail to load
    ///
    /// By default, pdfbinder stops on the first document that cannot be
    /// loaded. With this flag, such documents are skipped with a warning.
    /// Missing files are always skipped with a warning.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Do not write the document outline (bookmarks)
    #[arg(long)]
    pub no_outline: bool,

    /// Print the bind report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Read the configuration file and apply the CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed,
    /// or if the combined configuration is invalid.
    pub async fn load_config(&self) -> Result<Config> {
        let file = ConfigFile::load(&self.config).await?;
        self.to_config(file)
    }

    /// Combine a parsed configuration file with the CLI arguments.
    ///
    /// CLI values win over values from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is invalid
    /// - Neither the file nor the CLI names an output path
    /// - Configuration validation fails
    pub fn to_config(&self, mut file: ConfigFile) -> Result<Config> {
        if let Some(ref output) = self.output {
            file.output = Some(output.clone());
        }

        let mut config = Config::from_file(file)?;

        if let Some(ref input_dir) = self.input_dir {
            config.input_dir = input_dir.clone();
        }

        if let Some(ref compression) = self.compression {
            config.compression = CompressionLevel::from_str(compression)?;
        }

        if let Some(ref heading) = self.heading {
            config.toc.heading = heading.clone();
        }

        // Determine overwrite mode
        config.overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let overrides = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );
        config.metadata = overrides.or(config.metadata);

        config.dry_run = self.dry_run;
        config.verbose = self.verbose;
        config.quiet = self.quiet;
        config.json = self.json;
        config.continue_on_error |= self.continue_on_error;
        if self.no_outline {
            config.toc.outline = false;
        }

        config.validate()?;

        Ok(config)
    }
}
