//! CLI argument parsing for pdfstitch.
//!
//! This module defines the command-line interface structure using `clap`
//! and turns parsed arguments into a library [`Config`].

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::finish::DEFAULT_OUTPUT_NAME;
use pdfstitch::quality::QualityTier;
use pdfstitch::utils::collect_paths_for_patterns;

/// Combine images and PDF files into a single PDF document.
///
/// Inputs are stitched in the order given. PDFs keep their pages as they
/// are, images are placed on A4 pages, and files that cannot be read as
/// either get a placeholder page naming them.
#[derive(Parser, Debug)]
#[command(name = "pdfstitch")]
#[command(version)]
#[command(about = "Combine images and PDF files into a single PDF document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input images and PDF files (in order)
    ///
    /// Glob patterns are expanded; matches of one pattern are sorted.
    ///
    /// Examples:
    ///   pdfstitch cover.png report.pdf -o bundle
    ///   pdfstitch 'scans/*.jpg' -q high
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Name of the output document
    ///
    /// ".pdf" is appended unless already present. A blank name falls back
    /// to "merged-document".
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_OUTPUT_NAME)]
    pub output: String,

    /// Directory to write the output document to
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Quality tier for images: low, medium or high
    ///
    /// Higher tiers rasterize images at a larger scale with less
    /// compression, producing sharper but larger documents.
    #[arg(short, long, value_name = "TIER", default_value = "medium", env = "PDFSTITCH_QUALITY")]
    #[arg(value_parser = ["low", "medium", "high"], ignore_case = true)]
    pub quality: String,

    /// Dry run - show the estimated size and the page plan without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - list every input and its outcome
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Read input paths from a file (one path per line)
    ///
    /// Use '-' to read from stdin. Lines starting with '#' are ignored.
    /// Paths from the list are appended after direct inputs.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Give up on an image after this many seconds and use a placeholder
    #[arg(long, value_name = "SECS")]
    pub decode_timeout: Option<f64>,

    /// Do not compress content streams in the output
    #[arg(long)]
    pub no_compress: bool,

    /// Print a machine-readable run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Validate CLI arguments before processing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The decode timeout is not a positive number or does not fit a duration
    /// - The output name contains a path separator
    pub fn validate(&self) -> Result<()> {
        self.decode_timeout()?;

        if self.output.contains(['/', '\\']) {
            return Err(StitchError::invalid_config(format!(
                "Output name must not contain a path: {}. Use --output-dir instead",
                self.output
            )));
        }

        Ok(())
    }

    /// Convert CLI arguments into a validated Config.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Resolved input paths, see [`Cli::get_all_inputs`]
    ///
    /// # Errors
    ///
    /// Returns an error if the quality tier is invalid or configuration
    /// validation fails.
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let quality: QualityTier = self.quality.parse()?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let config = Config {
            inputs,
            output_dir: self.output_dir.clone(),
            output_name: self.output.clone(),
            quality,
            overwrite_mode,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            decode_timeout: self.decode_timeout()?,
            compress: !self.no_compress,
        };

        config.validate().map_err(|e| {
            StitchError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// The decode timeout as a [`Duration`], if one was given.
    fn decode_timeout(&self) -> Result<Option<Duration>> {
        let Some(secs) = self.decode_timeout else {
            return Ok(None);
        };

        let invalid = || {
            StitchError::invalid_config(format!(
                "Invalid decode timeout: {secs}. Must be a positive number of seconds"
            ))
        };
        if !(secs.is_finite() && secs > 0.0) {
            return Err(invalid());
        }
        Duration::try_from_secs_f64(secs).map(Some).map_err(|_| invalid())
    }

    /// Get all input paths including those from the input-list file.
    ///
    /// Positional patterns are expanded first, list entries are appended
    /// after them. The result may be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid or the input list cannot be
    /// read.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = collect_paths_for_patterns(&self.inputs)?;

        if let Some(ref input_list_path) = self.input_list {
            all_inputs.extend(read_input_list(input_list_path).await?);
        }

        Ok(all_inputs)
    }
}

/// Read input paths from a file, or stdin when `path` is "-".
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source: std::io::Error| StitchError::FailedToReadInput {
        path: path.to_path_buf(),
        source,
    };

    let contents = if path.as_os_str() == "-" {
        use tokio::io::AsyncReadExt;

        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .map_err(read_error)?;
        buffer
    } else {
        tokio::fs::read_to_string(path).await.map_err(read_error)?
    };

    Ok(parse_input_list(&contents))
}

/// One path per line; blank lines and `#` comments are skipped.
fn parse_input_list(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect()
}
