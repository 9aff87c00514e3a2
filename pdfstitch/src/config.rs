//! Run configuration.
//!
//! A [`Config`] describes one stitch run: which files, in which order, at
//! which quality, and where the result goes. Front ends build one and call
//! [`Config::validate`] before starting.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::finish::{DEFAULT_OUTPUT_NAME, output_filename};
use crate::quality::QualityTier;

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a stitch run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, in output order.
    pub inputs: Vec<PathBuf>,

    /// Directory the output is written to.
    pub output_dir: PathBuf,

    /// Requested output name, finished by [`output_filename`].
    pub output_name: String,

    /// Quality tier for rasterized images.
    pub quality: QualityTier,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Estimate and list the plan without producing output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Upper bound on rasterizing one image.
    pub decode_timeout: Option<Duration>,

    /// Deflate content streams in the output.
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: PathBuf::from("."),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            quality: QualityTier::default(),
            overwrite_mode: OverwriteMode::default(),
            dry_run: false,
            verbose: false,
            quiet: false,
            decode_timeout: None,
            compress: true,
        }
    }
}

impl Config {
    /// Final output filename.
    pub fn output_filename(&self) -> String {
        output_filename(&self.output_name)
    }

    /// Full path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_filename())
    }

    /// Validate the configuration.
    ///
    /// An empty input list is valid; the run simply produces nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - The decode timeout is zero
    /// - The output path is one of the inputs
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.decode_timeout == Some(Duration::ZERO) {
            bail!("Decode timeout must be greater than zero");
        }

        let output = self.output_path();
        for input in &self.inputs {
            if input == &output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    output.display()
                );
            }
        }

        Ok(())
    }
}
