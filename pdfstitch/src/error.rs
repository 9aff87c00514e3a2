//! Error types for pdfstitch.
//!
//! Errors fall into two groups:
//!
//! - **Per-input errors** ([`StitchError::AssetDecode`], [`StitchError::DocumentParse`],
//!   [`StitchError::DecodeTimeout`]) are recovered by the merger: the failed
//!   input is replaced with a placeholder page and the run continues.
//! - **Run failures** (everything else) abort the whole run and produce no
//!   output. Callers should show [`StitchError::user_message`] to end users.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;

/// Message shown to end users when a run fails as a whole.
pub const RUN_FAILURE_MESSAGE: &str = "Could not create the merged document. Please try again.";

/// Main error type for pdfstitch operations.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// An image input could not be decoded.
    #[error("Failed to decode image: {name}\n  Reason: {reason}")]
    AssetDecode {
        /// Display name of the input.
        name: String,
        /// Reason reported by the decoder.
        reason: String,
    },

    /// Decoding an image input took longer than the configured bound.
    #[error("Timed out decoding image: {name} (limit {}s)", .timeout.as_secs_f64())]
    DecodeTimeout {
        /// Display name of the input.
        name: String,
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// A document input could not be parsed or had no pages.
    #[error("Failed to parse PDF: {name}\n  Reason: {reason}")]
    DocumentParse {
        /// Display name of the input.
        name: String,
        /// Reason reported by the parser.
        reason: String,
    },

    /// The merged document could not be serialized.
    #[error("Failed to serialize merged document: {reason}")]
    Serialize {
        /// Details about the failure.
        reason: String,
    },

    /// The finished document could not be delivered.
    #[error("Failed to write output file: {}\n  Reason: {source}", .path.display())]
    Delivery {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output name",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// An input file could not be read from disk.
    #[error("Cannot read input file: {}\n  Reason: {source}", .path.display())]
    FailedToReadInput {
        /// Path to the input.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The run was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<lopdf::Error> for StitchError {
    fn from(err: lopdf::Error) -> Self {
        Self::Serialize {
            reason: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for StitchError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl StitchError {
    /// Create an AssetDecode error.
    pub fn asset_decode(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::AssetDecode {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a DocumentParse error.
    pub fn document_parse(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::DocumentParse {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a Serialize error.
    pub fn serialize(reason: impl ToString) -> Self {
        Self::Serialize {
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether the merger recovers from this error with a placeholder page.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AssetDecode { .. } | Self::DocumentParse { .. } | Self::DecodeTimeout { .. }
        )
    }

    /// Whether this error aborts the whole run.
    pub fn is_run_failure(&self) -> bool {
        !self.is_recoverable()
    }

    /// Message suitable for end users.
    ///
    /// Run failures collapse to a generic message; per-input errors keep
    /// their detail since they only ever show up next to a placeholder.
    pub fn user_message(&self) -> String {
        if self.is_run_failure() {
            RUN_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AssetDecode { .. } | Self::DecodeTimeout { .. } => 3,
            Self::DocumentParse { .. } => 3,
            Self::FailedToReadInput { .. } => 2,
            Self::OutputExists { .. } => 4,
            Self::Delivery { .. } | Self::Io { .. } => 5,
            Self::Serialize { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
        }
    }
}
