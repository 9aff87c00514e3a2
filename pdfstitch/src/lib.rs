//! pdfstitch - Combine images and PDF files into a single PDF document.
//!
//! Given an ordered list of inputs, pdfstitch produces one document whose
//! pages follow the input order:
//!
//! - PDF inputs contribute all of their pages at their own size
//! - Image inputs are rasterized at the chosen [`QualityTier`] and centered
//!   on an A4 page
//! - Inputs that cannot be processed are replaced with a placeholder page
//!   naming the file, and the run carries on
//!
//! # Examples
//!
//! ## One-shot
//!
//! ```no_run
//! use pdfstitch::{InputFile, QualityTier, merge::stitch};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = vec![
//!     InputFile::from_path(Path::new("cover.png")).await?,
//!     InputFile::from_path(Path::new("report.pdf")).await?,
//! ];
//!
//! let mut progress = |percent: u8| eprintln!("{percent}%");
//! if let Some(finished) = stitch(&inputs, QualityTier::Medium, "bundle", &mut progress).await? {
//!     std::fs::write(&finished.filename, &finished.bytes)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdfstitch::config::OverwriteMode;
//! use pdfstitch::finish::{Delivery, FileDelivery, finish};
//! use pdfstitch::progress::NoProgress;
//! use pdfstitch::{CancelFlag, Merger, QualityTier, WorkingSet, load_inputs};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut set = WorkingSet::new();
//! set.extend(load_inputs(&[PathBuf::from("a.jpg"), PathBuf::from("b.pdf")]).await?);
//!
//! let merger = Merger::new(QualityTier::High);
//! let cancel = CancelFlag::new();
//! if let Some(result) = merger.merge(&set.snapshot(), &mut NoProgress, &cancel).await? {
//!     let finished = finish(result.document, "scans", true).await?;
//!     FileDelivery::new(".", OverwriteMode::Force).deliver(finished).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod estimate;
pub mod finish;
pub mod input;
pub mod merge;
pub mod progress;
pub mod quality;
pub mod raster;
pub mod utils;

// Re-export commonly used types
pub use cancel::CancelFlag;
pub use config::{Config, OverwriteMode};
pub use error::{Result, StitchError};
pub use estimate::estimate_output_size;
pub use finish::{FinishedDocument, output_filename};
pub use input::{InputFile, InputId, MediaKind, WorkingSet, load_inputs};
pub use merge::{MergeResult, Merger};
pub use quality::{QualitySettings, QualityTier};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
