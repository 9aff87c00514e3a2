//! Serializing and delivering the merged document.
//!
//! [`finish`] turns an [`OutputDocument`] into bytes plus a final filename.
//! A [`Delivery`] hands that pair to wherever it should end up;
//! [`FileDelivery`] writes it into a directory.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::config::OverwriteMode;
//! use pdfstitch::finish::{Delivery, FileDelivery, finish};
//! use pdfstitch::merge::OutputDocument;
//!
//! # async fn example(document: OutputDocument) -> pdfstitch::Result<()> {
//! let finished = finish(document, "scans", true).await?;
//! let delivery = FileDelivery::new("out", OverwriteMode::Force);
//! let delivered = delivery.deliver(finished).await?;
//! println!("wrote {}", delivered.location.display());
//! # Ok(())
//! # }
//! ```

use lopdf::{Object, dictionary};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::OverwriteMode;
use crate::error::{Result, StitchError};
use crate::merge::OutputDocument;

/// Name used when the requested one is blank.
pub const DEFAULT_OUTPUT_NAME: &str = "merged-document";

/// Extension of the output format, including the dot.
pub const PDF_EXTENSION: &str = ".pdf";

/// Derive the final output filename from a user-supplied name.
///
/// Trims surrounding whitespace, falls back to [`DEFAULT_OUTPUT_NAME`] when
/// nothing is left, and appends `.pdf` unless the name already ends with it
/// in any letter case.
///
/// ```
/// use pdfstitch::finish::output_filename;
///
/// assert_eq!(output_filename("  report "), "report.pdf");
/// assert_eq!(output_filename("Report.PDF"), "Report.PDF");
/// assert_eq!(output_filename("   "), "merged-document.pdf");
/// ```
pub fn output_filename(requested: &str) -> String {
    let trimmed = requested.trim();
    let base = if trimmed.is_empty() {
        DEFAULT_OUTPUT_NAME
    } else {
        trimmed
    };

    if base.to_ascii_lowercase().ends_with(PDF_EXTENSION) {
        base.to_string()
    } else {
        format!("{base}{PDF_EXTENSION}")
    }
}

/// A serialized document and the name it should be delivered under.
#[derive(Debug, Clone)]
pub struct FinishedDocument {
    /// Encoded PDF bytes.
    pub bytes: Vec<u8>,
    /// Final filename, see [`output_filename`].
    pub filename: String,
}

/// Serialize `document` under a name derived from `requested_name`.
///
/// With `compress` set, content streams are deflated. Unreferenced objects
/// left over from copied documents are dropped either way.
///
/// # Errors
///
/// Returns [`StitchError::Serialize`] if the document cannot be encoded.
#[instrument(skip(document), fields(pages = document.page_count()))]
pub async fn finish(
    document: OutputDocument,
    requested_name: &str,
    compress: bool,
) -> Result<FinishedDocument> {
    let filename = output_filename(requested_name);
    let mut document = document.into_document();

    let bytes = tokio::task::spawn_blocking(move || {
        let producer = format!("{} {}", crate::NAME, crate::VERSION);
        let info_id = document.add_object(dictionary! {
            "Producer" => Object::string_literal(producer),
        });
        document.trailer.set("Info", info_id);

        if compress {
            document.compress();
        }
        let pruned = document.prune_objects();
        document.renumber_objects();
        debug!(pruned = pruned.len(), compress, "Document prepared for writing");

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).map_err(StitchError::serialize)?;
        Ok::<_, StitchError>(bytes)
    })
    .await
    .map_err(|e| StitchError::serialize(format!("Serialize task failed: {e}")))??;

    info!(filename = %filename, bytes = bytes.len(), "Document serialized");
    Ok(FinishedDocument { bytes, filename })
}

/// Where a delivered document ended up.
#[derive(Debug, Clone)]
pub struct Delivered {
    /// Location of the delivered document.
    pub location: PathBuf,
    /// Bytes delivered.
    pub size: u64,
    /// Time taken.
    pub elapsed: Duration,
}

/// Hands a finished document to its destination.
#[allow(async_fn_in_trait)]
pub trait Delivery {
    /// Deliver `document`.
    ///
    /// # Errors
    ///
    /// Implementations return a run failure when the document could not
    /// be delivered.
    async fn deliver(&self, document: FinishedDocument) -> Result<Delivered>;
}

/// Writes finished documents into a directory.
///
/// Writes go to a temporary file in the target directory that is renamed
/// over the final path once complete, so a failed write never leaves a
/// truncated document behind. [`OverwriteMode::NoClobber`] refuses to
/// replace an existing file, including one created while the document was
/// being written; the other modes replace it (prompting is the caller's
/// job).
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
    overwrite_mode: OverwriteMode,
}

impl FileDelivery {
    /// Deliver into `dir`.
    pub fn new(dir: impl Into<PathBuf>, overwrite_mode: OverwriteMode) -> Self {
        Self {
            dir: dir.into(),
            overwrite_mode,
        }
    }

    /// Path a document named `filename` would be written to.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp_path = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));

        if let Err(source) = tokio::fs::write(&tmp_path, bytes).await {
            return Err(StitchError::Delivery {
                path: tmp_path,
                source,
            });
        }

        let placed = if self.overwrite_mode == OverwriteMode::NoClobber {
            // Linking fails if the target appeared after the existence check.
            let linked = tokio::fs::hard_link(&tmp_path, path).await;
            let _ = tokio::fs::remove_file(&tmp_path).await;
            linked
        } else {
            tokio::fs::rename(&tmp_path, path).await
        };

        match placed {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::AlreadyExists => {
                Err(StitchError::OutputExists {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                let _ = tokio::fs::remove_file(&tmp_path).await;
                Err(StitchError::Delivery {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

impl Delivery for FileDelivery {
    #[instrument(skip(self, document), fields(filename = %document.filename))]
    async fn deliver(&self, document: FinishedDocument) -> Result<Delivered> {
        let start = Instant::now();
        let path = self.path_for(&document.filename);

        if self.overwrite_mode == OverwriteMode::NoClobber
            && tokio::fs::try_exists(&path).await.unwrap_or(false)
        {
            return Err(StitchError::OutputExists { path });
        }

        self.write_atomic(&path, &document.bytes).await?;

        let delivered = Delivered {
            location: path,
            size: document.bytes.len() as u64,
            elapsed: start.elapsed(),
        };
        info!(path = %delivered.location.display(), size = delivered.size, "Document written");
        Ok(delivered)
    }
}
