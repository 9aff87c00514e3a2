//! Input files and their lifecycle.
//!
//! An [`InputFile`] is one user-selected file: an opaque id, the payload,
//! a display name and the declared MIME type. The [`WorkingSet`] owns the
//! files of an editing session in their current order, and every file in it
//! holds an [`AccessHandle`] that is released exactly once when the file
//! leaves the set.

pub mod handle;
pub mod working_set;

pub use handle::{AccessHandle, HandleRegistry};
pub use working_set::WorkingSet;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StitchError};

/// MIME types that carry no information about the payload.
const GENERIC_MIME_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

/// MIME types treated as paginated documents.
const DOCUMENT_MIME_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// Image extensions accepted at the input boundary.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff", "ico", "svg",
];

/// Opaque identity of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputId(Uuid);

impl InputId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InputId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// How the converter treats an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// An existing PDF whose pages are copied as-is.
    Document,
    /// A raster or vector image rasterized onto a new page.
    Image,
}

impl MediaKind {
    /// Derive the kind from a declared MIME type and a file name.
    ///
    /// A PDF MIME type or a `.pdf` extension makes a document; anything
    /// else is an image.
    pub fn detect(mime: Option<&str>, name: &str) -> Self {
        let extension = extension_of(name);
        let is_pdf_extension = extension.as_deref() == Some("pdf");

        match normalize_mime(mime) {
            Some(mime) if DOCUMENT_MIME_TYPES.contains(&mime.as_str()) => Self::Document,
            Some(_) if is_pdf_extension => Self::Document,
            Some(_) => Self::Image,
            None if is_pdf_extension => Self::Document,
            None => Self::Image,
        }
    }

    /// Whether the kind is [`MediaKind::Document`].
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document)
    }
}

/// Lowercased, parameter-free MIME type, or `None` when absent or generic.
fn normalize_mime(mime: Option<&str>) -> Option<String> {
    let mime = mime?.split(';').next()?.trim().to_ascii_lowercase();
    if mime.is_empty() || GENERIC_MIME_TYPES.contains(&mime.as_str()) {
        None
    } else {
        Some(mime)
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether a path has an extension this crate knows how to convert.
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "pdf" || IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// A user-selected file held in memory for the session.
#[derive(Debug, Clone)]
pub struct InputFile {
    id: InputId,
    name: String,
    mime: Option<String>,
    data: Arc<[u8]>,
}

impl InputFile {
    /// Create an input from an in-memory payload.
    pub fn new(name: impl Into<String>, mime: Option<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: InputId::new(),
            name: name.into(),
            mime,
            data: data.into(),
        }
    }

    /// Read an input from disk. The MIME type is left undeclared so the
    /// extension decides the kind.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| StitchError::FailedToReadInput {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(name = %name, bytes = data.len(), "Read input from disk");

        Ok(Self::new(name, None, data))
    }

    /// Opaque identity.
    pub fn id(&self) -> InputId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type, if any.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Kind re-derived from the declared type and the name.
    pub fn media_kind(&self) -> MediaKind {
        MediaKind::detect(self.mime(), &self.name)
    }

    pub(crate) fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

/// Read every path, in order.
///
/// # Errors
///
/// Returns [`StitchError::FailedToReadInput`] for the first path that
/// cannot be read.
pub async fn load_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        inputs.push(InputFile::from_path(path).await?);
    }
    Ok(inputs)
}
