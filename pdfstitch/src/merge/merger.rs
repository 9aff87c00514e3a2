//! Core merge loop.
//!
//! Inputs are converted one at a time, in list order. Each input either
//! contributes its own pages or, when it cannot be processed, a single
//! placeholder page. A bad input never aborts the run.

use lopdf::Document;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelFlag;
use crate::error::{Result, StitchError};
use crate::input::{AccessHandle, HandleRegistry, InputFile, InputId, MediaKind};
use crate::merge::document::OutputDocument;
use crate::progress::{ProgressReporter, ProgressSink};
use crate::quality::{QualityTier, resolve};
use crate::raster::{Rasterizer, run_bounded};

/// What happened to one input.
#[derive(Debug)]
pub enum InputOutcome {
    /// The input contributed `pages` pages of its own.
    Converted {
        /// Input identity.
        id: InputId,
        /// Display name.
        name: String,
        /// Pages appended.
        pages: usize,
    },
    /// The input failed and a placeholder page was appended instead.
    Recovered {
        /// Input identity.
        id: InputId,
        /// Display name.
        name: String,
        /// Why conversion failed.
        error: StitchError,
    },
}

impl InputOutcome {
    /// Input identity.
    pub fn id(&self) -> InputId {
        match self {
            Self::Converted { id, .. } | Self::Recovered { id, .. } => *id,
        }
    }

    /// Display name of the input.
    pub fn name(&self) -> &str {
        match self {
            Self::Converted { name, .. } | Self::Recovered { name, .. } => name,
        }
    }

    /// Pages this input occupies in the output.
    pub fn pages(&self) -> usize {
        match self {
            Self::Converted { pages, .. } => *pages,
            Self::Recovered { .. } => 1,
        }
    }

    /// Whether a placeholder stands in for this input.
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

/// Statistics about a merge run.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of inputs processed.
    pub inputs: usize,

    /// Total number of pages in the output.
    pub total_pages: usize,

    /// Inputs replaced by a placeholder page.
    pub recovered: usize,

    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Result of a merge run.
pub struct MergeResult {
    /// The assembled document, not yet serialized.
    pub document: OutputDocument,

    /// One outcome per input, in input order.
    pub outcomes: Vec<InputOutcome>,

    /// Statistics about the run.
    pub statistics: MergeStatistics,
}

/// Converts an ordered list of inputs into one document.
#[derive(Debug, Clone)]
pub struct Merger {
    rasterizer: Rasterizer,
    registry: HandleRegistry,
    decode_timeout: Option<Duration>,
}

impl Merger {
    /// Create a merger for the given quality tier.
    pub fn new(tier: QualityTier) -> Self {
        Self {
            rasterizer: Rasterizer::new(resolve(tier)),
            registry: HandleRegistry::new(),
            decode_timeout: None,
        }
    }

    /// Bound the time spent decoding one input, image or document.
    ///
    /// See [`Rasterizer::with_timeout`]: work that overruns is abandoned,
    /// not interrupted.
    pub fn with_decode_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.rasterizer = self.rasterizer.with_timeout(timeout);
        self.decode_timeout = timeout;
        self
    }

    /// Open access handles through `registry` instead of a private one.
    pub fn with_registry(mut self, registry: HandleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registry access handles are opened through.
    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Merge `inputs` in order.
    ///
    /// Emits one progress value per input after it has been processed.
    /// Returns `Ok(None)` without emitting anything when `inputs` is empty.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Files to merge, in output order
    /// * `progress` - Receives percent-complete after each input
    /// * `cancel` - Checked before each input starts
    ///
    /// # Errors
    ///
    /// Per-input failures never surface here. Returns an error only if:
    /// - The run is cancelled ([`StitchError::Cancelled`])
    /// - A placeholder page cannot be built
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::{CancelFlag, InputFile, Merger, QualityTier, progress::NoProgress};
    /// # async fn example(inputs: Vec<InputFile>) -> pdfstitch::Result<()> {
    /// let merger = Merger::new(QualityTier::Medium);
    /// if let Some(result) = merger.merge(&inputs, &mut NoProgress, &CancelFlag::new()).await? {
    ///     println!("{} pages", result.statistics.total_pages);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(inputs = inputs.len()))]
    pub async fn merge(
        &self,
        inputs: &[InputFile],
        progress: &mut dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<Option<MergeResult>> {
        if inputs.is_empty() {
            debug!("No inputs, nothing to merge");
            return Ok(None);
        }

        let start = Instant::now();
        let mut document = OutputDocument::new();
        let mut outcomes = Vec::with_capacity(inputs.len());
        let mut reporter = ProgressReporter::new(inputs.len(), progress);

        for input in inputs {
            cancel.check()?;

            let outcome = self.convert(&mut document, input).await?;
            outcomes.push(outcome);

            reporter.advance().await;
        }

        let recovered = outcomes.iter().filter(|o| o.is_recovered()).count();
        let statistics = MergeStatistics {
            inputs: inputs.len(),
            total_pages: document.page_count(),
            recovered,
            elapsed: start.elapsed(),
        };

        info!(
            inputs = statistics.inputs,
            pages = statistics.total_pages,
            recovered,
            "Merge complete"
        );

        Ok(Some(MergeResult {
            document,
            outcomes,
            statistics,
        }))
    }

    /// Convert one input, substituting a placeholder on failure.
    async fn convert(&self, document: &mut OutputDocument, input: &InputFile) -> Result<InputOutcome> {
        let name = input.name();
        let handle = self.registry.open(input);

        let converted = match input.media_kind() {
            MediaKind::Document => match load_document(name, &handle, self.decode_timeout).await {
                Ok(source) => document.append_document(name, source),
                Err(e) => Err(e),
            },
            MediaKind::Image => match self.rasterizer.rasterize(name, &handle).await {
                Ok(raster) => document.append_image_page(&raster).map(|_| 1),
                Err(e) => Err(e),
            },
        };
        drop(handle);

        match converted {
            Ok(pages) => {
                debug!(name, pages, "Input converted");
                Ok(InputOutcome::Converted {
                    id: input.id(),
                    name: name.to_string(),
                    pages,
                })
            }
            Err(error) => {
                warn!(name, %error, "Input failed, inserting placeholder page");
                document.append_placeholder_page(name)?;
                Ok(InputOutcome::Recovered {
                    id: input.id(),
                    name: name.to_string(),
                    error,
                })
            }
        }
    }
}

/// Parse a PDF input on the blocking pool.
#[instrument(skip(handle, timeout), fields(bytes_len = handle.bytes().len()))]
async fn load_document(
    name: &str,
    handle: &AccessHandle,
    timeout: Option<Duration>,
) -> Result<Document> {
    let bytes = handle.shared_bytes();
    let task_name = name.to_string();

    run_bounded(name, timeout, move || {
        Document::load_mem(&bytes).map_err(|e| StitchError::document_parse(&task_name, e))
    })
    .await?
    .map_err(|e| StitchError::document_parse(name, format!("parser task failed: {e}")))?
}
