//! Document assembly.
//!
//! - [`merger`]: the per-input conversion loop
//! - [`document`]: the page tree being built
//! - [`placement`]: fitting images onto the reference page

pub mod document;
pub mod merger;
pub mod placement;

pub use document::OutputDocument;
pub use merger::{InputOutcome, MergeResult, MergeStatistics, Merger};
pub use placement::{A4_HEIGHT, A4_WIDTH, Placement, fit_and_center};

use crate::cancel::CancelFlag;
use crate::error::Result;
use crate::finish::{FinishedDocument, finish};
use crate::input::InputFile;
use crate::progress::ProgressSink;
use crate::quality::QualityTier;

/// Merge `inputs` at `tier` and serialize the result under a name derived
/// from `requested_name`.
///
/// Returns `Ok(None)` for an empty input list.
///
/// # Errors
///
/// Returns a run failure if the merged document cannot be serialized.
/// Individual bad inputs are replaced with placeholder pages instead.
///
/// # Examples
///
/// ```no_run
/// use pdfstitch::{InputFile, QualityTier, merge::stitch};
///
/// # async fn example(inputs: Vec<InputFile>) -> pdfstitch::Result<()> {
/// let mut progress = |percent: u8| println!("{percent}%");
/// if let Some(finished) = stitch(&inputs, QualityTier::High, "album", &mut progress).await? {
///     std::fs::write(&finished.filename, &finished.bytes)?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn stitch(
    inputs: &[InputFile],
    tier: QualityTier,
    requested_name: &str,
    progress: &mut dyn ProgressSink,
) -> Result<Option<FinishedDocument>> {
    let merger = Merger::new(tier);
    let Some(result) = merger.merge(inputs, progress, &CancelFlag::new()).await? else {
        return Ok(None);
    };
    finish(result.document, requested_name, true).await.map(Some)
}
