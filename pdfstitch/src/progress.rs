//! Progress reporting for merge runs.
//!
//! The merger reports one percentage per processed input through a
//! [`ProgressSink`]. Closures and tokio channels both work as sinks:
//!
//! ```
//! use pdfstitch::progress::{ProgressReporter, ProgressSink};
//!
//! # async fn example() {
//! let mut seen = Vec::new();
//! let mut sink = |percent: u8| seen.push(percent);
//! let mut reporter = ProgressReporter::new(3, &mut sink);
//! reporter.advance().await;
//! reporter.advance().await;
//! reporter.advance().await;
//! assert_eq!(seen, vec![33, 67, 100]);
//! # }
//! ```

use tokio::sync::{mpsc, watch};
use tracing::trace;

/// Receives percent-complete values in `0..=100`.
pub trait ProgressSink {
    /// Called once per processed input with the new percentage.
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

impl ProgressSink for mpsc::UnboundedSender<u8> {
    fn report(&mut self, percent: u8) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(percent);
    }
}

impl ProgressSink for watch::Sender<u8> {
    fn report(&mut self, percent: u8) {
        self.send_replace(percent);
    }
}

/// Sink that discards every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8) {}
}

/// `round(100 * processed / total)`, with halves rounded up.
///
/// Returns 0 when `total` is 0.
pub fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let processed = processed.min(total) as u64;
    let total = total as u64;
    ((processed * 200 + total) / (total * 2)) as u8
}

/// Tracks processed inputs and emits one signal per input.
pub struct ProgressReporter<'a> {
    processed: usize,
    total: usize,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> ProgressReporter<'a> {
    /// Create a reporter for a run over `total` inputs.
    pub fn new(total: usize, sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            processed: 0,
            total,
            sink,
        }
    }

    /// Mark one more input as processed, emit the new percentage and yield
    /// so a host observing the signal gets a chance to repaint before the
    /// next input starts.
    pub async fn advance(&mut self) {
        if self.processed >= self.total {
            return;
        }
        self.processed += 1;
        let value = percent(self.processed, self.total);
        trace!(processed = self.processed, total = self.total, percent = value, "Progress");
        self.sink.report(value);
        tokio::task::yield_now().await;
    }

    /// Inputs processed so far.
    pub fn processed(&self) -> usize {
        self.processed
    }
}
