//! Scoped read access to input payloads.
//!
//! Every [`AccessHandle`] is issued by a [`HandleRegistry`] and released
//! when it is dropped, so early returns, cancellation and run failures all
//! release what they acquired. The registry keeps a live count that makes
//! leaks observable.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

use super::{InputFile, InputId};

/// Issues access handles and tracks how many are outstanding.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    live: Arc<AtomicUsize>,
}

impl HandleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a handle for reading `input`'s payload.
    pub fn open(&self, input: &InputFile) -> AccessHandle {
        let live = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(id = %input.id(), name = input.name(), live, "Access handle opened");

        AccessHandle {
            id: input.id(),
            data: input.shared_data(),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Read access to one input's bytes, released on drop.
#[derive(Debug)]
pub struct AccessHandle {
    id: InputId,
    data: Arc<[u8]>,
    live: Arc<AtomicUsize>,
}

impl AccessHandle {
    /// Id of the input this handle reads.
    pub fn id(&self) -> InputId {
        self.id
    }

    /// The payload.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Shared payload, for moving onto a blocking task.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

impl Drop for AccessHandle {
    fn drop(&mut self) {
        let remaining = self.live.fetch_sub(1, Ordering::AcqRel) - 1;
        trace!(id = %self.id, live = remaining, "Access handle released");
    }
}
