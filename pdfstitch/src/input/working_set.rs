//! The ordered set of files a user is preparing to merge.

use tracing::debug;

use super::{AccessHandle, HandleRegistry, InputFile, InputId};

struct Entry {
    input: InputFile,
    _handle: AccessHandle,
}

/// Files selected for a merge, in merge order.
///
/// Each file holds an access handle for as long as it is in the set.
/// Removing a file, clearing the set or dropping it releases the handles.
pub struct WorkingSet {
    registry: HandleRegistry,
    entries: Vec<Entry>,
}

impl WorkingSet {
    /// Create an empty set with its own registry.
    pub fn new() -> Self {
        Self::with_registry(HandleRegistry::new())
    }

    /// Create an empty set issuing handles from `registry`.
    pub fn with_registry(registry: HandleRegistry) -> Self {
        Self {
            registry,
            entries: Vec::new(),
        }
    }

    /// Registry the set issues handles from.
    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Append a file to the end of the set.
    pub fn add(&mut self, input: InputFile) -> InputId {
        let id = input.id();
        let handle = self.registry.open(&input);
        debug!(id = %id, name = input.name(), "Added input to working set");
        self.entries.push(Entry {
            input,
            _handle: handle,
        });
        id
    }

    /// Append several files, keeping their order.
    pub fn extend(&mut self, inputs: impl IntoIterator<Item = InputFile>) {
        for input in inputs {
            self.add(input);
        }
    }

    /// Remove a file, releasing its handle. Returns the file if it was present.
    pub fn remove(&mut self, id: InputId) -> Option<InputFile> {
        let index = self.position(id)?;
        let entry = self.entries.remove(index);
        debug!(id = %id, name = entry.input.name(), "Removed input from working set");
        Some(entry.input)
    }

    /// Move the file with `id` to position `to`, shifting the others.
    ///
    /// `to` is clamped to the last position. Returns false if `id` is unknown.
    pub fn move_to(&mut self, id: InputId, to: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let to = to.min(self.entries.len() - 1);
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    /// Remove every file, releasing all handles.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of files in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files in merge order.
    pub fn inputs(&self) -> impl Iterator<Item = &InputFile> {
        self.entries.iter().map(|e| &e.input)
    }

    /// Owned copy of the files in merge order. Payloads are shared, not copied.
    pub fn snapshot(&self) -> Vec<InputFile> {
        self.inputs().cloned().collect()
    }

    fn position(&self, id: InputId) -> Option<usize> {
        self.entries.iter().position(|e| e.input.id() == id)
    }
}

impl Default for WorkingSet {
    fn default() -> Self {
        Self::new()
    }
}
