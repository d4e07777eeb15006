use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use dv_core::ids::HandleId;

/// Process-local registry backing inline content handles.
///
/// A handle keeps its bytes resident until explicitly released; an entry that
/// is never released stays for the life of the process. The Document Cache
/// releases handles when a document is evicted, replaced, or removed.
#[derive(Default)]
pub struct InlineHandleRegistry {
    entries: Mutex<HashMap<HandleId, Bytes>>,
}

impl InlineHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Bytes) -> HandleId {
        let id = HandleId::new();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(id.clone(), bytes);
        }
        id
    }

    pub fn resolve(&self, id: &HandleId) -> Option<Bytes> {
        self.entries.lock().ok()?.get(id).cloned()
    }

    /// Returns whether the handle was present. Releasing twice is a no-op.
    pub fn release(&self, id: &HandleId) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => entries.remove(id).is_some(),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
