use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Ephemeral, process-local reference to inline file content.
///
/// A handle is only meaningful against the registry of the process that
/// created it; a handle read back from the durable store after a reload
/// resolves to nothing. Handles must be explicitly released when the owning
/// Document is evicted or replaced, otherwise the referenced bytes stay
/// resident for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(String);

impl_id!(HandleId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ids_are_unique() {
        assert_ne!(HandleId::new(), HandleId::new());
    }
}
