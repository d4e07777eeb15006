use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Opaque correlation id for one delegated browsing context.
///
/// The id travels with every coordination message so that stale or foreign
/// signals (a heartbeat from a previous session, a broadcast from another
/// tab) can be recognized and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(String);

impl_id!(TabId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_ids_are_unique() {
        let a = TabId::new();
        let b = TabId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tab_id_from_str() {
        let id: TabId = "tab-1234".into();
        assert_eq!(id.as_str(), "tab-1234");
    }
}
