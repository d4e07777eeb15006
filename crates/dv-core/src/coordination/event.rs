use crate::ids::TabId;

/// In-process notification emitted by the Coordination Bus after handling a
/// broadcast message. Never leaves the process.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    Opened { tab_id: TabId, url: String },
    Closed { tab_id: TabId },
    UnlockRequested { tab_id: TabId },
}

impl SessionNotice {
    /// Whether consumers holding a UI lock for this session should release it.
    pub fn releases_lock(&self) -> bool {
        matches!(
            self,
            SessionNotice::Closed { .. } | SessionNotice::UnlockRequested { .. }
        )
    }
}
