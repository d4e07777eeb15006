use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of the primary UI lock. At most one lock is active at a time;
/// re-locking overwrites the reason without stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    Locked {
        reason: String,
        since: DateTime<Utc>,
    },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }
}
