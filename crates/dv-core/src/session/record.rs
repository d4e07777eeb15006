use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TabId;

/// Lifecycle of one delegated browsing context.
///
/// `Opened → Alive → Closed | Unreachable | TimedOut`. Reaching a terminal
/// phase always releases any UI lock associated with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Opened,
    Alive,
    Closed,
    Unreachable,
    TimedOut,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::Closed | SessionPhase::Unreachable | SessionPhase::TimedOut
        )
    }
}

/// Tracks one delegated browsing context for the duration of its life.
///
/// Destroyed the moment a terminal phase is detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSessionRecord {
    pub tab_id: TabId,
    pub url: String,
    pub opened_at: DateTime<Utc>,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
}

impl ExternalSessionRecord {
    pub fn new(tab_id: TabId, url: impl Into<String>, opened_at: DateTime<Utc>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            opened_at,
            last_heartbeat_at: None,
        }
    }
}
