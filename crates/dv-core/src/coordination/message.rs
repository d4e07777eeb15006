use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TabId;

/// Lifecycle events exchanged between execution contexts over the broadcast
/// channel.
///
/// Delivery is fire-and-forget and unordered; every handler must tolerate
/// duplicates. `TabClosed` and `UnlockRequest` deliberately produce the same
/// externally observable effect (unlock), to tolerate ambiguity about which
/// context detected the closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinationMessage {
    TabOpened {
        tab_id: TabId,
        url: String,
        timestamp: DateTime<Utc>,
    },
    TabClosed {
        tab_id: TabId,
        timestamp: DateTime<Utc>,
    },
    Heartbeat {
        tab_id: TabId,
        timestamp: DateTime<Utc>,
    },
    UnlockRequest {
        tab_id: TabId,
        timestamp: DateTime<Utc>,
    },
}

impl CoordinationMessage {
    pub fn tab_id(&self) -> &TabId {
        match self {
            CoordinationMessage::TabOpened { tab_id, .. }
            | CoordinationMessage::TabClosed { tab_id, .. }
            | CoordinationMessage::Heartbeat { tab_id, .. }
            | CoordinationMessage::UnlockRequest { tab_id, .. } => tab_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CoordinationMessage::TabOpened { timestamp, .. }
            | CoordinationMessage::TabClosed { timestamp, .. }
            | CoordinationMessage::Heartbeat { timestamp, .. }
            | CoordinationMessage::UnlockRequest { timestamp, .. } => *timestamp,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
