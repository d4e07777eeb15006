use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TabId;

/// Durable side-channel record of the currently active external session.
///
/// Survives reloads so a late subscriber that missed the broadcast can still
/// recover the coordination state. `confirmed` flips to true once the opened
/// context has reported back over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSessionRecord {
    pub tab_id: TabId,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub confirmed: bool,
}

impl ActiveSessionRecord {
    pub fn pending(tab_id: TabId, url: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            timestamp,
            confirmed: false,
        }
    }

    pub fn confirm(mut self) -> Self {
        self.confirmed = true;
        self
    }
}
