use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Document identifier derived from creation time.
///
/// Format: `"{epoch_ms}-{seq}"`. The sequence counter breaks ties between
/// documents created within the same millisecond, keeping ids monotonic
/// within one process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl DocumentId {
    pub fn generate(now_ms: i64) -> Self {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}-{}", now_ms, seq))
    }

    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
