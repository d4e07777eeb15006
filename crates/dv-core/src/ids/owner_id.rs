use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Normalized owner identity number.
///
/// Storage namespaces are partitioned by this key. Normalization strips every
/// non-alphanumeric character and uppercases the verifier digit, so
/// `"11.222.333-k"` and `"11222333-K"` address the same namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn normalize(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
