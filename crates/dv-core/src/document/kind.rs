use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an uploaded document.
///
/// Persisted as its small-integer id. Per owner namespace at most one
/// Document exists per kind; uploading the same kind again replaces the
/// previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DocumentKind {
    IdentityCard,
    PowerOfAttorney,
    ProbateCertificate,
}

impl DocumentKind {
    pub fn type_id(self) -> u8 {
        match self {
            DocumentKind::IdentityCard => 1,
            DocumentKind::PowerOfAttorney => 2,
            DocumentKind::ProbateCertificate => 3,
        }
    }

    /// Human-readable label used in user-facing failure messages.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::IdentityCard => "identity card",
            DocumentKind::PowerOfAttorney => "power of attorney",
            DocumentKind::ProbateCertificate => "probate certificate",
        }
    }
}

impl From<DocumentKind> for u8 {
    fn from(kind: DocumentKind) -> Self {
        kind.type_id()
    }
}

impl TryFrom<u8> for DocumentKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DocumentKind::IdentityCard),
            2 => Ok(DocumentKind::PowerOfAttorney),
            3 => Ok(DocumentKind::ProbateCertificate),
            other => Err(format!("unknown document type id: {}", other)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
