use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{ContentHash, DocumentKind, MimeType};
use crate::ids::{DocumentId, HandleId};

/// One uploaded artifact, as persisted in the owner's namespace.
///
/// `inline_handle` is only valid within the process that created it; after a
/// reload the metadata survives but the handle resolves to nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub mime_type: MimeType,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub kind: DocumentKind,
    pub content_hash: ContentHash,
    #[serde(default)]
    pub inline_handle: Option<HandleId>,
    /// Whether content was transformed before storage. Always false for the
    /// supported formats; anticipates future codecs.
    #[serde(default)]
    pub compressed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document {
            id: DocumentId::generate(1_700_000_000_000),
            name: "cedula.pdf".to_string(),
            mime_type: MimeType::application_pdf(),
            size: 1024,
            uploaded_at: Utc::now(),
            kind: DocumentKind::IdentityCard,
            content_hash: ContentHash::compute(b"cedula"),
            inline_handle: None,
            compressed: false,
        }
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let doc = sample();
        let mut value = serde_json::to_value(&doc).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("inline_handle");
        obj.remove("compressed");
        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back.inline_handle, None);
        assert!(!back.compressed);
    }
}
