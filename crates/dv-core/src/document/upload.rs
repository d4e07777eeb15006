use bytes::Bytes;

use crate::document::MimeType;

/// A user-selected file, prior to validation and persistence.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: MimeType,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: MimeType, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
