//! Document domain model: uploaded artifacts, content hashing, cache
//! validation errors and usage statistics.

pub mod error;
pub mod hash;
pub mod kind;
pub mod mime;
pub mod model;
pub mod stats;
pub mod upload;

pub use error::CacheError;
pub use hash::{ContentHash, HashAlgorithm};
pub use kind::DocumentKind;
pub use mime::MimeType;
pub use model::Document;
pub use stats::CacheStats;
pub use upload::FileUpload;
