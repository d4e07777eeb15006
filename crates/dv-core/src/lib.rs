//! # dv-core
//!
//! Core domain models and business logic for DocVault.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: the Document model, session records and liveness
//! evaluation, coordination messages, the lock state machine, retry
//! policies, configuration, and the ports adapters implement.

pub mod config;
pub mod coordination;
pub mod document;
pub mod ids;
pub mod lock;
pub mod ports;
pub mod retry;
pub mod session;

// Re-export commonly used types at the crate root
pub use config::{CacheConfig, CoordinationConfig, EngineConfig};
pub use coordination::{ActiveSessionRecord, CoordinationMessage, SessionNotice};
pub use document::{CacheError, CacheStats, ContentHash, Document, DocumentKind, FileUpload, MimeType};
pub use ids::{DocumentId, HandleId, OwnerId, TabId};
pub use lock::LockState;
pub use retry::{ApiError, RetryPolicy};
pub use session::{ExternalSessionRecord, SessionError, SessionPhase, SessionStatus};
