//! The Document Cache: quota-aware persistence of uploaded documents, plus
//! the process-local registry backing inline content handles.

pub mod document_cache;
pub mod handle_registry;

pub use document_cache::DocumentCache;
pub use handle_registry::InlineHandleRegistry;
