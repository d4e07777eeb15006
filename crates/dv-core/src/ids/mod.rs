//! ID type wrappers for type safety.

mod id_macro;

pub mod document_id;
pub mod handle_id;
pub mod owner_id;
pub mod tab_id;

pub use document_id::DocumentId;
pub use handle_id::HandleId;
pub use owner_id::OwnerId;
pub use tab_id::TabId;
