//! Cross-context coordination: the broadcast message set, the durable
//! active-session record, and in-process notification events.

pub mod event;
pub mod message;
pub mod record;

pub use event::SessionNotice;
pub use message::CoordinationMessage;
pub use record::ActiveSessionRecord;
