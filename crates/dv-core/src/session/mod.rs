//! External session domain: the record tracking one delegated browsing
//! context, its lifecycle phases, and liveness evaluation.

pub mod error;
pub mod liveness;
pub mod record;

pub use error::SessionError;
pub use liveness::{evaluate_probe, ContextProbe, SessionStatus, TargetProbe};
pub use record::{ExternalSessionRecord, SessionPhase};
