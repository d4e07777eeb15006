//! # dv-app
//!
//! Orchestration layer for DocVault: the Coordination Bus service, the
//! heartbeat emitter, the External Session Controller, the UI Lock
//! Coordinator, and the logging bootstrap.

pub mod bootstrap;
pub mod coordination;
pub mod lock;
pub mod session;

pub use coordination::{CoordinationBus, HeartbeatEmitter};
pub use lock::UiLockCoordinator;
pub use session::ExternalSessionController;
