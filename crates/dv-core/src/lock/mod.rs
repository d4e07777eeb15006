//! UI lock domain: the two-state lock and its transition machine.

pub mod machine;
pub mod state;

pub use machine::{LockAction, LockEvent, LockStateMachine};
pub use state::LockState;
