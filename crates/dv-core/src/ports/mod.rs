//! Port interfaces between the domain/orchestration layers and the
//! infrastructure adapters.
//!
//! Ports keep the engine independent of the concrete storage backend, clock,
//! broadcast transport, and browsing-context opener, so every one of them can
//! be swapped or mocked in tests.

mod broadcast;
mod clock;
mod key_value;
mod opener;

pub use broadcast::BroadcastPort;
pub use clock::ClockPort;
pub use key_value::KeyValuePort;
pub use opener::{ContextOpenerPort, ExternalContextHandle};
