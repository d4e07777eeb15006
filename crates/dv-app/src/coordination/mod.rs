//! Cross-context coordination services: the bus combining the broadcast
//! channel with the durable side-channel, and the heartbeat emitter.

pub mod bus;
pub mod heartbeat;

pub use bus::CoordinationBus;
pub use heartbeat::HeartbeatEmitter;
