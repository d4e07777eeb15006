pub mod local_broadcast;

pub use local_broadcast::LocalBroadcastChannel;
