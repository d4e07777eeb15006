use tokio::sync::broadcast;

use crate::coordination::CoordinationMessage;

/// Fire-and-forget publish/subscribe channel shared by every execution
/// context of the app.
///
/// Delivery is not guaranteed: a suspended context silently misses
/// broadcasts, which is why the durable side-channel exists. Publishing to a
/// channel with no subscribers is a no-op, not an error.
pub trait BroadcastPort: Send + Sync {
    fn publish(&self, message: &CoordinationMessage);

    fn subscribe(&self) -> broadcast::Receiver<CoordinationMessage>;
}
