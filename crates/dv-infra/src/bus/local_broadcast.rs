use dv_core::coordination::CoordinationMessage;
use dv_core::ports::BroadcastPort;
use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 100;

/// In-process broadcast channel shared by every execution context that holds
/// a clone.
///
/// Fire-and-forget: publishing with no live subscribers drops the message,
/// and a lagging subscriber loses the oldest messages. Both match the
/// delivery guarantees the coordination design assumes (none).
#[derive(Clone)]
pub struct LocalBroadcastChannel {
    name: String,
    sender: broadcast::Sender<CoordinationMessage>,
}

impl LocalBroadcastChannel {
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl BroadcastPort for LocalBroadcastChannel {
    fn publish(&self, message: &CoordinationMessage) {
        if self.sender.send(message.clone()).is_err() {
            trace!(channel = %self.name, "broadcast dropped, no subscribers");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<CoordinationMessage> {
        self.sender.subscribe()
    }
}
