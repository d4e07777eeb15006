use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::coordination::CoordinationBus;

/// Periodic heartbeat loop for the main session.
///
/// The context that does not own an opener reference is the sole heartbeat
/// emitter: it polls the durable record and re-broadcasts on a fixed
/// interval, so coordination state survives even when the broadcast channel
/// drops messages across process suspension.
pub struct HeartbeatEmitter {
    bus: Arc<CoordinationBus>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatEmitter {
    pub fn new(bus: Arc<CoordinationBus>) -> Self {
        Self {
            bus,
            task: Mutex::new(None),
        }
    }

    /// Starts the heartbeat loop. Idempotent.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(|p| p.into_inner());
        if task.is_some() {
            return;
        }

        let bus = self.bus.clone();
        let period = bus.config().heartbeat_interval();
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            // The first tick fires immediately; skip straight to the cadence.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !bus.emit_heartbeat().await {
                    debug!("no active session record, heartbeat skipped");
                }
            }
        }));
    }

    /// Stops the heartbeat loop. Every started interval has exactly this one
    /// corresponding clear. Idempotent.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().unwrap_or_else(|p| p.into_inner()).take() {
            task.abort();
        }
    }
}

impl Drop for HeartbeatEmitter {
    fn drop(&mut self) {
        self.stop();
    }
}
