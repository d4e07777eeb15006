use std::sync::{Arc, Mutex};
use std::time::Duration;

use dv_core::coordination::SessionNotice;
use dv_core::lock::{LockAction, LockEvent, LockState, LockStateMachine};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

use crate::coordination::CoordinationBus;

const CHANGE_CAPACITY: usize = 16;

/// Drives the lock state machine and owns its ceiling timer.
///
/// The coordinator has no knowledge of why it is locked; consumers decide
/// when to call `lock`/`unlock`, typically lock-on-open and
/// unlock-on-terminal-detection. The ceiling guarantees the UI is never
/// permanently unusable: after it elapses the lock is force-released
/// regardless of session state, even with zero bus traffic.
pub struct UiLockCoordinator {
    state: Mutex<LockState>,
    ceiling: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
    changes: broadcast::Sender<LockState>,
}

impl UiLockCoordinator {
    pub fn new(ceiling: Duration) -> Arc<Self> {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Arc::new(Self {
            state: Mutex::new(LockState::Unlocked),
            ceiling,
            timer: Mutex::new(None),
            watcher: Mutex::new(None),
            changes,
        })
    }

    /// Idempotent while already locked: the reason is overwritten, nothing
    /// stacks.
    pub fn lock(self: &Arc<Self>, reason: impl Into<String>) {
        self.apply(LockEvent::Lock {
            reason: reason.into(),
        });
    }

    /// Idempotent.
    pub fn unlock(self: &Arc<Self>) {
        self.apply(LockEvent::Unlock);
    }

    /// Flips based on current state.
    pub fn toggle(self: &Arc<Self>, reason: Option<String>) {
        self.apply(LockEvent::Toggle { reason });
    }

    pub fn state(&self) -> LockState {
        lock_or_recover(&self.state).clone()
    }

    pub fn is_locked(&self) -> bool {
        self.state().is_locked()
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<LockState> {
        self.changes.subscribe()
    }

    /// Locks on `Opened` notices and unlocks on the terminal ones, the usual
    /// wiring between the session controller and the UI.
    pub fn attach_to_bus(self: &Arc<Self>, bus: &CoordinationBus) {
        let mut notices = bus.subscribe_notices();
        let weak = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            loop {
                match notices.recv().await {
                    Ok(notice) => {
                        let Some(coordinator) = weak.upgrade() else { break };
                        match notice {
                            SessionNotice::Opened { .. } => {
                                coordinator.lock("external session active")
                            }
                            SessionNotice::Closed { .. }
                            | SessionNotice::UnlockRequested { .. } => coordinator.unlock(),
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut watcher = lock_or_recover(&self.watcher);
        if let Some(previous) = watcher.replace(task) {
            previous.abort();
        }
    }

    /// Force-unlocks and stops all tasks. Called on unmount of the owning
    /// scope so the UI can never stay locked across navigations.
    pub fn shutdown(&self) {
        if let Some(task) = lock_or_recover(&self.watcher).take() {
            task.abort();
        }
        self.stop_ceiling_timer();
        let mut state = lock_or_recover(&self.state);
        if state.is_locked() {
            *state = LockState::Unlocked;
            let _ = self.changes.send(LockState::Unlocked);
        }
    }

    fn apply(self: &Arc<Self>, event: LockEvent) {
        let (next, actions, changed) = {
            let mut state = lock_or_recover(&self.state);
            let (next, actions) = LockStateMachine::transition(state.clone(), event);
            let changed = *state != next;
            *state = next.clone();
            (next, actions, changed)
        };

        for action in actions {
            match action {
                LockAction::StartCeilingTimer => self.start_ceiling_timer(),
                LockAction::StopCeilingTimer => self.stop_ceiling_timer(),
            }
        }
        if changed {
            let _ = self.changes.send(next);
        }
    }

    fn start_ceiling_timer(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let ceiling = self.ceiling;
        let task = tokio::spawn(async move {
            sleep(ceiling).await;
            if let Some(coordinator) = weak.upgrade() {
                warn!(
                    ceiling_ms = ceiling.as_millis() as u64,
                    "lock ceiling reached, force-releasing UI lock"
                );
                coordinator.apply(LockEvent::CeilingElapsed);
            }
        });

        let mut timer = lock_or_recover(&self.timer);
        if let Some(previous) = timer.replace(task) {
            previous.abort();
        }
    }

    fn stop_ceiling_timer(&self) {
        if let Some(task) = lock_or_recover(&self.timer).take() {
            task.abort();
        }
    }
}

impl Drop for UiLockCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
