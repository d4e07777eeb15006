use chrono::{DateTime, Utc};

use crate::lock::state::LockState;

/// Inputs to the lock machine.
#[derive(Debug, Clone, PartialEq)]
pub enum LockEvent {
    Lock { reason: String },
    Unlock,
    Toggle { reason: Option<String> },
    /// The hard ceiling elapsed while locked; the lock is force-released so
    /// the UI can never be permanently unusable.
    CeilingElapsed,
}

/// Side effects the driver must execute after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    StartCeilingTimer,
    StopCeilingTimer,
}

pub struct LockStateMachine;

impl LockStateMachine {
    pub fn transition(state: LockState, event: LockEvent) -> (LockState, Vec<LockAction>) {
        Self::transition_at(state, event, Utc::now())
    }

    pub fn transition_at(
        state: LockState,
        event: LockEvent,
        now: DateTime<Utc>,
    ) -> (LockState, Vec<LockAction>) {
        match (state, event) {
            (LockState::Unlocked, LockEvent::Lock { reason }) => (
                LockState::Locked { reason, since: now },
                vec![LockAction::StartCeilingTimer],
            ),

            // Re-lock while locked: the reason is overwritten, the original
            // acquisition time and the running ceiling timer are kept.
            (LockState::Locked { since, .. }, LockEvent::Lock { reason }) => {
                (LockState::Locked { reason, since }, vec![])
            }

            (LockState::Locked { .. }, LockEvent::Unlock) => {
                (LockState::Unlocked, vec![LockAction::StopCeilingTimer])
            }
            (LockState::Unlocked, LockEvent::Unlock) => (LockState::Unlocked, vec![]),

            (LockState::Unlocked, LockEvent::Toggle { reason }) => Self::transition_at(
                LockState::Unlocked,
                LockEvent::Lock {
                    reason: reason.unwrap_or_else(|| "toggled".to_string()),
                },
                now,
            ),
            (state @ LockState::Locked { .. }, LockEvent::Toggle { .. }) => {
                Self::transition_at(state, LockEvent::Unlock, now)
            }

            // Ceiling fired: the timer has already completed, nothing to stop.
            (LockState::Locked { .. }, LockEvent::CeilingElapsed) => (LockState::Unlocked, vec![]),
            (LockState::Unlocked, LockEvent::CeilingElapsed) => (LockState::Unlocked, vec![]),
        }
    }
}
