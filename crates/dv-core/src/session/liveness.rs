//! Liveness evaluation for a delegated browsing context.
//!
//! The detection heuristics are exception-driven in nature (a cross-origin
//! access denial is a *signal*, not a failure), so the mapping from raw probe
//! observations to an outcome lives in one pure function instead of being
//! interpreted inline at every poll site.

use serde::{Deserialize, Serialize};

/// What probing the context's navigation target yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetProbe {
    /// The target is present and readable.
    Reachable,
    /// The target reference is gone (null or throwing on access).
    Missing,
    /// Access was denied by a cross-origin restriction. This is the expected
    /// steady state once the external page has navigated away from the
    /// opener's origin.
    CrossOriginDenied,
}

/// One observation of the external context, as gathered by a poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextProbe {
    /// The context reports itself explicitly closed.
    pub reports_closed: bool,
    pub target: TargetProbe,
}

/// Outcome of evaluating one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Alive,
    Closed,
    Unreachable,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Alive)
    }
}

/// Maps a probe to a status. Rules are evaluated in order, first match wins:
///
/// 1. explicitly closed → `Closed`
/// 2. navigation target gone → `Unreachable`
/// 3. cross-origin denial → `Alive` (steady state, callers may log it)
/// 4. otherwise → `Alive`
pub fn evaluate_probe(probe: &ContextProbe) -> SessionStatus {
    if probe.reports_closed {
        return SessionStatus::Closed;
    }
    match probe.target {
        TargetProbe::Missing => SessionStatus::Unreachable,
        TargetProbe::CrossOriginDenied | TargetProbe::Reachable => SessionStatus::Alive,
    }
}
