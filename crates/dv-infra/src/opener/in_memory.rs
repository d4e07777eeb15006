//! In-memory implementation of the context-opener port.
//!
//! Production embeds the engine in a shell that opens real browsing
//! contexts; integration tests and development harnesses drive this
//! scriptable double instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dv_core::ports::{ContextOpenerPort, ExternalContextHandle};
use dv_core::session::{SessionError, TargetProbe};

/// A scriptable delegated context. Tests flip its observable state to walk
/// the controller through the detection rules.
pub struct SimulatedContext {
    url: String,
    closed: AtomicBool,
    target: Mutex<TargetProbe>,
}

impl SimulatedContext {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            closed: AtomicBool::new(false),
            target: Mutex::new(TargetProbe::Reachable),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Simulates the external page navigating away from the opener's origin.
    pub fn navigate_cross_origin(&self) {
        if let Ok(mut target) = self.target.lock() {
            *target = TargetProbe::CrossOriginDenied;
        }
    }

    /// Simulates the navigation target becoming a null/throwing reference.
    pub fn drop_target(&self) {
        if let Ok(mut target) = self.target.lock() {
            *target = TargetProbe::Missing;
        }
    }

    /// Simulates the user closing the context, in any way, at any time.
    pub fn simulate_user_close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl ExternalContextHandle for SimulatedContext {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn probe_target(&self) -> TargetProbe {
        if self.is_closed() {
            return TargetProbe::Missing;
        }
        self.target
            .lock()
            .map(|t| *t)
            .unwrap_or(TargetProbe::Missing)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Opener returning simulated contexts. Can be told to refuse the next open,
/// mimicking a pop-up blocker.
#[derive(Default)]
pub struct InMemoryContextOpener {
    blocked: AtomicBool,
    last: Mutex<Option<Arc<SimulatedContext>>>,
}

impl InMemoryContextOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// The most recently opened context, for tests to script.
    pub fn last_context(&self) -> Option<Arc<SimulatedContext>> {
        self.last.lock().ok().and_then(|l| l.clone())
    }
}

impl ContextOpenerPort for InMemoryContextOpener {
    fn open(&self, url: &str) -> Result<Arc<dyn ExternalContextHandle>, SessionError> {
        if self.blocked.load(Ordering::SeqCst) {
            return Err(SessionError::PopupBlocked);
        }
        let context = Arc::new(SimulatedContext::new(url));
        if let Ok(mut last) = self.last.lock() {
            *last = Some(context.clone());
        }
        Ok(context)
    }
}
