use std::sync::Arc;

use crate::session::{ContextProbe, SessionError, TargetProbe};

/// Handle to one delegated browsing context.
///
/// Probing is cheap and side-effect free; the controller polls these methods
/// on its liveness loops.
pub trait ExternalContextHandle: Send + Sync {
    /// Whether the context reports itself explicitly closed.
    fn is_closed(&self) -> bool;

    /// Observes the context's navigation target.
    fn probe_target(&self) -> TargetProbe;

    /// Best-effort close. Must be safe to call more than once, and on an
    /// already-closed context.
    fn close(&self);

    fn probe(&self) -> ContextProbe {
        ContextProbe {
            reports_closed: self.is_closed(),
            target: self.probe_target(),
        }
    }
}

/// Opens delegated browsing contexts. Implemented by the embedding shell;
/// refusals (pop-up blocking) surface as `SessionError::PopupBlocked`.
pub trait ContextOpenerPort: Send + Sync {
    fn open(&self, url: &str) -> Result<Arc<dyn ExternalContextHandle>, SessionError>;
}
