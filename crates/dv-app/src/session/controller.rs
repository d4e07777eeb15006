use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use dv_core::ids::TabId;
use dv_core::ports::{ClockPort, ContextOpenerPort, ExternalContextHandle};
use dv_core::session::{
    evaluate_probe, ExternalSessionRecord, SessionError, SessionPhase, SessionStatus, TargetProbe,
};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::coordination::CoordinationBus;

/// Opens a delegated browsing context and reliably detects when it is no
/// longer usable, despite no guaranteed cross-context signal.
///
/// Two independent polling loops drive the detection routine: a
/// short-interval loop and a longer-interval safety net for when the short
/// loop's timer is throttled. Terminal outcomes idempotently stop both
/// loops, best-effort close the context, clear the session record through
/// the bus, and notify listeners.
pub struct ExternalSessionController {
    opener: Arc<dyn ContextOpenerPort>,
    bus: Arc<CoordinationBus>,
    clock: Arc<dyn ClockPort>,
    active: Mutex<Option<ActiveExternalSession>>,
}

struct ActiveExternalSession {
    record: ExternalSessionRecord,
    handle: Arc<dyn ExternalContextHandle>,
    fast_poll: JoinHandle<()>,
    safety_poll: JoinHandle<()>,
}

impl ExternalSessionController {
    pub fn new(
        opener: Arc<dyn ContextOpenerPort>,
        bus: Arc<CoordinationBus>,
        clock: Arc<dyn ClockPort>,
    ) -> Arc<Self> {
        Arc::new(Self {
            opener,
            bus,
            clock,
            active: Mutex::new(None),
        })
    }

    /// Opens a delegated context for `url` and starts liveness polling.
    /// Replaces any session already open.
    pub async fn open(self: &Arc<Self>, url: &str) -> Result<TabId, SessionError> {
        validate_absolute_url(url)?;

        // One session at a time; an earlier one is reconciled as closed.
        self.close().await;

        let handle = self.opener.open(url)?;
        let tab_id = TabId::new();
        let record = ExternalSessionRecord::new(tab_id.clone(), url, self.clock.now_utc());
        self.bus.announce_opened(tab_id.clone(), url).await;

        let config = self.bus.config();
        let fast_poll = self.spawn_poll(config.fast_poll_interval());
        let safety_poll = self.spawn_poll(config.safety_poll_interval());

        let mut active = lock_or_recover(&self.active);
        *active = Some(ActiveExternalSession {
            record,
            handle,
            fast_poll,
            safety_poll,
        });

        info!(tab_id = %tab_id, url, "external session opened");
        Ok(tab_id)
    }

    /// One round of the detection routine. Returns `None` when no session is
    /// open. Terminal outcomes trigger teardown before returning.
    pub async fn check_status(&self) -> Option<SessionStatus> {
        let (handle, tab_id) = {
            let active = lock_or_recover(&self.active);
            let session = active.as_ref()?;
            (session.handle.clone(), session.record.tab_id.clone())
        };

        let probe = handle.probe();
        let status = evaluate_probe(&probe);
        match status {
            SessionStatus::Alive => {
                if probe.target == TargetProbe::CrossOriginDenied {
                    // Expected once the external page left our origin.
                    debug!(tab_id = %tab_id, "cross-origin access denied, session presumed alive");
                }
                self.refresh_heartbeat_view().await;
            }
            SessionStatus::Closed => self.finalize(SessionPhase::Closed).await,
            SessionStatus::Unreachable => self.finalize(SessionPhase::Unreachable).await,
        }
        Some(status)
    }

    /// Reconciles a session whose heartbeats went stale beyond the
    /// best-effort window. Same teardown as a detected closure, recorded as
    /// `TimedOut`.
    pub async fn expire(&self) {
        self.finalize(SessionPhase::TimedOut).await;
    }

    /// Snapshot of the tracked session record, if one is open.
    pub fn record(&self) -> Option<ExternalSessionRecord> {
        lock_or_recover(&self.active)
            .as_ref()
            .map(|s| s.record.clone())
    }

    async fn refresh_heartbeat_view(&self) {
        let Some(ms) = self.bus.last_heartbeat_ms().await else {
            return;
        };
        let mut active = lock_or_recover(&self.active);
        if let Some(session) = active.as_mut() {
            session.record.last_heartbeat_at = Utc.timestamp_millis_opt(ms).single();
        }
    }

    /// User- or system-initiated forced teardown; same effect as a detected
    /// terminal outcome.
    pub async fn close(&self) {
        self.finalize(SessionPhase::Closed).await;
    }

    /// Teardown hook for when the owning scope goes away while a session is
    /// open: the external context is force-closed rather than leaked.
    pub async fn shutdown(&self) {
        self.finalize(SessionPhase::Closed).await;
    }

    pub fn is_open(&self) -> bool {
        lock_or_recover(&self.active).is_some()
    }

    pub fn current_tab_id(&self) -> Option<TabId> {
        lock_or_recover(&self.active)
            .as_ref()
            .map(|s| s.record.tab_id.clone())
    }

    fn spawn_poll(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(controller) = weak.upgrade() else { break };
                // Terminal outcomes abort this task from finalize(); the loop
                // itself only observes.
                controller.check_status().await;
            }
        })
    }

    /// Idempotent terminal path: stops both polling loops, best-effort
    /// closes the context, clears the record and notifies through the bus.
    async fn finalize(&self, phase: SessionPhase) {
        let Some(session) = lock_or_recover(&self.active).take() else {
            return;
        };
        session.fast_poll.abort();
        session.safety_poll.abort();
        session.handle.close();
        info!(tab_id = %session.record.tab_id, phase = ?phase, "external session ended");
        self.bus.publish_closed(&session.record.tab_id);
    }
}

impl Drop for ExternalSessionController {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(session) = active.take() {
                session.fast_poll.abort();
                session.safety_poll.abort();
                session.handle.close();
                self.bus.publish_closed(&session.record.tab_id);
            }
        }
    }
}

fn validate_absolute_url(url: &str) -> Result<(), SessionError> {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .ok_or_else(|| SessionError::InvalidUrl(url.to_string()))?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(SessionError::InvalidUrl(url.to_string()));
    }
    Ok(())
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
