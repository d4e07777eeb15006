use std::sync::{Arc, Mutex};

use dv_core::config::CoordinationConfig;
use dv_core::coordination::{ActiveSessionRecord, CoordinationMessage, SessionNotice};
use dv_core::ids::TabId;
use dv_core::ports::{BroadcastPort, ClockPort, KeyValuePort};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const NOTICE_CAPACITY: usize = 32;

/// Coordination service for one execution context.
///
/// Combines the fire-and-forget broadcast channel with the durable
/// side-channel: every received message is reduced to durable state through
/// one exhaustive handler, then re-emitted as an in-process notice. Handlers
/// are idempotent, so duplicate and out-of-order delivery are harmless.
///
/// Constructed once per context and shared by reference; `initialize` starts
/// the dispatch task and `cleanup` stops it.
pub struct CoordinationBus {
    broadcast: Arc<dyn BroadcastPort>,
    kv: Arc<dyn KeyValuePort>,
    clock: Arc<dyn ClockPort>,
    config: CoordinationConfig,
    notices: broadcast::Sender<SessionNotice>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl CoordinationBus {
    pub fn new(
        broadcast: Arc<dyn BroadcastPort>,
        kv: Arc<dyn KeyValuePort>,
        clock: Arc<dyn ClockPort>,
        config: CoordinationConfig,
    ) -> Arc<Self> {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Arc::new(Self {
            broadcast,
            kv,
            clock,
            config,
            notices,
            dispatcher: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &CoordinationConfig {
        &self.config
    }

    /// Starts dispatching broadcast messages into the handler. Idempotent.
    pub fn initialize(self: &Arc<Self>) {
        let mut dispatcher = lock_or_recover(&self.dispatcher);
        if dispatcher.is_some() {
            return;
        }

        let weak = Arc::downgrade(self);
        let mut rx = self.broadcast.subscribe();
        *dispatcher = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => {
                        let Some(bus) = weak.upgrade() else { break };
                        bus.handle_message(message).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "coordination bus lagged, broadcasts dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    /// Stops the dispatch task. Idempotent.
    pub fn cleanup(&self) {
        if let Some(task) = lock_or_recover(&self.dispatcher).take() {
            task.abort();
        }
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// Persists a pending active-session record, then broadcasts `TabOpened`.
    ///
    /// The record is written before the broadcast so a context that misses
    /// the message can still recover the session from the side-channel.
    pub async fn announce_opened(&self, tab_id: TabId, url: &str) {
        let record = ActiveSessionRecord::pending(tab_id.clone(), url, self.clock.now_utc());
        self.write_record(&record).await;
        self.broadcast.publish(&CoordinationMessage::TabOpened {
            tab_id,
            url: url.to_string(),
            timestamp: self.clock.now_utc(),
        });
    }

    /// Broadcasts `TabClosed`. Safe to call from teardown paths.
    pub fn publish_closed(&self, tab_id: &TabId) {
        self.broadcast.publish(&CoordinationMessage::TabClosed {
            tab_id: tab_id.clone(),
            timestamp: self.clock.now_utc(),
        });
    }

    /// Broadcasts `UnlockRequest`, the ambiguous sibling of `TabClosed`.
    pub fn request_unlock(&self, tab_id: &TabId) {
        self.broadcast.publish(&CoordinationMessage::UnlockRequest {
            tab_id: tab_id.clone(),
            timestamp: self.clock.now_utc(),
        });
    }

    /// One heartbeat tick: refresh the durable timestamp and re-broadcast,
    /// guarding against the bus silently dropping messages. Returns whether
    /// a session record existed to heartbeat for.
    pub async fn emit_heartbeat(&self) -> bool {
        let Some(record) = self.active_session().await else {
            return false;
        };
        self.touch_heartbeat(self.clock.now_ms()).await;
        self.broadcast.publish(&CoordinationMessage::Heartbeat {
            tab_id: record.tab_id,
            timestamp: self.clock.now_utc(),
        });
        true
    }

    /// Reduces one message to durable state and re-emits it as a notice.
    pub async fn handle_message(&self, message: CoordinationMessage) {
        match message {
            CoordinationMessage::TabOpened {
                tab_id,
                url,
                timestamp,
            } => {
                let record = ActiveSessionRecord {
                    tab_id: tab_id.clone(),
                    url: url.clone(),
                    timestamp,
                    confirmed: true,
                };
                self.write_record(&record).await;
                self.touch_heartbeat(self.clock.now_ms()).await;
                self.notify(SessionNotice::Opened { tab_id, url });
            }

            CoordinationMessage::TabClosed { tab_id, .. } => {
                self.delete_session_state().await;
                self.notify(SessionNotice::Closed { tab_id });
            }

            CoordinationMessage::UnlockRequest { tab_id, .. } => {
                self.delete_session_state().await;
                self.notify(SessionNotice::UnlockRequested { tab_id });
            }

            CoordinationMessage::Heartbeat { tab_id, timestamp } => {
                match self.active_session().await {
                    Some(record) if record.tab_id == tab_id => {
                        self.touch_heartbeat(timestamp.timestamp_millis()).await;
                    }
                    _ => {
                        debug!(tab_id = %tab_id, "ignoring stale or foreign heartbeat");
                    }
                }
            }
        }
    }

    /// The durable active-session record, if any. Corrupt state reads as
    /// absent.
    pub async fn active_session(&self) -> Option<ActiveSessionRecord> {
        let raw = match self.kv.get(&self.config.active_session_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "active-session read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "active-session record corrupt");
                None
            }
        }
    }

    /// Whether the active session's heartbeats have gone stale beyond the
    /// best-effort window. False when no session record exists.
    pub async fn heartbeat_stale(&self) -> bool {
        if self.active_session().await.is_none() {
            return false;
        }
        let window_ms = self.config.heartbeat_stale_after().as_millis() as i64;
        match self.last_heartbeat_ms().await {
            Some(last) => self.clock.now_ms() - last > window_ms,
            None => true,
        }
    }

    /// Last heartbeat timestamp (epoch ms), if one was ever written.
    pub async fn last_heartbeat_ms(&self) -> Option<i64> {
        match self.kv.get(&self.config.heartbeat_key).await {
            Ok(Some(raw)) => raw.parse().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "heartbeat read failed");
                None
            }
        }
    }

    async fn write_record(&self, record: &ActiveSessionRecord) {
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "serialize active-session record failed");
                return;
            }
        };
        if let Err(e) = self.kv.set(&self.config.active_session_key, &raw).await {
            warn!(error = %e, "persist active-session record failed");
        }
    }

    async fn touch_heartbeat(&self, epoch_ms: i64) {
        if let Err(e) = self
            .kv
            .set(&self.config.heartbeat_key, &epoch_ms.to_string())
            .await
        {
            warn!(error = %e, "persist heartbeat failed");
        }
    }

    async fn delete_session_state(&self) {
        if let Err(e) = self.kv.delete(&self.config.active_session_key).await {
            warn!(error = %e, "delete active-session record failed");
        }
        if let Err(e) = self.kv.delete(&self.config.heartbeat_key).await {
            warn!(error = %e, "delete heartbeat failed");
        }
    }

    fn notify(&self, notice: SessionNotice) {
        // No subscribers is fine; notices are best-effort.
        let _ = self.notices.send(notice);
    }
}

impl Drop for CoordinationBus {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dv_core::ports::KeyValuePort;
    use dv_infra::bus::LocalBroadcastChannel;
    use dv_infra::kv::InMemoryKeyValueStore;
    use dv_infra::time::SystemClock;

    struct Fixture {
        bus: Arc<CoordinationBus>,
        kv: Arc<InMemoryKeyValueStore>,
        channel: Arc<LocalBroadcastChannel>,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let channel = Arc::new(LocalBroadcastChannel::new("docvault.coordination"));
        let bus = CoordinationBus::new(
            channel.clone(),
            kv.clone(),
            Arc::new(SystemClock::new()),
            CoordinationConfig::default(),
        );
        Fixture { bus, kv, channel }
    }

    #[tokio::test]
    async fn test_tab_opened_persists_confirmed_record_and_notifies() {
        let f = fixture();
        f.bus.initialize();
        let mut notices = f.bus.subscribe_notices();

        f.bus
            .announce_opened(TabId::from("tab-1"), "https://notaria.example/form")
            .await;

        let notice = notices.recv().await.unwrap();
        assert_eq!(
            notice,
            SessionNotice::Opened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
            }
        );
        let record = f.bus.active_session().await.unwrap();
        assert_eq!(record.tab_id, TabId::from("tab-1"));
        assert!(record.confirmed);
    }

    #[tokio::test]
    async fn test_pending_record_survives_even_if_broadcast_is_missed() {
        // No dispatcher running: the broadcast goes nowhere, but the durable
        // side-channel still carries the session for late subscribers.
        let f = fixture();
        f.bus
            .announce_opened(TabId::from("tab-1"), "https://notaria.example/form")
            .await;

        let record = f.bus.active_session().await.unwrap();
        assert!(!record.confirmed);
    }

    #[tokio::test]
    async fn test_tab_closed_clears_durable_state() {
        let f = fixture();
        f.bus
            .handle_message(CoordinationMessage::TabOpened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
                timestamp: Utc::now(),
            })
            .await;
        assert!(f.bus.active_session().await.is_some());
        assert!(f.bus.last_heartbeat_ms().await.is_some());

        f.bus
            .handle_message(CoordinationMessage::TabClosed {
                tab_id: TabId::from("tab-1"),
                timestamp: Utc::now(),
            })
            .await;
        assert!(f.bus.active_session().await.is_none());
        assert!(f.bus.last_heartbeat_ms().await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_tab_closed_is_idempotent() {
        let f = fixture();
        let mut notices = f.bus.subscribe_notices();
        f.bus
            .handle_message(CoordinationMessage::TabOpened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
                timestamp: Utc::now(),
            })
            .await;

        let closed = CoordinationMessage::TabClosed {
            tab_id: TabId::from("tab-1"),
            timestamp: Utc::now(),
        };
        f.bus.handle_message(closed.clone()).await;
        let state_after_first = f.kv.len();

        f.bus.handle_message(closed).await;
        assert_eq!(f.kv.len(), state_after_first);
        assert!(f.bus.active_session().await.is_none());

        // The notice is re-emitted each time; that is the only repeated
        // effect.
        let _ = notices.recv().await.unwrap();
        assert!(matches!(
            notices.recv().await.unwrap(),
            SessionNotice::Closed { .. }
        ));
        assert!(matches!(
            notices.recv().await.unwrap(),
            SessionNotice::Closed { .. }
        ));
    }

    #[tokio::test]
    async fn test_unlock_request_has_same_effect_as_tab_closed() {
        let f = fixture();
        f.bus
            .handle_message(CoordinationMessage::TabOpened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
                timestamp: Utc::now(),
            })
            .await;

        f.bus
            .handle_message(CoordinationMessage::UnlockRequest {
                tab_id: TabId::from("tab-1"),
                timestamp: Utc::now(),
            })
            .await;
        assert!(f.bus.active_session().await.is_none());
        assert!(f.bus.last_heartbeat_ms().await.is_none());
    }

    #[tokio::test]
    async fn test_foreign_heartbeat_is_ignored() {
        let f = fixture();
        f.bus
            .handle_message(CoordinationMessage::TabOpened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
                timestamp: Utc::now(),
            })
            .await;
        let before = f.bus.last_heartbeat_ms().await.unwrap();

        f.bus
            .handle_message(CoordinationMessage::Heartbeat {
                tab_id: TabId::from("someone-else"),
                timestamp: Utc::now() + chrono::Duration::seconds(60),
            })
            .await;
        assert_eq!(f.bus.last_heartbeat_ms().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_matching_heartbeat_refreshes_timestamp() {
        let f = fixture();
        f.bus
            .handle_message(CoordinationMessage::TabOpened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
                timestamp: Utc::now(),
            })
            .await;

        let later = Utc::now() + chrono::Duration::seconds(60);
        f.bus
            .handle_message(CoordinationMessage::Heartbeat {
                tab_id: TabId::from("tab-1"),
                timestamp: later,
            })
            .await;
        assert_eq!(
            f.bus.last_heartbeat_ms().await.unwrap(),
            later.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_emit_heartbeat_requires_active_record() {
        let f = fixture();
        assert!(!f.bus.emit_heartbeat().await);

        f.bus
            .handle_message(CoordinationMessage::TabOpened {
                tab_id: TabId::from("tab-1"),
                url: "https://notaria.example/form".to_string(),
                timestamp: Utc::now(),
            })
            .await;
        let mut rx = f.channel.subscribe();
        assert!(f.bus.emit_heartbeat().await);
        assert!(matches!(
            rx.recv().await.unwrap(),
            CoordinationMessage::Heartbeat { .. }
        ));
    }

    #[tokio::test]
    async fn test_corrupt_record_reads_as_absent() {
        let f = fixture();
        let key = f.bus.config().active_session_key.clone();
        f.kv.set(&key, "not json").await.unwrap();
        assert!(f.bus.active_session().await.is_none());
    }

    #[tokio::test]
    async fn test_initialize_and_cleanup_are_idempotent() {
        let f = fixture();
        f.bus.initialize();
        f.bus.initialize();
        f.bus.cleanup();
        f.bus.cleanup();
    }

    struct ManualClock {
        now_ms: std::sync::atomic::AtomicI64,
    }

    impl dv_core::ports::ClockPort for ManualClock {
        fn now_ms(&self) -> i64 {
            self.now_ms.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_heartbeat_staleness_window() {
        let clock = Arc::new(ManualClock {
            now_ms: std::sync::atomic::AtomicI64::new(1_700_000_000_000),
        });
        let config = CoordinationConfig {
            heartbeat_stale_after_ms: 15_000,
            ..CoordinationConfig::default()
        };
        let bus = CoordinationBus::new(
            Arc::new(dv_infra::bus::LocalBroadcastChannel::new(
                config.channel_name.clone(),
            )),
            Arc::new(InMemoryKeyValueStore::new()),
            clock.clone(),
            config,
        );

        // No session: never stale.
        assert!(!bus.heartbeat_stale().await);

        bus.handle_message(CoordinationMessage::TabOpened {
            tab_id: TabId::from("tab-1"),
            url: "https://notaria.example/form".to_string(),
            timestamp: Utc::now(),
        })
        .await;
        assert!(!bus.heartbeat_stale().await);

        clock
            .now_ms
            .fetch_add(16_000, std::sync::atomic::Ordering::SeqCst);
        assert!(bus.heartbeat_stale().await);

        // A fresh heartbeat clears the staleness.
        assert!(bus.emit_heartbeat().await);
        assert!(!bus.heartbeat_stale().await);
    }
}
