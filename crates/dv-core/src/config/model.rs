use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryPolicy;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Document Cache limits and storage key layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Hard per-file limit; uploads above it are rejected outright.
    pub max_file_size_bytes: u64,

    /// Per-owner quota; exceeding it triggers oldest-first eviction.
    pub max_total_size_bytes: u64,

    /// Files below this size keep their content resident behind an inline
    /// handle; larger files are tracked by metadata only.
    pub inline_threshold_bytes: u64,

    pub allowed_mime_types: Vec<String>,

    /// Prefix of the durable per-namespace key: `{prefix}{normalized_owner}`.
    pub key_prefix: String,

    /// Prefixes from earlier releases; the janitor migrates entries found
    /// under these to `key_prefix`.
    #[serde(default)]
    pub legacy_key_prefixes: Vec<String>,
}

impl CacheConfig {
    pub fn is_mime_allowed(&self, mime: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime)
    }
}

/// Coordination bus keys, polling cadences and the lock ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationConfig {
    /// Well-known broadcast channel shared by all contexts of the app.
    pub channel_name: String,

    /// Fixed durable key holding the active-session record.
    pub active_session_key: String,

    /// Fixed durable key holding the last-heartbeat timestamp (epoch ms).
    pub heartbeat_key: String,

    pub heartbeat_interval_ms: u64,

    /// Short-interval liveness poll.
    pub fast_poll_interval_ms: u64,

    /// Longer-interval safety net in case the fast loop's timer is throttled.
    pub safety_poll_interval_ms: u64,

    /// Best-effort staleness window for heartbeats.
    pub heartbeat_stale_after_ms: u64,

    /// Hard ceiling after which a UI lock is force-released regardless of
    /// session state. The single global timeout guarantee.
    pub lock_ceiling_ms: u64,
}

impl CoordinationConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
    pub fn fast_poll_interval(&self) -> Duration {
        Duration::from_millis(self.fast_poll_interval_ms)
    }
    pub fn safety_poll_interval(&self) -> Duration {
        Duration::from_millis(self.safety_poll_interval_ms)
    }
    pub fn heartbeat_stale_after(&self) -> Duration {
        Duration::from_millis(self.heartbeat_stale_after_ms)
    }
    pub fn lock_ceiling(&self) -> Duration {
        Duration::from_millis(self.lock_ceiling_ms)
    }
}

/// Named retry policies for the two operation classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    pub critical: RetryPolicy,
    pub document: RetryPolicy,
}

/// Upstream succession-API collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub coordination: CoordinationConfig,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub api: ApiConfig,
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}
