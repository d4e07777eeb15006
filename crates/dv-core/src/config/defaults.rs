//! Production defaults. Development builds shorten the lock ceiling so a
//! stuck lock surfaces within a test run instead of after twelve minutes.

use crate::config::model::{
    ApiConfig, CacheConfig, CoordinationConfig, EngineConfig, RetrySettings,
    CURRENT_SCHEMA_VERSION,
};
use crate::retry::RetryPolicy;

const MB: u64 = 1024 * 1024;

fn is_development() -> bool {
    cfg!(debug_assertions)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 5 * MB,
            max_total_size_bytes: 20 * MB,
            inline_threshold_bytes: MB,
            allowed_mime_types: vec![
                "application/pdf".to_string(),
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
            key_prefix: "docvault.documents.".to_string(),
            legacy_key_prefixes: vec!["heirs_documents_".to_string()],
        }
    }
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            channel_name: "docvault.coordination".to_string(),
            active_session_key: "docvault.session.active".to_string(),
            heartbeat_key: "docvault.session.heartbeat".to_string(),
            heartbeat_interval_ms: 3_000,
            fast_poll_interval_ms: 1_000,
            safety_poll_interval_ms: 5_000,
            heartbeat_stale_after_ms: 15_000,
            lock_ceiling_ms: if is_development() {
                90_000
            } else {
                12 * 60 * 1_000
            },
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            critical: RetryPolicy::critical(),
            document: RetryPolicy::document(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/succession/api".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            cache: CacheConfig::default(),
            coordination: CoordinationConfig::default(),
            retry: RetrySettings::default(),
            api: ApiConfig::default(),
        }
    }
}
