//! Cross-cutting storage cleanup: legacy key migration and eviction of
//! foreign namespaces when the active owner changes.

use std::sync::Arc;

use anyhow::Result;
use dv_core::config::CacheConfig;
use dv_core::ids::OwnerId;
use dv_core::ports::KeyValuePort;
use tracing::{info, warn};

/// Opportunistic cleanup over the durable store.
///
/// Per-key failures are logged and skipped; the janitor never fails the
/// caller outright.
pub struct StorageJanitor {
    kv: Arc<dyn KeyValuePort>,
    config: CacheConfig,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct JanitorReport {
    pub migrated: usize,
    pub evicted: usize,
}

impl StorageJanitor {
    pub fn new(kv: Arc<dyn KeyValuePort>, config: CacheConfig) -> Self {
        Self { kv, config }
    }

    /// Migrates legacy-prefixed entries to the current prefix, then deletes
    /// every namespace other than `active_owner`'s to bound total storage.
    pub async fn run_once(&self, active_owner: &OwnerId) -> Result<JanitorReport> {
        let mut report = JanitorReport::default();
        report.migrated = self.migrate_legacy_keys().await;
        report.evicted = self.evict_foreign_namespaces(active_owner).await;
        if report.migrated > 0 || report.evicted > 0 {
            info!(
                migrated = report.migrated,
                evicted = report.evicted,
                "storage janitor pass complete"
            );
        }
        Ok(report)
    }

    async fn migrate_legacy_keys(&self) -> usize {
        let mut migrated = 0;
        for legacy_prefix in &self.config.legacy_key_prefixes {
            let keys = match self.kv.keys_with_prefix(legacy_prefix).await {
                Ok(keys) => keys,
                Err(e) => {
                    warn!(prefix = %legacy_prefix, error = %e, "legacy key scan failed");
                    continue;
                }
            };
            for old_key in keys {
                let suffix = &old_key[legacy_prefix.len()..];
                let new_key = format!("{}{}", self.config.key_prefix, suffix);
                if let Err(e) = self.migrate_one(&old_key, &new_key).await {
                    warn!(old_key = %old_key, new_key = %new_key, error = %e, "legacy key migration failed");
                    continue;
                }
                migrated += 1;
            }
        }
        migrated
    }

    async fn migrate_one(&self, old_key: &str, new_key: &str) -> Result<()> {
        if let Some(value) = self.kv.get(old_key).await? {
            // A value already stored under the current prefix wins.
            if self.kv.get(new_key).await?.is_none() {
                self.kv.set(new_key, &value).await?;
            }
        }
        self.kv.delete(old_key).await
    }

    async fn evict_foreign_namespaces(&self, active_owner: &OwnerId) -> usize {
        let active_key = format!("{}{}", self.config.key_prefix, active_owner);
        let keys = match self.kv.keys_with_prefix(&self.config.key_prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "namespace scan failed");
                return 0;
            }
        };

        let mut evicted = 0;
        for key in keys {
            if key == active_key {
                continue;
            }
            match self.kv.delete(&key).await {
                Ok(()) => evicted += 1,
                Err(e) => warn!(key = %key, error = %e, "foreign namespace eviction failed"),
            }
        }
        evicted
    }
}
