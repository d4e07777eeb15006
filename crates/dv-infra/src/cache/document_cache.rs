use std::sync::Arc;

use dv_core::config::CacheConfig;
use dv_core::document::{CacheError, CacheStats, ContentHash, Document, DocumentKind, FileUpload};
use dv_core::ids::{DocumentId, OwnerId};
use dv_core::ports::{ClockPort, KeyValuePort};
use tracing::{debug, info, warn};

use crate::cache::InlineHandleRegistry;

/// Quota-aware persistent store of uploaded documents for one namespace.
///
/// Documents are partitioned by normalized owner id; per owner at most one
/// document exists per kind. Reads degrade silently (corrupt state is treated
/// as empty), writes surface `CacheError::Storage`.
pub struct DocumentCache {
    kv: Arc<dyn KeyValuePort>,
    handles: Arc<InlineHandleRegistry>,
    clock: Arc<dyn ClockPort>,
    config: CacheConfig,
}

impl DocumentCache {
    pub fn new(
        kv: Arc<dyn KeyValuePort>,
        handles: Arc<InlineHandleRegistry>,
        clock: Arc<dyn ClockPort>,
        config: CacheConfig,
    ) -> Self {
        Self {
            kv,
            handles,
            clock,
            config,
        }
    }

    pub fn namespace_key(&self, owner: &OwnerId) -> String {
        format!("{}{}", self.config.key_prefix, owner)
    }

    /// Validates, hashes and persists an upload, replacing any existing
    /// document of the same kind and evicting oldest documents first when the
    /// namespace would exceed its quota. The incoming file is never evicted;
    /// if it cannot fit even after evicting everything, the write still
    /// proceeds.
    pub async fn save(
        &self,
        file: FileUpload,
        kind: DocumentKind,
        owner: &OwnerId,
    ) -> Result<Document, CacheError> {
        if file.size() > self.config.max_file_size_bytes {
            return Err(CacheError::Validation(format!(
                "{} \"{}\" is {} bytes, above the {} byte limit",
                kind.label(),
                file.name,
                file.size(),
                self.config.max_file_size_bytes
            )));
        }
        if !self.config.is_mime_allowed(file.mime_type.as_str()) {
            return Err(CacheError::Validation(format!(
                "{} \"{}\" has unsupported type {}",
                kind.label(),
                file.name,
                file.mime_type
            )));
        }

        let content_hash = ContentHash::compute(&file.bytes);
        let mut documents = self.load_documents(owner).await;

        // Handles are only released after the new state is durable, so a
        // failed write leaves no partial state behind.
        let mut released = Vec::new();

        if let Some(pos) = documents.iter().position(|d| d.kind == kind) {
            let replaced = documents.remove(pos);
            debug!(owner = %owner, kind = %kind, replaced_id = %replaced.id, "replacing document");
            released.extend(replaced.inline_handle);
        }

        let incoming_size = file.size();
        while total_size(&documents) + incoming_size > self.config.max_total_size_bytes {
            let Some(oldest) = documents
                .iter()
                .enumerate()
                .min_by_key(|(_, d)| d.uploaded_at)
                .map(|(i, _)| i)
            else {
                break;
            };
            let evicted = documents.remove(oldest);
            info!(
                owner = %owner,
                kind = %evicted.kind,
                size = evicted.size,
                "evicting oldest document to satisfy quota"
            );
            released.extend(evicted.inline_handle);
        }
        if total_size(&documents) + incoming_size > self.config.max_total_size_bytes {
            warn!(
                owner = %owner,
                size = incoming_size,
                quota = self.config.max_total_size_bytes,
                "incoming file alone exceeds quota, writing anyway"
            );
        }

        let inline_handle = if incoming_size < self.config.inline_threshold_bytes {
            Some(self.handles.create(file.bytes.clone()))
        } else {
            None
        };

        let document = Document {
            id: DocumentId::generate(self.clock.now_ms()),
            name: file.name,
            mime_type: file.mime_type,
            size: incoming_size,
            uploaded_at: self.clock.now_utc(),
            kind,
            content_hash,
            inline_handle: inline_handle.clone(),
            compressed: false,
        };
        documents.push(document.clone());

        if let Err(e) = self.persist(owner, &documents).await {
            if let Some(handle) = inline_handle {
                self.handles.release(&handle);
            }
            return Err(e);
        }

        for handle in released {
            self.handles.release(&handle);
        }

        Ok(document)
    }

    /// Current namespace contents. Never fails: corrupt or unreadable
    /// persisted state is treated as empty.
    pub async fn list(&self, owner: &OwnerId) -> Vec<Document> {
        self.load_documents(owner).await
    }

    pub async fn get_by_kind(&self, owner: &OwnerId, kind: DocumentKind) -> Option<Document> {
        self.load_documents(owner)
            .await
            .into_iter()
            .find(|d| d.kind == kind)
    }

    /// Removes the document of `kind`, releasing its inline handle. Returns
    /// whether a document was found and removed.
    pub async fn remove(&self, owner: &OwnerId, kind: DocumentKind) -> Result<bool, CacheError> {
        let mut documents = self.load_documents(owner).await;
        let Some(pos) = documents.iter().position(|d| d.kind == kind) else {
            return Ok(false);
        };
        let removed = documents.remove(pos);
        if documents.is_empty() {
            self.delete_namespace(owner).await?;
        } else {
            self.persist(owner, &documents).await?;
        }
        if let Some(handle) = removed.inline_handle {
            self.handles.release(&handle);
        }
        Ok(true)
    }

    /// Releases every handle in the namespace and deletes it.
    pub async fn clear(&self, owner: &OwnerId) -> Result<(), CacheError> {
        let documents = self.load_documents(owner).await;
        self.delete_namespace(owner).await?;
        for document in documents {
            if let Some(handle) = document.inline_handle {
                self.handles.release(&handle);
            }
        }
        Ok(())
    }

    pub async fn stats(&self, owner: &OwnerId) -> CacheStats {
        let documents = self.load_documents(owner).await;
        CacheStats::new(
            documents.len(),
            total_size(&documents),
            self.config.max_total_size_bytes,
        )
    }

    /// Recomputes the digest of `file` and compares it to the stored hash.
    /// A mismatch is surfaced as a data-corruption warning, never
    /// auto-resolved.
    pub fn verify_integrity(&self, document: &Document, file: &FileUpload) -> bool {
        let intact = document.content_hash.matches(&file.bytes);
        if !intact {
            warn!(
                document_id = %document.id,
                name = %document.name,
                "content hash mismatch, stored document may be corrupt"
            );
        }
        intact
    }

    async fn load_documents(&self, owner: &OwnerId) -> Vec<Document> {
        let key = self.namespace_key(owner);
        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "store read failed, treating namespace as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(documents) => documents,
            Err(e) => {
                warn!(key = %key, error = %e, "persisted namespace corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    async fn persist(&self, owner: &OwnerId, documents: &[Document]) -> Result<(), CacheError> {
        let key = self.namespace_key(owner);
        let raw = serde_json::to_string(documents)
            .map_err(|e| CacheError::Storage(format!("serialize namespace failed: {}", e)))?;
        self.kv
            .set(&key, &raw)
            .await
            .map_err(|e| CacheError::Storage(format!("write {} failed: {}", key, e)))
    }

    async fn delete_namespace(&self, owner: &OwnerId) -> Result<(), CacheError> {
        let key = self.namespace_key(owner);
        self.kv
            .delete(&key)
            .await
            .map_err(|e| CacheError::Storage(format!("delete {} failed: {}", key, e)))
    }
}

fn total_size(documents: &[Document]) -> u64 {
    documents.iter().map(|d| d.size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKeyValueStore;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use dv_core::document::MimeType;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct SteppingClock {
        now_ms: AtomicI64,
    }

    impl SteppingClock {
        fn new(start_ms: i64) -> Self {
            Self {
                now_ms: AtomicI64::new(start_ms),
            }
        }
    }

    impl ClockPort for SteppingClock {
        fn now_ms(&self) -> i64 {
            // Each reading advances time so uploads get distinct timestamps.
            self.now_ms.fetch_add(1_000, Ordering::SeqCst)
        }
    }

    struct FailingKeyValueStore;

    #[async_trait]
    impl KeyValuePort for FailingKeyValueStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("store unavailable"))
        }
        async fn delete(&self, _key: &str) -> Result<()> {
            Err(anyhow!("store unavailable"))
        }
        async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    const MB: u64 = 1024 * 1024;

    fn test_config() -> CacheConfig {
        CacheConfig {
            max_file_size_bytes: 5 * MB,
            max_total_size_bytes: 4 * MB,
            inline_threshold_bytes: MB,
            ..CacheConfig::default()
        }
    }

    struct Fixture {
        cache: DocumentCache,
        handles: Arc<InlineHandleRegistry>,
    }

    fn fixture_with(kv: Arc<dyn KeyValuePort>, config: CacheConfig) -> Fixture {
        let handles = Arc::new(InlineHandleRegistry::new());
        let cache = DocumentCache::new(
            kv,
            handles.clone(),
            Arc::new(SteppingClock::new(1_700_000_000_000)),
            config,
        );
        Fixture { cache, handles }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(InMemoryKeyValueStore::new()), test_config())
    }

    fn owner() -> OwnerId {
        OwnerId::normalize("11.222.333-4")
    }

    fn pdf(name: &str, size: usize) -> FileUpload {
        FileUpload::new(name, MimeType::application_pdf(), vec![0x25u8; size])
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips_hash() {
        let f = fixture();
        let file = pdf("cedula.pdf", 2048);
        let expected = ContentHash::compute(&file.bytes);

        let saved = f
            .cache
            .save(file, DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();
        let fetched = f
            .cache
            .get_by_kind(&owner(), DocumentKind::IdentityCard)
            .await
            .unwrap();

        assert_eq!(saved.content_hash, expected);
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_small_file_gets_inline_handle_large_does_not() {
        let f = fixture();
        let small = f
            .cache
            .save(pdf("small.pdf", 1024), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();
        let large = f
            .cache
            .save(
                pdf("large.pdf", 2 * MB as usize),
                DocumentKind::PowerOfAttorney,
                &owner(),
            )
            .await
            .unwrap();

        let handle = small.inline_handle.expect("small file should be inlined");
        assert!(f.handles.resolve(&handle).is_some());
        assert!(large.inline_handle.is_none());
    }

    #[tokio::test]
    async fn test_replacing_same_kind_keeps_one_document_and_releases_handle() {
        let f = fixture();
        let first = f
            .cache
            .save(pdf("v1.pdf", 512), DocumentKind::ProbateCertificate, &owner())
            .await
            .unwrap();
        let second = f
            .cache
            .save(pdf("v2.pdf", 512), DocumentKind::ProbateCertificate, &owner())
            .await
            .unwrap();

        let documents = f.cache.list(&owner()).await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].name, "v2.pdf");
        assert_eq!(f.handles.len(), 1);
        assert!(f.handles.resolve(&first.inline_handle.unwrap()).is_none());
        assert!(f.handles.resolve(&second.inline_handle.unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_rejects_file_above_max_size() {
        let f = fixture();
        let err = f
            .cache
            .save(
                pdf("huge.pdf", 6 * MB as usize),
                DocumentKind::IdentityCard,
                &owner(),
            )
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, CacheError::Validation(_)));
        assert!(message.contains("identity card"));
        assert!(message.contains("huge.pdf"));
    }

    #[tokio::test]
    async fn test_rejects_disallowed_mime_type() {
        let f = fixture();
        let file = FileUpload::new("notes.txt", MimeType("text/plain".into()), vec![1u8; 16]);
        let err = f
            .cache
            .save(file, DocumentKind::IdentityCard, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Validation(_)));
        assert!(f.handles.is_empty());
    }

    #[tokio::test]
    async fn test_quota_evicts_oldest_first_never_incoming() {
        let f = fixture();
        f.cache
            .save(pdf("a.pdf", 2 * MB as usize), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();
        f.cache
            .save(
                pdf("b.pdf", MB as usize),
                DocumentKind::PowerOfAttorney,
                &owner(),
            )
            .await
            .unwrap();

        // 2MB + 1MB stored; a 2MB upload must evict a.pdf (oldest) only.
        f.cache
            .save(
                pdf("c.pdf", 2 * MB as usize),
                DocumentKind::ProbateCertificate,
                &owner(),
            )
            .await
            .unwrap();

        let documents = f.cache.list(&owner()).await;
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert!(!names.contains(&"a.pdf"));
        assert!(names.contains(&"b.pdf"));
        assert!(names.contains(&"c.pdf"));

        let stats = f.cache.stats(&owner()).await;
        assert!(stats.total_size <= stats.max_size);
    }

    #[tokio::test]
    async fn test_eviction_scenario_two_then_three_megabytes() {
        let f = fixture();
        f.cache
            .save(pdf("first.pdf", 2 * MB as usize), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();
        f.cache
            .save(
                pdf("second.pdf", 3 * MB as usize),
                DocumentKind::PowerOfAttorney,
                &owner(),
            )
            .await
            .unwrap();

        let stats = f.cache.stats(&owner()).await;
        assert_eq!(stats.total_files, 1);
        let remaining = f
            .cache
            .get_by_kind(&owner(), DocumentKind::PowerOfAttorney)
            .await;
        assert!(remaining.is_some());
    }

    #[tokio::test]
    async fn test_oversized_single_file_still_writes() {
        // A 4.5MB file against a 4MB quota: allowed by policy, eviction
        // clears the namespace and the write proceeds anyway.
        let f = fixture();
        f.cache
            .save(pdf("old.pdf", MB as usize), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();
        f.cache
            .save(
                pdf("oversized.pdf", 4 * MB as usize + 512 * 1024),
                DocumentKind::PowerOfAttorney,
                &owner(),
            )
            .await
            .unwrap();

        let stats = f.cache.stats(&owner()).await;
        assert_eq!(stats.total_files, 1);
        assert!(stats.total_size > stats.max_size);
    }

    #[tokio::test]
    async fn test_corrupt_namespace_reads_as_empty() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let f = fixture_with(kv.clone(), test_config());
        let key = f.cache.namespace_key(&owner());
        kv.set(&key, "definitely not json").await.unwrap();

        assert!(f.cache.list(&owner()).await.is_empty());
        assert_eq!(f.cache.stats(&owner()).await.total_files, 0);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_storage_error_without_leaking_handle() {
        let f = fixture_with(Arc::new(FailingKeyValueStore), test_config());
        let err = f
            .cache
            .save(pdf("doc.pdf", 512), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Storage(_)));
        assert!(f.handles.is_empty());
    }

    #[tokio::test]
    async fn test_remove_releases_handle_and_reports_presence() {
        let f = fixture();
        f.cache
            .save(pdf("doc.pdf", 512), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();

        assert!(f.cache.remove(&owner(), DocumentKind::IdentityCard).await.unwrap());
        assert!(f.handles.is_empty());
        assert!(!f.cache.remove(&owner(), DocumentKind::IdentityCard).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_releases_every_handle() {
        let f = fixture();
        f.cache
            .save(pdf("a.pdf", 256), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();
        f.cache
            .save(pdf("b.pdf", 256), DocumentKind::PowerOfAttorney, &owner())
            .await
            .unwrap();
        assert_eq!(f.handles.len(), 2);

        f.cache.clear(&owner()).await.unwrap();
        assert!(f.cache.list(&owner()).await.is_empty());
        assert!(f.handles.is_empty());
    }

    #[tokio::test]
    async fn test_namespaces_do_not_leak_across_owners() {
        let f = fixture();
        let other = OwnerId::normalize("98.765.432-1");
        f.cache
            .save(pdf("mine.pdf", 256), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();

        assert!(f.cache.list(&other).await.is_empty());
    }

    #[tokio::test]
    async fn test_verify_integrity() {
        let f = fixture();
        let file = pdf("doc.pdf", 512);
        let saved = f
            .cache
            .save(file.clone(), DocumentKind::IdentityCard, &owner())
            .await
            .unwrap();

        assert!(f.cache.verify_integrity(&saved, &file));
        let tampered = pdf("doc.pdf", 513);
        assert!(!f.cache.verify_integrity(&saved, &tampered));
    }
}
