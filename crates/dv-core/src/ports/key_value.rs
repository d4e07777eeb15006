use anyhow::Result;
use async_trait::async_trait;

/// Durable key/value side-channel, surviving reloads.
///
/// This is the only persistence surface the engine touches; callers never see
/// raw backend keys. Concurrent writers to the same key are not synchronized:
/// the contract is last-writer-wins, which the single-active-namespace usage
/// pattern makes acceptable.
#[async_trait]
pub trait KeyValuePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// All stored keys starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
