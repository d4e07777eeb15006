//! # dv-infra
//!
//! Infrastructure adapters for DocVault: key/value stores, the Document
//! Cache and its inline-handle registry, the storage janitor, the retry
//! executor, the local broadcast channel, the system clock, configuration
//! loading, the upstream succession-API client, and an in-memory context
//! opener for tests and development harnesses.

pub mod api;
pub mod bus;
pub mod cache;
pub mod janitor;
pub mod kv;
pub mod opener;
pub mod retry;
pub mod settings;
pub mod time;

pub use api::SuccessionApiClient;
pub use bus::LocalBroadcastChannel;
pub use cache::{DocumentCache, InlineHandleRegistry};
pub use janitor::StorageJanitor;
pub use kv::{FileKeyValueStore, InMemoryKeyValueStore};
pub use opener::{InMemoryContextOpener, SimulatedContext};
pub use retry::with_retry;
pub use time::SystemClock;
