//! Engine configuration model with serde defaults.

pub mod defaults;
pub mod model;

pub use model::{
    ApiConfig, CacheConfig, CoordinationConfig, EngineConfig, RetrySettings,
    CURRENT_SCHEMA_VERSION,
};
