//! Layered configuration loading: baked-in defaults, then an optional
//! config file, then `DOCVAULT`-prefixed environment overrides
//! (e.g. `DOCVAULT_CACHE__MAX_TOTAL_SIZE_BYTES=4194304`).

use std::path::Path;

use anyhow::{Context, Result};
use dv_core::config::EngineConfig;

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let defaults = config::Config::try_from(&EngineConfig::default())
        .context("serialize default config failed")?;

    let mut builder = config::Config::builder().add_source(defaults);
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("DOCVAULT").separator("__"));

    builder
        .build()
        .context("assemble configuration failed")?
        .try_deserialize()
        .context("deserialize configuration failed")
}
