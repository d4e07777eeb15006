//! Tracing-subscriber initialization for the engine.
//!
//! Development builds default to debug level, release builds to info; both
//! can be overridden through `RUST_LOG`. The embedding shell owns any extra
//! targets (log files, crash reporting); this sets up stdout only.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Registers the global subscriber. Call once, before any engine activity.
pub fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("init tracing failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_match_build_profile() {
        let directives = default_directives();
        assert!(directives == "debug" || directives == "info");
    }
}
