// Logging setup.
// Installs the global tracing subscriber for embedding binaries and tools.

use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{Result, SyncError};

/// Filter used when neither `RUST_LOG` nor the caller supplies one.
pub const DEFAULT_FILTER: &str = "sheetsync=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `filter`.
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init(filter: &str) -> Result<()> {
    let env_filter = build_filter(filter)?;
    fmt()
        .with_env_filter(env_filter)
        .with_target(cfg!(debug_assertions))
        .try_init()
        .map_err(|e| SyncError::Other(format!("logging already initialized: {}", e)))
}

fn build_filter(filter: &str) -> Result<EnvFilter> {
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        return Ok(env_filter);
    }
    let directive = if filter.trim().is_empty() {
        DEFAULT_FILTER
    } else {
        filter
    };
    EnvFilter::try_new(directive)
        .map_err(|e| SyncError::Config(format!("invalid log filter {:?}: {}", directive, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filter_uses_default() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_filter("").is_ok());
        assert!(build_filter("sheetsync=debug,reqwest=warn").is_ok());
    }
}
