//! Structured logging configuration.
//!
//! Sets up the `tracing` subscriber with an `EnvFilter` (`RUST_LOG` wins
//! over the configured level) and either plain or JSON output.

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Tracing configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Initialize tracing with the given level and output format.
///
/// # Panics
///
/// Panics if a global tracing subscriber has already been installed in this
/// process.
pub fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        let json_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_target(true);

        Registry::default().with(env_filter).with(fmt_layer).init();
    }

    tracing::debug!("Tracing initialized: level={}, json={}", level, json);
}

/// Get current tracing configuration from environment variables.
///
/// Respects these environment variables:
/// - `TREEMIRROR_LOG_LEVEL` - Log level (default: "info")
/// - `TREEMIRROR_LOG_JSON` - Enable JSON output (default: false)
#[must_use]
pub fn config_from_env() -> TracingConfig {
    let level = std::env::var("TREEMIRROR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let json = std::env::var("TREEMIRROR_LOG_JSON")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false);

    TracingConfig { level, json }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_default() {
        let config = TracingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    // No other test reads or writes these variables.
    #[test]
    fn test_config_from_env() {
        std::env::remove_var("TREEMIRROR_LOG_LEVEL");
        std::env::remove_var("TREEMIRROR_LOG_JSON");
        assert_eq!(config_from_env(), TracingConfig::default());

        std::env::set_var("TREEMIRROR_LOG_LEVEL", "debug");
        std::env::set_var("TREEMIRROR_LOG_JSON", "YES");
        let config = config_from_env();
        assert_eq!(config.level, "debug");
        assert!(config.json);

        std::env::set_var("TREEMIRROR_LOG_JSON", "off");
        assert!(!config_from_env().json);

        std::env::remove_var("TREEMIRROR_LOG_LEVEL");
        std::env::remove_var("TREEMIRROR_LOG_JSON");
    }
}
