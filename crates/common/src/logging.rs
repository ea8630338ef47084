//! Tracing subscriber setup.
//!
//! Logs go to stderr so reports printed on stdout (`--json`) stay parseable.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// `RUST_LOG` when set, otherwise the configured level. A level string that
/// does not parse falls back to `info`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber described by `config`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().with_target(false).try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_rejected() {
        init_logging(&LoggingConfig::default());
        let json = LoggingConfig {
            json: true,
            ..LoggingConfig::default()
        };
        assert!(!init_logging(&json));
    }
}
