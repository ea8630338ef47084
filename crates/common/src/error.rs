//! Error types shared across Attentive crates.
//!
//! Missing faces, unfinished calibration and short windows are not errors:
//! the analyzers answer those with neutral values. Only caller misuse,
//! invalid configuration and upstream resource failures surface here.

use std::path::PathBuf;

/// Top-level error type for Attentive operations.
#[derive(Debug, thiserror::Error)]
pub enum AttentiveError {
    #[error("Landmark source error: {message}")]
    Source { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Worker did not stop within {waited_ms}ms")]
    StopTimeout { waited_ms: u64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Landmark layout error: {message}")]
    Layout { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using AttentiveError.
pub type AttentiveResult<T> = Result<T, AttentiveError>;

impl AttentiveError {
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AttentiveError::config("weights sum to 1.2");
        assert_eq!(err.to_string(), "Configuration error: weights sum to 1.2");

        let err = AttentiveError::StopTimeout { waited_ms: 250 };
        assert_eq!(err.to_string(), "Worker did not stop within 250ms");
    }
}
