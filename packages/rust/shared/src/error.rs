//! Error types for songpress.
//!
//! Library crates use [`SongpressError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all songpress operations.
#[derive(Debug, thiserror::Error)]
pub enum SongpressError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to a provider or the oracle.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or content extraction error.
    #[error("extract error: {message}")]
    Extract { message: String },

    /// Text-generation oracle error (request, API, or response shape).
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Document rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Delivery-layer error (sending a message or document to the user).
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty query, malformed record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SongpressError>;

impl SongpressError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extract error from any displayable message.
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SongpressError::config("missing oracle API key");
        assert_eq!(err.to_string(), "config error: missing oracle API key");

        let err = SongpressError::validation("empty query");
        assert!(err.to_string().contains("empty query"));

        let err = SongpressError::Oracle("HTTP 503".into());
        assert_eq!(err.to_string(), "oracle error: HTTP 503");
    }
}
