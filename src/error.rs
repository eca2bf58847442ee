//! Error types for the gesture control loop.
//!
//! A missing or partial hand is not an error: ingestion yields `None` and the
//! controller answers with [`GestureVerdict::None`](crate::gesture::GestureVerdict::None).
//! Out-of-range coordinates are clamped by the cursor mapper and never
//! surface here either.

use thiserror::Error;

/// Result type for control-loop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Control-loop error types
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration. Fatal: no controller is built from it.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input-injection backend rejected a call
    #[error("Input injection failed during {action}: {reason}")]
    Injection {
        /// Sink operation that failed (e.g. "move_to", "click")
        action: &'static str,
        /// Backend-provided reason
        reason: String,
    },

    /// A landmark record could not be decoded
    #[error("Landmark stream error at line {line}: {reason}")]
    LandmarkStream {
        /// 1-based line number in the stream
        line: usize,
        /// Decoder message
        reason: String,
    },

    /// TOML encode/decode error
    #[error("TOML error: {0}")]
    Toml(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error classification for recovery strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Configuration errors
    Configuration,
    /// Injection backend errors
    Injection,
    /// Landmark provider errors
    Provider,
    /// IO and encoding errors
    Io,
}

impl Error {
    /// Build an injection error from any backend error
    pub fn injection(action: &'static str, reason: impl ToString) -> Self {
        Error::Injection {
            action,
            reason: reason.to_string(),
        }
    }

    /// Classify the error
    pub fn error_type(&self) -> ErrorType {
        match self {
            Error::Config(_) => ErrorType::Configuration,
            Error::Injection { .. } => ErrorType::Injection,
            Error::LandmarkStream { .. } => ErrorType::Provider,
            Error::Toml(_) | Error::Io(_) | Error::Serialization(_) => ErrorType::Io,
        }
    }

    /// Whether the loop may drop the current frame and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.error_type(),
            ErrorType::Injection | ErrorType::Provider
        )
    }
}
