//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! Only [`Error::Config`] is fatal. Every other kind is recovered by the
//! engine, which logs it and waits for the error interval.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file unreadable, malformed or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interface missing or address enumeration failed at the OS level
    #[error("Address lookup error: {0}")]
    Lookup(String),

    /// Enumeration succeeded but no qualifying address is bound
    #[error("Address not found: {0}")]
    NotFound(String),

    /// Network-layer failure or malformed response from the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider API reported a failure
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an address lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error should stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
