//! Error handling - one hierarchy for the whole client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Client error hierarchy
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed numeric field, unknown enumeration value or missing argument
    #[error("Validation error: {0}")]
    Validation(String),

    /// Command references a ClOrdId that is not in the cache
    #[error("Unknown ClOrdId (not in cache): {0}")]
    UnknownOrder(String),

    /// Status request still lacks OrderId, Side or Symbol after cache fill
    #[error("Need OrderId, Side and Symbol for {0} (not cached)")]
    IncompleteStatus(String),

    /// Cache file errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outbound session errors
    #[error("Session error: {0}")]
    Session(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
