//! Error types for escvp-core

use crate::session::SessionState;

/// Result type alias for escvp-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No catalog entry with this name
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Illegal session state transition
    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidSessionState {
        from: SessionState,
        to: SessionState,
    },

    /// Reply could not be decoded for the command's status table
    #[error("Malformed reply: {0}")]
    Malformed(String),

    /// Connection target string could not be parsed
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Decoded value was out of range
    #[error("Type error: {0}")]
    Types(#[from] escvp_types::Error),
}
