//! High-level error types

use std::time::Duration;

use bytes::Bytes;
use escvp_core::{CommandId, SessionState};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport could not be opened
    #[error("Cannot connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: escvp_transport::Error,
    },

    /// No reply before the read deadline; the session is still usable
    #[error("No reply to {command} within {after:?}")]
    Timeout { command: String, after: Duration },

    /// Device answered with its error marker
    #[error("Device rejected {command}: {}", .raw.escape_ascii())]
    Device { command: String, raw: Bytes },

    /// Operation called in the wrong session state
    #[error("Cannot {operation} while {state:?}")]
    ProtocolState {
        state: SessionState,
        operation: &'static str,
    },

    /// Channel broke; the session has been closed
    #[error("I/O failure while {state:?}: {source}")]
    Io {
        state: SessionState,
        #[source]
        source: escvp_transport::Error,
    },

    /// Reply started but never completed, or did not decode
    #[error("Malformed reply to {command}: {}", .raw.escape_ascii())]
    MalformedResponse { command: String, raw: Bytes },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} is already queued")]
    AlreadyQueued(CommandId),

    #[error("Command queue is closed")]
    QueueClosed,

    #[error("Core protocol error: {0}")]
    Core(#[from] escvp_core::Error),

    #[error("Type error: {0}")]
    Types(#[from] escvp_types::Error),
}

impl Error {
    /// Check if the session is still usable (retrying may succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Device { .. } | Self::MalformedResponse { .. }
        )
    }

    /// Check if a fresh `connect` is needed
    pub fn requires_reconnect(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Io { .. })
    }
}
