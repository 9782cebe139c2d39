//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
}

impl Error {
    /// Check if the channel is unusable after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ReadTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_read_timeout_keeps_channel() {
        assert!(!Error::ReadTimeout.is_fatal());
        assert!(Error::ConnectionClosed.is_fatal());
        assert!(Error::NotConnected.is_fatal());
        assert!(Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_fatal());
    }
}
