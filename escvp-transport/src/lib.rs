//! Transport layer for ESC/VP.net
//!
//! Provides TCP and serial communication with projectors.

pub mod error;
pub mod serial;
pub mod tcp;

pub use error::{Error, Result};
pub use serial::{SerialSettings, SerialTransport};
pub use tcp::TcpTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use escvp_core::Target;

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send {
    /// Open the channel
    async fn connect(&mut self) -> Result<()>;

    /// Close the channel (idempotent)
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send all of `data`
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive up to `max_bytes`, waiting at most `deadline`
    ///
    /// Fails with [`Error::ReadTimeout`] when nothing arrives in time.
    async fn receive(&mut self, max_bytes: usize, deadline: Duration) -> Result<BytesMut>;

    /// Discard bytes already received but not read, returning how many
    async fn clear_input(&mut self) -> Result<usize>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}

/// Build the transport for a target, not yet connected
pub fn for_target(target: &Target) -> Box<dyn Transport> {
    match target {
        Target::Tcp { host, port } => Box::new(TcpTransport::new(host.clone(), *port)),
        Target::Serial { path, baud_rate } => {
            Box::new(SerialTransport::new(path.clone(), *baud_rate))
        }
    }
}
