//! Serial transport for ESC/VP.net
//!
//! RS-232 control uses the same command set as the network port, at
//! 9600 baud 8N1 by default. No handshake token is required on a serial
//! line but sending one is harmless.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream,
    StopBits,
};
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Line settings for a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

/// Serial transport for RS-232 connected projectors
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    settings: SerialSettings,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            settings: SerialSettings::default(),
            stream: None,
        }
    }

    /// Set line settings
    pub fn with_settings(mut self, settings: SerialSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> SerialSettings {
        self.settings
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!("Opening {} at {} baud...", self.path, self.baud_rate);

        let stream = tokio_serial::new(&self.path, self.baud_rate)
            .data_bits(self.settings.data_bits)
            .parity(self.settings.parity)
            .stop_bits(self.settings.stop_bits)
            .flow_control(self.settings.flow_control)
            .open_native_async()?;

        debug!(
            "Opened {} ({:?}, {:?}, {:?}, flow control {:?})",
            self.path,
            self.settings.data_bits,
            self.settings.parity,
            self.settings.stop_bits,
            self.settings.flow_control
        );

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Closing {}...", self.remote_addr());

            let _ = stream.flush().await;
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Writing {} bytes: {:02X?}", data.len(), &data[..data.len().min(32)]);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn receive(&mut self, max_bytes: usize, deadline: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(max_bytes);
        buf.resize(max_bytes, 0);

        let n = timeout(deadline, stream.read(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)?
            .map_err(Error::Io)?;

        if n == 0 {
            return Err(Error::ConnectionClosed);
        }

        buf.truncate(n);

        trace!("Read {} bytes: {:02X?}", n, &buf[..n.min(32)]);

        Ok(buf)
    }

    async fn clear_input(&mut self) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let pending = stream.bytes_to_read()? as usize;
        stream.clear(ClearBuffer::Input)?;

        if pending > 0 {
            debug!("Discarded {} stale bytes from {}", pending, self.path);
        }

        Ok(pending)
    }

    fn remote_addr(&self) -> String {
        format!("{}@{}", self.path, self.baud_rate)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still open");
        }
    }
}
