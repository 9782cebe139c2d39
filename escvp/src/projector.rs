//! High-level projector interface

use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use escvp_core::constants::{DEFAULT_HANDSHAKE_WINDOW, DEFAULT_READ_TIMEOUT, MAX_READ_SIZE};
use escvp_core::response::classify;
use escvp_core::{
    frame, Classification, Command, CommandId, Response, Session, SessionState, Target,
};
use escvp_transport::Transport;
use escvp_types::{Key, PowerStatus, ProjectorInfo, Source, VolumeLevel};

use crate::error::{Error, Result};

/// ESC/VP.net projector
///
/// High-level interface for driving a projector over TCP or a serial line.
/// All methods take `&self`; commands issued concurrently are sent one at a
/// time, each waiting for its reply before the next is written.
///
/// # Examples
///
/// ```no_run
/// use escvp::{Projector, Target};
///
/// #[tokio::main]
/// async fn main() -> escvp::Result<()> {
///     let projector = Projector::new(Target::tcp("192.168.0.150", 3629));
///
///     projector.connect().await?;
///     println!("Power: {}", projector.power_status().await?);
///
///     projector.close().await?;
///     Ok(())
/// }
/// ```
pub struct Projector {
    transport: Mutex<Box<dyn Transport>>,
    session: Session,
    read_timeout: Duration,
    handshake_window: Duration,
}

impl Projector {
    /// Create a projector for a target (TCP or serial)
    pub fn new(target: Target) -> Self {
        Self::with_transport(escvp_transport::for_target(&target))
    }

    /// Create a projector reachable over TCP
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::new(Target::tcp(host, port))
    }

    /// Create a projector on a serial line
    pub fn serial(path: impl Into<String>, baud_rate: u32) -> Self {
        Self::new(Target::serial(path, baud_rate))
    }

    /// Create a projector on a preconfigured transport
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport: Mutex::new(transport),
            session: Session::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            handshake_window: DEFAULT_HANDSHAKE_WINDOW,
        }
    }

    /// Set how long to wait for each reply
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set how long to drain the handshake acknowledgement
    pub fn with_handshake_window(mut self, window: Duration) -> Self {
        self.handshake_window = window;
        self
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Check if commands can be sent
    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    /// Open the transport and send the handshake
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`] if the transport cannot be opened
    /// - [`Error::Io`] if the handshake cannot be written
    /// - [`Error::ProtocolState`] if already connected
    pub async fn connect(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;

        match self.session.state() {
            SessionState::Disconnected => {}
            SessionState::Handshaking => {
                warn!("Previous connect was interrupted, starting over");
                self.teardown(&mut transport).await;
            }
            state @ SessionState::Ready => {
                return Err(Error::ProtocolState {
                    state,
                    operation: "connect",
                });
            }
        }

        self.open(&mut transport).await
    }

    /// Send one command and wait for its reply
    ///
    /// # Errors
    ///
    /// - [`Error::ProtocolState`] before `connect` or after `close`; nothing is written
    /// - [`Error::Timeout`] if the device stays silent (session stays ready)
    /// - [`Error::Device`] if the device answers `Err`
    /// - [`Error::MalformedResponse`] if a reply starts but never completes
    /// - [`Error::Io`] if the channel breaks (session is closed)
    pub async fn send(&self, command: &Command) -> Result<Response> {
        let mut transport = self.transport.lock().await;

        let state = self.session.state();
        if state != SessionState::Ready {
            return Err(Error::ProtocolState {
                state,
                operation: "send",
            });
        }

        if self.session.has_abandoned_exchange() {
            warn!("Previous command was interrupted, reconnecting to resynchronize");
            self.teardown(&mut transport).await;
            self.open(&mut transport).await?;
        }

        self.exchange(&mut transport, command).await
    }

    /// Send a catalog command
    pub async fn send_id(&self, id: CommandId) -> Result<Response> {
        self.send(&Command::new(id)).await
    }

    /// Send a catalog command looked up by symbolic name
    pub async fn send_named(&self, name: &str) -> Result<Response> {
        let id = CommandId::from_name(name).map_err(|_| Error::UnknownCommand(name.to_string()))?;
        self.send_id(id).await
    }

    /// Close the session and release the transport
    ///
    /// Closing an already closed projector does nothing.
    pub async fn close(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;

        let state = self.session.close();
        if state == SessionState::Disconnected {
            return Ok(());
        }

        info!("Disconnecting from {}...", transport.remote_addr());

        transport.disconnect().await.map_err(|source| Error::Io {
            state: SessionState::Disconnected,
            source,
        })?;

        info!("Disconnected");
        Ok(())
    }

    // Typed commands

    /// Turn the lamp on
    pub async fn power_on(&self) -> Result<()> {
        self.send_id(CommandId::PowerOn).await.map(drop)
    }

    /// Switch to standby
    pub async fn power_off(&self) -> Result<()> {
        self.send_id(CommandId::PowerOff).await.map(drop)
    }

    /// Query the power state
    pub async fn power_status(&self) -> Result<PowerStatus> {
        let command = Command::new(CommandId::PowerQuery);
        let response = self.send(&command).await?;

        response
            .status
            .as_ref()
            .and_then(|status| status.power())
            .ok_or_else(|| malformed(&command, &response))
    }

    /// Raise the volume by one step
    pub async fn volume_up(&self) -> Result<()> {
        self.send_id(CommandId::VolumeUp).await.map(drop)
    }

    /// Lower the volume by one step
    pub async fn volume_down(&self) -> Result<()> {
        self.send_id(CommandId::VolumeDown).await.map(drop)
    }

    /// Query the raw volume value (`0..=248`)
    pub async fn volume(&self) -> Result<u16> {
        let value = self.query_value(CommandId::VolumeQuery).await?;
        value
            .parse::<u16>()
            .map_err(|e| escvp_types::Error::Parse(format!("bad volume {:?}: {}", value, e)).into())
    }

    /// Query the volume on the on-screen scale (`0..=40`)
    pub async fn volume_level(&self) -> Result<VolumeLevel> {
        Ok(VolumeLevel::from_raw(self.volume().await?))
    }

    /// Step the volume towards `target`, re-reading it after every step
    ///
    /// Each `VOL INC` / `VOL DEC` is sent once and never retried. Stepping
    /// stops at the target or as soon as a step brings the volume no closer
    /// to it; the level actually reached is returned.
    ///
    /// # Errors
    ///
    /// Any failed step or query ends stepping with that error.
    pub async fn set_volume(&self, target: VolumeLevel) -> Result<VolumeLevel> {
        let mut current = self.volume_level().await?;

        while current != target {
            let id = if current < target {
                CommandId::VolumeUp
            } else {
                CommandId::VolumeDown
            };
            self.send_id(id).await?;

            let next = self.volume_level().await?;
            if next.distance(target) >= current.distance(target) {
                warn!("Volume stopped at {} on the way to {}", next, target);
                return Ok(next);
            }
            current = next;
        }

        debug!("Volume at {}", current);
        Ok(current)
    }

    /// Mute or unmute audio and video
    pub async fn mute(&self, on: bool) -> Result<()> {
        let id = if on { CommandId::MuteOn } else { CommandId::MuteOff };
        self.send_id(id).await.map(drop)
    }

    /// Switch to an input source
    pub async fn select_source(&self, source: Source) -> Result<()> {
        self.send_id(source.into()).await.map(drop)
    }

    /// Query the current source, `None` for inputs outside [`Source`]
    pub async fn source(&self) -> Result<Option<Source>> {
        let value = self.query_value(CommandId::SourceQuery).await?;
        Ok(Source::from_code(&value))
    }

    /// Emulate a remote control key press
    pub async fn press_key(&self, key: Key) -> Result<()> {
        self.send_id(key.into()).await.map(drop)
    }

    /// Query the device's last error code (`00` when none)
    pub async fn error_query(&self) -> Result<u8> {
        let value = self.query_value(CommandId::ErrorQuery).await?;
        u8::from_str_radix(&value, 16)
            .map_err(|e| escvp_types::Error::Parse(format!("bad error code {:?}: {}", value, e)).into())
    }

    /// Collect name, serial number and hour counters
    ///
    /// Hour counters are left empty on models that reject the query.
    pub async fn info(&self) -> Result<ProjectorInfo> {
        let name = self.query_value(CommandId::ProjectorNameQuery).await?;
        let serial_number = self.query_value(CommandId::SerialNumberQuery).await?;

        let mut info = ProjectorInfo::new(name, serial_number);
        info.lamp_hours = self.query_hours(CommandId::LampHoursQuery).await?;
        info.operating_hours = self.query_hours(CommandId::OperatingTimeQuery).await?;

        debug!("Projector info: {}", info);

        Ok(info)
    }

    // Helper methods

    async fn query_value(&self, id: CommandId) -> Result<String> {
        let command = Command::new(id);
        let response = self.send(&command).await?;

        response
            .status
            .as_ref()
            .and_then(|status| status.value())
            .map(str::to_string)
            .ok_or_else(|| malformed(&command, &response))
    }

    async fn query_hours(&self, id: CommandId) -> Result<Option<u32>> {
        match self.query_value(id).await {
            Ok(value) => Ok(Some(ProjectorInfo::parse_hours(&value)?)),
            Err(Error::Device { .. }) => {
                debug!("{} not supported", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn open(&self, transport: &mut Box<dyn Transport>) -> Result<()> {
        info!("Connecting to {}...", transport.remote_addr());

        transport.connect().await.map_err(|source| Error::Connect {
            target: transport.remote_addr(),
            source,
        })?;

        self.session.begin_handshake()?;

        let handshake = frame::encode(&Command::new(CommandId::Handshake));
        if let Err(source) = transport.send(&handshake).await {
            return Err(self.fail(transport, source).await);
        }

        // Acknowledgement format varies between models; drain whatever comes back
        match transport.receive(MAX_READ_SIZE, self.handshake_window).await {
            Ok(ack) => trace!("Handshake reply: {:02X?}", &ack[..]),
            Err(source) if !source.is_fatal() => trace!("No handshake reply: {}", source),
            Err(source) => return Err(self.fail(transport, source).await),
        }

        self.session.mark_ready()?;

        info!("Connected to {}", transport.remote_addr());

        Ok(())
    }

    async fn exchange(&self, transport: &mut Box<dyn Transport>, command: &Command) -> Result<Response> {
        let framed = frame::encode(command);

        if let Err(source) = transport.clear_input().await {
            return Err(self.fail(transport, source).await);
        }

        let sequence = self.session.begin_exchange();
        debug!("[{}] Sending {}", sequence, command);

        if let Err(source) = transport.send(&framed).await {
            return Err(self.fail(transport, source).await);
        }

        let raw = match self.read_reply(transport).await {
            Ok(raw) => raw.freeze(),
            Err(source) => return Err(self.fail(transport, source).await),
        };

        self.session.end_exchange();

        debug!("[{}] Reply: {}", sequence, raw.escape_ascii());

        match classify(&raw) {
            Classification::Ok => Ok(Response::decode(raw.clone(), command.status_table())
                .unwrap_or_else(|e| {
                    warn!("Cannot decode reply to {}: {}", command, e);
                    Response { raw, status: None }
                })),
            Classification::Timeout => Err(Error::Timeout {
                command: command.to_string(),
                after: self.read_timeout,
            }),
            Classification::DeviceError => Err(Error::Device {
                command: command.to_string(),
                raw,
            }),
            Classification::Malformed => Err(Error::MalformedResponse {
                command: command.to_string(),
                raw,
            }),
        }
    }

    /// Collect reads until a full reply or the deadline
    async fn read_reply(
        &self,
        transport: &mut Box<dyn Transport>,
    ) -> escvp_transport::Result<BytesMut> {
        let deadline = Instant::now() + self.read_timeout;
        let mut reply = BytesMut::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match transport.receive(MAX_READ_SIZE, remaining).await {
                Ok(chunk) => {
                    reply.extend_from_slice(&chunk);
                    if frame::is_complete(&reply) {
                        break;
                    }
                }
                Err(e) if !e.is_fatal() => break,
                Err(e) => return Err(e),
            }
        }

        Ok(reply)
    }

    /// Close after a fatal transport error
    async fn fail(&self, transport: &mut Box<dyn Transport>, source: escvp_transport::Error) -> Error {
        let state = self.session.state();
        warn!("Transport failure while {:?}: {}", state, source);

        self.teardown(transport).await;

        Error::Io { state, source }
    }

    async fn teardown(&self, transport: &mut Box<dyn Transport>) {
        self.session.close();
        if let Err(e) = transport.disconnect().await {
            warn!("Failed to close transport: {}", e);
        }
    }
}

fn malformed(command: &Command, response: &Response) -> Error {
    Error::MalformedResponse {
        command: command.to_string(),
        raw: response.raw.clone(),
    }
}
