//! ESC/VP.net command catalog

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use escvp_types::{Key, Source};

use crate::constants::HANDSHAKE;
use crate::error::{Error, Result};

/// Symbolic names for the supported commands
///
/// The discriminant indexes [`CATALOG`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum CommandId {
    // Session
    Handshake,

    // System control
    PowerQuery,
    PowerOff,
    PowerOn,
    MuteOn,
    MuteOff,
    MuteQuery,
    VolumeUp,
    VolumeDown,
    VolumeQuery,
    SourceHdmi1,
    SourceHdmi2,
    SourceHdmi3,
    SourceHdmiLan,
    SourceQuery,
    SourceListQuery,

    // System information
    ProjectorNameQuery,
    SerialNumberQuery,
    ErrorQuery,
    LampHoursQuery,
    OperatingTimeQuery,
    SignalStatusQuery,

    // Image control
    NaturalColorMode,
    HorizontalReverseOn,
    HorizontalReverseOff,
    HorizontalReverseQuery,
    VerticalReverseOn,
    VerticalReverseOff,
    VerticalReverseQuery,
    BrightnessUp,
    BrightnessDown,
    BrightnessQuery,
    IlluminationOn,
    IlluminationOff,
    IlluminationQuery,

    // Remote keys
    KeyPower,
    KeyMenu,
    KeyUp,
    KeyDown,
    KeyLeft,
    KeyRight,
    KeyEnter,
    KeyHome,
    KeyVolumeUp,
    KeyVolumeDown,
    KeyAvMuteBlank,
    KeyKeysTone,
    KeyHdmiLink,
    KeyPlay,
    KeyStop,
    KeyPause,
    KeyRewind,
    KeyFastForward,
    KeyBackward,
    KeyForward,
    KeyMute,
    KeyLinkMenu,

    // IR pointer keys
    IrHome,
    IrEsc,
    IrEnter,
    IrPointerUp,
    IrPointerDown,
    IrPointerLeft,
    IrPointerRight,
}

/// One row of the static command table
#[derive(Debug)]
pub struct CatalogEntry {
    pub id: CommandId,
    pub name: &'static str,
    pub payload: &'static [u8],
}

const fn entry(id: CommandId, name: &'static str, payload: &'static [u8]) -> CatalogEntry {
    CatalogEntry { id, name, payload }
}

/// Static command table, in [`CommandId`] order
pub static CATALOG: &[CatalogEntry] = &[
    entry(CommandId::Handshake, "handshake", HANDSHAKE),
    entry(CommandId::PowerQuery, "power_query", b"PWR?"),
    entry(CommandId::PowerOff, "power_off", b"PWR OFF"),
    entry(CommandId::PowerOn, "power_on", b"PWR ON"),
    entry(CommandId::MuteOn, "mute_on", b"MUTE ON"),
    entry(CommandId::MuteOff, "mute_off", b"MUTE OFF"),
    entry(CommandId::MuteQuery, "mute_query", b"MUTE?"),
    entry(CommandId::VolumeUp, "volume_up", b"VOL INC"),
    entry(CommandId::VolumeDown, "volume_down", b"VOL DEC"),
    entry(CommandId::VolumeQuery, "volume_query", b"VOL?"),
    entry(CommandId::SourceHdmi1, "source_hdmi1", b"SOURCE 30"),
    entry(CommandId::SourceHdmi2, "source_hdmi2", b"SOURCE A0"),
    entry(CommandId::SourceHdmi3, "source_hdmi3", b"SOURCE C0"),
    entry(CommandId::SourceHdmiLan, "source_hdmi_lan", b"SOURCE 53"),
    entry(CommandId::SourceQuery, "source_query", b"SOURCE?"),
    entry(CommandId::SourceListQuery, "source_list_query", b"SOURCELISTA?"),
    entry(CommandId::ProjectorNameQuery, "projector_name_query", b"NWPNAME?"),
    entry(CommandId::SerialNumberQuery, "serial_number_query", b"SNO?"),
    entry(CommandId::ErrorQuery, "error_query", b"ERR?"),
    entry(CommandId::LampHoursQuery, "lamp_hours_query", b"LAMP?"),
    entry(CommandId::OperatingTimeQuery, "operating_time_query", b"ONTIME?"),
    entry(CommandId::SignalStatusQuery, "signal_status_query", b"SIGNAL?"),
    entry(CommandId::NaturalColorMode, "natural_color_mode", b"CMODE 07"),
    entry(CommandId::HorizontalReverseOn, "horizontal_reverse_on", b"HREVERSE ON"),
    entry(CommandId::HorizontalReverseOff, "horizontal_reverse_off", b"HREVERSE OFF"),
    entry(CommandId::HorizontalReverseQuery, "horizontal_reverse_query", b"HREVERSE?"),
    entry(CommandId::VerticalReverseOn, "vertical_reverse_on", b"VREVERSE ON"),
    entry(CommandId::VerticalReverseOff, "vertical_reverse_off", b"VREVERSE OFF"),
    entry(CommandId::VerticalReverseQuery, "vertical_reverse_query", b"VREVERSE?"),
    entry(CommandId::BrightnessUp, "brightness_up", b"BRIGHT INC"),
    entry(CommandId::BrightnessDown, "brightness_down", b"BRIGHT DEC"),
    entry(CommandId::BrightnessQuery, "brightness_query", b"BRIGHT?"),
    entry(CommandId::IlluminationOn, "illumination_on", b"ILLUM 01"),
    entry(CommandId::IlluminationOff, "illumination_off", b"ILLUM 00"),
    entry(CommandId::IlluminationQuery, "illumination_query", b"ILLUM?"),
    entry(CommandId::KeyPower, "key_power", b"KEY 01"),
    entry(CommandId::KeyMenu, "key_menu", b"KEY 03"),
    entry(CommandId::KeyUp, "key_up", b"KEY 35"),
    entry(CommandId::KeyDown, "key_down", b"KEY 36"),
    entry(CommandId::KeyLeft, "key_left", b"KEY 37"),
    entry(CommandId::KeyRight, "key_right", b"KEY 38"),
    entry(CommandId::KeyEnter, "key_enter", b"KEY 16"),
    entry(CommandId::KeyHome, "key_home", b"KEY 04"),
    entry(CommandId::KeyVolumeUp, "key_volume_up", b"KEY 56"),
    entry(CommandId::KeyVolumeDown, "key_volume_down", b"KEY 57"),
    entry(CommandId::KeyAvMuteBlank, "key_av_mute_blank", b"KEY 3E"),
    entry(CommandId::KeyKeysTone, "key_keys_tone", b"KEY C8"),
    entry(CommandId::KeyHdmiLink, "key_hdmi_link", b"KEY 8E"),
    entry(CommandId::KeyPlay, "key_play", b"KEY D1"),
    entry(CommandId::KeyStop, "key_stop", b"KEY D2"),
    entry(CommandId::KeyPause, "key_pause", b"KEY D3"),
    entry(CommandId::KeyRewind, "key_rewind", b"KEY D4"),
    entry(CommandId::KeyFastForward, "key_fast_forward", b"KEY D5"),
    entry(CommandId::KeyBackward, "key_backward", b"KEY D6"),
    entry(CommandId::KeyForward, "key_forward", b"KEY D7"),
    entry(CommandId::KeyMute, "key_mute", b"KEY D8"),
    entry(CommandId::KeyLinkMenu, "key_link_menu", b"KEY D9"),
    entry(CommandId::IrHome, "ir_home", b"KEY 30"),
    entry(CommandId::IrEsc, "ir_esc", b"KEY 3D"),
    entry(CommandId::IrEnter, "ir_enter", b"KEY 49"),
    entry(CommandId::IrPointerUp, "ir_pointer_up", b"KEY 58"),
    entry(CommandId::IrPointerDown, "ir_pointer_down", b"KEY 59"),
    entry(CommandId::IrPointerLeft, "ir_pointer_left", b"KEY 5A"),
    entry(CommandId::IrPointerRight, "ir_pointer_right", b"KEY 5B"),
];

/// How a command's reply is decoded
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusTable {
    /// Bare `:` acknowledgement
    Ack,

    /// `PWR=nn` power literals
    Power,

    /// Generic `KEY=VALUE` reply
    Value,
}

impl CommandId {
    fn entry(self) -> &'static CatalogEntry {
        &CATALOG[self as usize]
    }

    /// Symbolic name (`power_query`, `key_menu`, ...)
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Wire payload without terminator
    pub fn payload(self) -> &'static [u8] {
        self.entry().payload
    }

    /// Check if this command asks the device for a value
    pub fn is_query(self) -> bool {
        self.payload().ends_with(b"?")
    }

    /// Reply decoding for this command
    pub fn status_table(self) -> Option<StatusTable> {
        match self {
            Self::Handshake => None,
            Self::PowerQuery => Some(StatusTable::Power),
            id if id.is_query() => Some(StatusTable::Value),
            _ => Some(StatusTable::Ack),
        }
    }

    /// Look up a catalog entry by symbolic name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self> {
        CATALOG
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.id)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))
    }

    /// Look up a catalog entry by wire payload
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        CATALOG.iter().find(|e| e.payload == payload).map(|e| e.id)
    }

    /// Map a value reply back to the setter it echoes
    ///
    /// `SOURCE=30\r:` is the state `SOURCE 30` puts the device in.
    pub fn from_reply(reply: &[u8]) -> Option<Self> {
        let mut line = reply;
        while let [rest @ .., b':' | b'\r'] = line {
            line = rest;
        }

        let payload: Vec<u8> = line
            .iter()
            .map(|&b| if b == b'=' { b' ' } else { b })
            .collect();

        Self::from_payload(&payload)
    }
}

impl FromStr for CommandId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Source> for CommandId {
    fn from(source: Source) -> Self {
        match source {
            Source::Hdmi1 => Self::SourceHdmi1,
            Source::Hdmi2 => Self::SourceHdmi2,
            Source::Hdmi3 => Self::SourceHdmi3,
            Source::HdmiLan => Self::SourceHdmiLan,
        }
    }
}

impl From<Key> for CommandId {
    fn from(key: Key) -> Self {
        match key {
            Key::Power => Self::KeyPower,
            Key::Menu => Self::KeyMenu,
            Key::Up => Self::KeyUp,
            Key::Down => Self::KeyDown,
            Key::Left => Self::KeyLeft,
            Key::Right => Self::KeyRight,
            Key::Enter => Self::KeyEnter,
            Key::Home => Self::KeyHome,
            Key::VolumeUp => Self::KeyVolumeUp,
            Key::VolumeDown => Self::KeyVolumeDown,
            Key::AvMuteBlank => Self::KeyAvMuteBlank,
            Key::KeysTone => Self::KeyKeysTone,
            Key::HdmiLink => Self::KeyHdmiLink,
            Key::Play => Self::KeyPlay,
            Key::Stop => Self::KeyStop,
            Key::Pause => Self::KeyPause,
            Key::Rewind => Self::KeyRewind,
            Key::FastForward => Self::KeyFastForward,
            Key::Backward => Self::KeyBackward,
            Key::Forward => Self::KeyForward,
            Key::Mute => Self::KeyMute,
            Key::LinkMenu => Self::KeyLinkMenu,
        }
    }
}

/// A request ready to be framed and sent
///
/// Built from the catalog or from an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    id: Option<CommandId>,
    payload: Bytes,
    status_table: Option<StatusTable>,
}

impl Command {
    /// Command for a catalog entry
    pub fn new(id: CommandId) -> Self {
        Self {
            id: Some(id),
            payload: Bytes::from_static(id.payload()),
            status_table: id.status_table(),
        }
    }

    /// Command for a payload outside the catalog
    ///
    /// Payloads matching a catalog entry pick up its name and status table.
    pub fn raw(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();

        if let Some(id) = CommandId::from_payload(&payload) {
            return Self::new(id);
        }

        let status_table = if payload.ends_with(b"?") {
            Some(StatusTable::Value)
        } else {
            Some(StatusTable::Ack)
        };

        Self {
            id: None,
            payload,
            status_table,
        }
    }

    pub fn id(&self) -> Option<CommandId> {
        self.id
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn status_table(&self) -> Option<StatusTable> {
        self.status_table
    }

    /// Check if this is the session handshake token
    pub fn is_handshake(&self) -> bool {
        self.payload.as_ref() == HANDSHAKE
    }

    /// Every payload except the handshake gets the line terminator
    pub fn requires_terminator(&self) -> bool {
        !self.is_handshake()
    }
}

impl From<CommandId> for Command {
    fn from(id: CommandId) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}({})", id, self.payload.escape_ascii()),
            None => write!(f, "raw({})", self.payload.escape_ascii()),
        }
    }
}
