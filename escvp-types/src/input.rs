//! Input sources and remote keys

use std::fmt;

/// Video input selectable with `SOURCE xx`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Hdmi1,
    Hdmi2,
    Hdmi3,
    HdmiLan,
}

impl Source {
    pub const ALL: [Source; 4] = [Self::Hdmi1, Self::Hdmi2, Self::Hdmi3, Self::HdmiLan];

    /// Two character source code
    pub fn code(self) -> &'static str {
        match self {
            Self::Hdmi1 => "30",
            Self::Hdmi2 => "A0",
            Self::Hdmi3 => "C0",
            Self::HdmiLan => "53",
        }
    }

    /// Look up a source by its code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hdmi1 => "HDMI1",
            Self::Hdmi2 => "HDMI2",
            Self::Hdmi3 => "HDMI3",
            Self::HdmiLan => "HDMI LAN",
        };
        f.write_str(name)
    }
}

/// Remote control key emulated with `KEY xx`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Power,
    Menu,
    Up,
    Down,
    Left,
    Right,
    Enter,
    Home,
    VolumeUp,
    VolumeDown,
    AvMuteBlank,
    KeysTone,
    HdmiLink,
    Play,
    Stop,
    Pause,
    Rewind,
    FastForward,
    Backward,
    Forward,
    Mute,
    LinkMenu,
}

impl Key {
    /// Two character key code
    pub fn code(self) -> &'static str {
        match self {
            Self::Power => "01",
            Self::Menu => "03",
            Self::Up => "35",
            Self::Down => "36",
            Self::Left => "37",
            Self::Right => "38",
            Self::Enter => "16",
            Self::Home => "04",
            Self::VolumeUp => "56",
            Self::VolumeDown => "57",
            Self::AvMuteBlank => "3E",
            Self::KeysTone => "C8",
            Self::HdmiLink => "8E",
            Self::Play => "D1",
            Self::Stop => "D2",
            Self::Pause => "D3",
            Self::Rewind => "D4",
            Self::FastForward => "D5",
            Self::Backward => "D6",
            Self::Forward => "D7",
            Self::Mute => "D8",
            Self::LinkMenu => "D9",
        }
    }
}
