//! Projector power state

use std::fmt;

use crate::error::{Error, Result};

/// Power state reported by `PWR?`
///
/// The device answers with a two digit code (`PWR=03\r:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerStatus {
    /// Standby with the network interface off (`00`)
    StandbyNetworkOff,

    /// Lamp off (`01`)
    Off,

    /// Warming up (`02`)
    Booting,

    /// Lamp on (`03`)
    On,

    /// Standby with the network interface on (`04`)
    StandbyNetworkOn,

    /// Standby after an abnormality (`05`)
    AbnormalStandby,

    /// Any code not listed above
    Unknown(u8),
}

impl PowerStatus {
    /// Map a numeric power code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::StandbyNetworkOff,
            1 => Self::Off,
            2 => Self::Booting,
            3 => Self::On,
            4 => Self::StandbyNetworkOn,
            5 => Self::AbnormalStandby,
            other => Self::Unknown(other),
        }
    }

    /// Numeric code as sent by the device
    pub fn code(self) -> u8 {
        match self {
            Self::StandbyNetworkOff => 0,
            Self::Off => 1,
            Self::Booting => 2,
            Self::On => 3,
            Self::StandbyNetworkOn => 4,
            Self::AbnormalStandby => 5,
            Self::Unknown(code) => code,
        }
    }

    /// Parse a power reply line such as `PWR=03` or `PWR=03\r:`
    pub fn from_reply(reply: &str) -> Result<Self> {
        let line = reply.trim_end_matches([':', '\r']);

        let digits = line
            .strip_prefix("PWR=")
            .ok_or_else(|| Error::Parse(format!("not a power reply: {:?}", reply)))?;

        let code = digits
            .parse::<u8>()
            .map_err(|e| Error::Parse(format!("bad power code {:?}: {}", digits, e)))?;

        Ok(Self::from_code(code))
    }

    /// Lamp is lit or about to be
    pub fn is_powered(self) -> bool {
        matches!(self, Self::On | Self::Booting)
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StandbyNetworkOff => f.write_str("standby (network off)"),
            Self::Off => f.write_str("off"),
            Self::Booting => f.write_str("booting"),
            Self::On => f.write_str("on"),
            Self::StandbyNetworkOn => f.write_str("standby (network on)"),
            Self::AbnormalStandby => f.write_str("abnormal standby"),
            Self::Unknown(code) => write!(f, "unknown ({:02})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_reply_known_literals() {
        assert_eq!(PowerStatus::from_reply("PWR=03\r:").unwrap(), PowerStatus::On);
        assert_eq!(PowerStatus::from_reply("PWR=02\r:").unwrap(), PowerStatus::Booting);
        assert_eq!(PowerStatus::from_reply("PWR=01\r:").unwrap(), PowerStatus::Off);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PowerStatus::On.to_string(), "on");
        assert_eq!(PowerStatus::Off.to_string(), "off");
        assert_eq!(PowerStatus::Booting.to_string(), "booting");
        assert_eq!(PowerStatus::Unknown(9).to_string(), "unknown (09)");
    }

    #[test]
    fn test_from_reply_without_terminator() {
        assert_eq!(
            PowerStatus::from_reply("PWR=04").unwrap(),
            PowerStatus::StandbyNetworkOn
        );
    }

    #[test]
    fn test_unknown_code() {
        let status = PowerStatus::from_reply("PWR=07\r:").unwrap();
        assert_eq!(status, PowerStatus::Unknown(7));
        assert_eq!(status.code(), 7);
    }

    #[test]
    fn test_rejects_other_replies() {
        assert!(PowerStatus::from_reply("VOL=12\r:").is_err());
        assert!(PowerStatus::from_reply("PWR=ON\r:").is_err());
    }

    #[test]
    fn test_is_powered() {
        assert!(PowerStatus::On.is_powered());
        assert!(PowerStatus::Booting.is_powered());
        assert!(!PowerStatus::Off.is_powered());
    }
}
