//! Projector information structures

use std::fmt;

use crate::error::{Error, Result};

/// Projector information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectorInfo {
    /// Network name (`NWPNAME?`)
    pub name: String,

    /// Serial number (`SNO?`)
    pub serial_number: String,

    /// Lamp hours (`LAMP?`)
    pub lamp_hours: Option<u32>,

    /// Operating hours (`ONTIME?`)
    pub operating_hours: Option<u32>,
}

impl ProjectorInfo {
    pub fn new(name: String, serial_number: String) -> Self {
        Self {
            name,
            serial_number,
            lamp_hours: None,
            operating_hours: None,
        }
    }

    /// Parse an hour counter value as reported by `LAMP?` / `ONTIME?`
    pub fn parse_hours(value: &str) -> Result<u32> {
        value
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::Parse(format!("bad hour counter {:?}: {}", value, e)))
    }
}

impl fmt::Display for ProjectorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Projector[{}, SN: {}", self.name, self.serial_number)?;
        if let Some(hours) = self.lamp_hours {
            write!(f, ", lamp: {}h", hours)?;
        }
        if let Some(hours) = self.operating_hours {
            write!(f, ", on: {}h", hours)?;
        }
        f.write_str("]")
    }
}
