//! Reply classification and status decoding

use std::fmt;

use bytes::Bytes;
use escvp_types::PowerStatus;

use crate::command::StatusTable;
use crate::constants::ERROR_MARKER;
use crate::error::{Error, Result};
use crate::frame;

/// Outcome of one read cycle
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Complete reply without error marker
    Ok,

    /// Device answered `Err\r:`
    DeviceError,

    /// Nothing arrived before the deadline
    Timeout,

    /// Bytes arrived but the reply never completed
    Malformed,
}

/// Classify the bytes collected for one command
pub fn classify(raw: &[u8]) -> Classification {
    if raw.is_empty() {
        Classification::Timeout
    } else if contains(raw, ERROR_MARKER) {
        Classification::DeviceError
    } else if frame::is_complete(raw) {
        Classification::Ok
    } else {
        Classification::Malformed
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Decoded device status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Command accepted
    Ack,

    /// Power state from `PWR?`
    Power(PowerStatus),

    /// `KEY=VALUE` reply
    Value { key: String, value: String },
}

impl Status {
    /// Decode a reply according to a status table
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] when the reply does not have the shape the
    /// table expects.
    pub fn decode(raw: &[u8], table: StatusTable) -> Result<Self> {
        let body = frame::body(raw);
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::Malformed(format!("non-ASCII reply {}", raw.escape_ascii())))?;

        match table {
            StatusTable::Ack if text.is_empty() => Ok(Self::Ack),
            StatusTable::Ack => Self::decode_value(text).or(Ok(Self::Ack)),
            StatusTable::Power => Ok(Self::Power(PowerStatus::from_reply(text)?)),
            StatusTable::Value => Self::decode_value(text),
        }
    }

    fn decode_value(text: &str) -> Result<Self> {
        let (key, value) = text
            .split_once('=')
            .ok_or_else(|| Error::Malformed(format!("expected KEY=VALUE, got {:?}", text)))?;

        Ok(Self::Value {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Value part of a `KEY=VALUE` reply
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Power state, if this is a power reply
    pub fn power(&self) -> Option<PowerStatus> {
        match self {
            Self::Power(status) => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => f.write_str("ack"),
            Self::Power(status) => write!(f, "power {}", status),
            Self::Value { key, value } => write!(f, "{}={}", key, value),
        }
    }
}

/// Raw reply plus decoded status
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    /// Bytes as received, trailer included
    pub raw: Bytes,

    /// Decoded status, when the command has a status table
    pub status: Option<Status>,
}

impl Response {
    /// Build a response from a reply already classified as [`Classification::Ok`]
    pub fn decode(raw: Bytes, table: Option<StatusTable>) -> Result<Self> {
        let status = table.map(|t| Status::decode(&raw, t)).transpose()?;
        Ok(Self { raw, status })
    }

    /// Reply text without trailer
    pub fn body(&self) -> &[u8] {
        frame::body(&self.raw)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("raw", &format_args!("{}", self.raw.escape_ascii()))
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::power;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify() {
        assert_eq!(classify(b""), Classification::Timeout);
        assert_eq!(classify(b"Err\r:"), Classification::DeviceError);
        assert_eq!(classify(b"PWR=03\r:"), Classification::Ok);
        assert_eq!(classify(b":"), Classification::Ok);
        assert_eq!(classify(b"PWR="), Classification::Malformed);
    }

    #[test]
    fn test_error_marker_anywhere() {
        assert_eq!(classify(b":Err\r:"), Classification::DeviceError);
    }

    #[test]
    fn test_power_literals() {
        let on = Response::decode(Bytes::from_static(power::ON), Some(StatusTable::Power)).unwrap();
        assert_eq!(on.status, Some(Status::Power(PowerStatus::On)));

        let booting =
            Response::decode(Bytes::from_static(power::BOOTING), Some(StatusTable::Power)).unwrap();
        assert_eq!(booting.status.and_then(|s| s.power()), Some(PowerStatus::Booting));

        let off = Response::decode(Bytes::from_static(power::OFF), Some(StatusTable::Power)).unwrap();
        assert_eq!(off.status.unwrap().to_string(), "power off");
    }

    #[test]
    fn test_value_reply() {
        let response =
            Response::decode(Bytes::from_static(b"VOL=120\r:"), Some(StatusTable::Value)).unwrap();

        assert_eq!(
            response.status,
            Some(Status::Value {
                key: "VOL".into(),
                value: "120".into()
            })
        );
        assert_eq!(response.body(), b"VOL=120");
    }

    #[test]
    fn test_ack_reply() {
        let response = Response::decode(Bytes::from_static(b":"), Some(StatusTable::Ack)).unwrap();
        assert_eq!(response.status, Some(Status::Ack));
    }

    #[test]
    fn test_no_table_keeps_raw_only() {
        let response = Response::decode(Bytes::from_static(b"ESC/VP.net"), None).unwrap();
        assert_eq!(response.status, None);
        assert_eq!(response.raw.as_ref(), b"ESC/VP.net");
    }

    #[test]
    fn test_value_reply_without_equals_is_malformed() {
        let result = Status::decode(b"HELLO\r:", StatusTable::Value);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_power_table_rejects_value() {
        let result = Status::decode(b"VOL=1\r:", StatusTable::Power);
        assert!(matches!(result, Err(Error::Types(_))));
    }
}
