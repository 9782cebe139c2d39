//! Connection targets

use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_TCP_PORT};
use crate::error::{Error, Result};

/// Where a projector can be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Network control port
    Tcp { host: String, port: u16 },

    /// RS-232 control port
    Serial { path: String, baud_rate: u32 },
}

impl Target {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    pub fn serial(path: impl Into<String>, baud_rate: u32) -> Self {
        Self::Serial {
            path: path.into(),
            baud_rate,
        }
    }
}

/// Accepted forms:
///
/// - `host` / `host:port` (TCP, port defaults to 3629)
/// - `tcp://host[:port]`
/// - `serial://PATH[@BAUD]` (baud defaults to 9600)
impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix("serial://") {
            let (path, baud_rate) = match rest.rsplit_once('@') {
                Some((path, baud)) => {
                    let baud = baud
                        .parse::<u32>()
                        .map_err(|e| Error::InvalidTarget(format!("{}: bad baud rate: {}", s, e)))?;
                    (path, baud)
                }
                None => (rest, DEFAULT_BAUD_RATE),
            };

            if path.is_empty() {
                return Err(Error::InvalidTarget(format!("{}: missing device path", s)));
            }

            return Ok(Self::serial(path, baud_rate));
        }

        let rest = s.strip_prefix("tcp://").unwrap_or(s);

        let parse_port = |port: &str| {
            port.parse::<u16>()
                .map_err(|e| Error::InvalidTarget(format!("{}: bad port: {}", s, e)))
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            // [v6addr] or [v6addr]:port
            let (host, tail) = bracketed
                .split_once(']')
                .ok_or_else(|| Error::InvalidTarget(format!("{}: unclosed '['", s)))?;

            match tail {
                "" => (host, DEFAULT_TCP_PORT),
                tail => match tail.strip_prefix(':') {
                    Some(port) => (host, parse_port(port)?),
                    None => return Err(Error::InvalidTarget(format!("{}: junk after ']'", s))),
                },
            }
        } else if rest.matches(':').count() > 1 {
            // Bare IPv6 address, no port
            (rest, DEFAULT_TCP_PORT)
        } else {
            match rest.rsplit_once(':') {
                Some((host, port)) => (host, parse_port(port)?),
                None => (rest, DEFAULT_TCP_PORT),
            }
        };

        if host.is_empty() || host.contains("://") {
            return Err(Error::InvalidTarget(format!("{}: missing host", s)));
        }

        Ok(Self::tcp(host, port))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } if host.contains(':') => write!(f, "tcp://[{}]:{}", host, port),
            Self::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            Self::Serial { path, baud_rate } => write!(f, "serial://{}@{}", path, baud_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_bare_host() {
        assert_eq!(
            "192.168.0.150".parse::<Target>().unwrap(),
            Target::tcp("192.168.0.150", 3629)
        );
    }

    #[test]
    fn test_parse_host_port() {
        assert_eq!(
            "tcp://projector.local:4352".parse::<Target>().unwrap(),
            Target::tcp("projector.local", 4352)
        );
        assert_eq!(
            "10.0.0.2:3630".parse::<Target>().unwrap(),
            Target::tcp("10.0.0.2", 3630)
        );
    }

    #[test]
    fn test_parse_serial() {
        assert_eq!(
            "serial:///dev/ttyUSB0".parse::<Target>().unwrap(),
            Target::serial("/dev/ttyUSB0", 9600)
        );
        assert_eq!(
            "serial://COM3@19200".parse::<Target>().unwrap(),
            Target::serial("COM3", 19200)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("tcp://host:notaport".parse::<Target>().is_err());
        assert!("serial://@9600".parse::<Target>().is_err());
        assert!("serial:///dev/ttyS0@fast".parse::<Target>().is_err());
        assert!("".parse::<Target>().is_err());
        assert!("udp://host".parse::<Target>().is_err());
    }

    #[test]
    fn test_parse_ipv6() {
        assert_eq!(
            "fe80::1".parse::<Target>().unwrap(),
            Target::tcp("fe80::1", 3629)
        );
        assert_eq!(
            "tcp://[fe80::1]:4352".parse::<Target>().unwrap(),
            Target::tcp("fe80::1", 4352)
        );
        assert_eq!(
            "[::1]".parse::<Target>().unwrap(),
            Target::tcp("::1", 3629)
        );
        assert!("[::1".parse::<Target>().is_err());
        assert!("[::1]3629".parse::<Target>().is_err());
    }

    #[test]
    fn test_ipv6_display_round_trips() {
        let target = Target::tcp("fe80::1", 3629);
        assert_eq!(target.to_string(), "tcp://[fe80::1]:3629");
        assert_eq!(target.to_string().parse::<Target>().unwrap(), target);
    }

    #[test]
    fn test_display_round_trips() {
        let target = Target::serial("/dev/ttyS1", 9600);
        assert_eq!(target.to_string().parse::<Target>().unwrap(), target);
    }
}
