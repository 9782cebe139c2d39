//! Protocol constants

use std::time::Duration;

/// Session opening token: `ESC/VP.net` followed by the version and header bytes.
///
/// Sent once per connection and never terminated.
pub const HANDSHAKE: &[u8] = b"ESC/VP.net\x10\x03\x00\x00\x00\x00";

/// Command line terminator
pub const TERMINATOR: u8 = b'\r';

/// Device is ready for the next command once it has sent this byte
pub const END_OF_REPLY: u8 = b':';

/// Reply emitted when the device rejects a command
pub const ERROR_MARKER: &[u8] = b"Err\r:";

/// Default TCP control port
pub const DEFAULT_TCP_PORT: u16 = 3629;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time to wait for a reply
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to drain the unverified handshake acknowledgement
pub const DEFAULT_HANDSHAKE_WINDOW: Duration = Duration::from_millis(500);

/// Largest single read from the transport
pub const MAX_READ_SIZE: usize = 1024;

/// Known power replies
pub mod power {
    pub const ON: &[u8] = b"PWR=03\r:";
    pub const BOOTING: &[u8] = b"PWR=02\r:";
    pub const OFF: &[u8] = b"PWR=01\r:";
}
