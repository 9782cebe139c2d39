//! Line framing for ESC/VP.net
//!
//! # Wire format
//!
//! ```text
//! request:   PWR?<CR>            ASCII payload + carriage return
//! handshake: ESC/VP.net 10 03 00 00 00 00   sent as-is
//! reply:     PWR=01<CR>:         value + CR + ':'
//!            :                   bare acknowledgement
//!            Err<CR>:            command rejected
//! ```

use bytes::{BufMut, BytesMut};

use crate::command::Command;
use crate::constants::{END_OF_REPLY, TERMINATOR};

/// Encode a command for transmission
///
/// # Examples
///
/// ```
/// use escvp_core::{frame, Command, CommandId};
///
/// let bytes = frame::encode(&Command::new(CommandId::PowerQuery));
/// assert_eq!(&bytes[..], b"PWR?\r");
///
/// let bytes = frame::encode(&Command::new(CommandId::Handshake));
/// assert_eq!(&bytes[..], escvp_core::constants::HANDSHAKE);
/// ```
pub fn encode(command: &Command) -> BytesMut {
    let payload = command.payload();
    let mut buf = BytesMut::with_capacity(payload.len() + 1);

    buf.put_slice(payload);

    if command.requires_terminator() {
        buf.put_u8(TERMINATOR);
    }

    buf
}

/// Check if `buf` holds a whole reply
///
/// A reply ends with `\r:`, or is a lone `:` acknowledgement.
pub fn is_complete(buf: &[u8]) -> bool {
    buf == [END_OF_REPLY] || buf.ends_with(&[TERMINATOR, END_OF_REPLY])
}

/// Strip the `\r:` / `:` trailer from a complete reply
pub fn body(buf: &[u8]) -> &[u8] {
    let mut line = buf;
    if let [rest @ .., END_OF_REPLY] = line {
        line = rest;
    }
    if let [rest @ .., TERMINATOR] = line {
        line = rest;
    }
    line
}
