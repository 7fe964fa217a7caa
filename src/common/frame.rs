// src/common/frame.rs

//! Byte-level framing constants for the controller's serial console.

/// Terminates every command or query frame written to the controller.
pub const COMMAND_TERMINATOR: u8 = b'\r';
/// Terminates lines sent back by the controller.
pub const LINE_TERMINATOR: u8 = b'\r';
/// Some firmware revisions follow the `\r` with a `\n`; it carries no meaning.
pub const LINE_FEED: u8 = b'\n';

/// Presence probe (ENQ). Written alone, without a terminator.
pub const PING: u8 = 0x05;
/// Presence reply (ACK). Arrives alone, without a terminator.
pub const PONG: u8 = 0x06;

/// Line sent after a command was accepted.
pub const ACK: &str = "+";
/// Line sent after a command was rejected.
pub const NAK: &str = "-";

/// Prefix of a runtime query (`?A 1`).
pub const QUERY_PREFIX: char = '?';
/// Prefix of a runtime command (`!G 1 500`).
pub const COMMAND_PREFIX: char = '!';
/// Prefix of a configuration write (`^MMOD 1 0`).
pub const SET_CONFIG_PREFIX: char = '^';
/// Prefix of a configuration read (`~MMOD 1`).
pub const GET_CONFIG_PREFIX: char = '~';

/// Separates the key of a response line from its values (`A=12:13`).
pub const KEY_DELIMITER: char = '=';
/// Separates channel values inside a response line.
pub const CHANNEL_DELIMITER: char = ':';

/// Returns the key a read request expects in front of its answer.
///
/// `?A 1` and `~MMOD 1` answer with `A=...` and `MMOD=...`; the key is the
/// text after the one-character prefix, up to the first space.
pub fn response_key(request: &str) -> &str {
    let body = request
        .strip_prefix(QUERY_PREFIX)
        .or_else(|| request.strip_prefix(GET_CONFIG_PREFIX))
        .unwrap_or(request);
    body.split(' ').next().unwrap_or(body)
}
