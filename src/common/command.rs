// src/common/command.rs

//! Requests written to the controller.
//!
//! Every request except the presence probe is a single ASCII line:
//! a one-character prefix, the item mnemonic, an optional channel index and
//! an optional value, separated by spaces. The carriage return is appended
//! by the transmit path, not stored in the frame.

use core::fmt::Write;

use arrayvec::ArrayString;

use super::frame::{self, COMMAND_PREFIX, GET_CONFIG_PREFIX, QUERY_PREFIX, SET_CONFIG_PREFIX};
use super::items::{CommandItem, ConfigItem, OperatingItem};

/// Longest frame (without terminator) accepted by the formatter.
pub const MAX_FRAME_LEN: usize = 32;

/// A formatted request, ready to be written.
pub type CommandFrame = ArrayString<MAX_FRAME_LEN>;

/// Errors that can occur while formatting a request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CommandFormatError {
    /// The formatted request does not fit into a [`CommandFrame`].
    #[error("request does not fit in {max} bytes")]
    TooLong { max: usize },

    /// A raw request contains a line terminator or other control byte,
    /// which would split it on the wire.
    #[error("request contains control character {0:#04x}")]
    ControlCharacter(u8),
}

/// Represents a request to the controller.
///
/// A channel `index` of 0 means "omitted"; the controller then applies the
/// request to every channel (or answers for every channel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand<'a> {
    /// Presence probe (`0x05`), answered by a bare `0x06`.
    Ping,
    /// Runtime command (`!G 1 500`).
    Action { item: CommandItem, index: u8, value: i32 },
    /// Runtime query (`?A 1`).
    Query { item: OperatingItem, index: u8 },
    /// Configuration write (`^MMOD 1 0`).
    SetConfig { item: ConfigItem, index: u8, value: i32 },
    /// Configuration read (`~MMOD 1`).
    GetConfig { item: ConfigItem, index: u8 },
    /// Pre-formatted request text such as `?$1E` or `?TRN`.
    Raw(&'a str),
}

impl<'a> ControllerCommand<'a> {
    /// Formats the request into a fixed-capacity frame.
    pub fn format_into(&self) -> Result<CommandFrame, CommandFormatError> {
        let mut out = CommandFrame::new();
        match self {
            ControllerCommand::Ping => {
                out.push(char::from(frame::PING));
            }
            ControllerCommand::Action { item, index, value } => {
                let value = item.takes_value().then_some(*value);
                write_request(&mut out, COMMAND_PREFIX, item.mnemonic(), *index, value)?;
            }
            ControllerCommand::Query { item, index } => {
                write_request(&mut out, QUERY_PREFIX, item.mnemonic(), *index, None)?;
            }
            ControllerCommand::SetConfig { item, index, value } => {
                write_request(&mut out, SET_CONFIG_PREFIX, item.mnemonic(), *index, Some(*value))?;
            }
            ControllerCommand::GetConfig { item, index } => {
                write_request(&mut out, GET_CONFIG_PREFIX, item.mnemonic(), *index, None)?;
            }
            ControllerCommand::Raw(text) => {
                if let Some(byte) = text.bytes().find(u8::is_ascii_control) {
                    return Err(CommandFormatError::ControlCharacter(byte));
                }
                out
                    .try_push_str(text)
                    .map_err(|_| CommandFormatError::TooLong { max: MAX_FRAME_LEN })?;
            }
        }
        Ok(out)
    }

    /// Whether the controller answers with a data line after the echo.
    pub fn is_read(&self) -> bool {
        match self {
            ControllerCommand::Query { .. } | ControllerCommand::GetConfig { .. } => true,
            ControllerCommand::Raw(text) => {
                text.starts_with(QUERY_PREFIX) || text.starts_with(GET_CONFIG_PREFIX)
            }
            _ => false,
        }
    }

    /// Key the answer of a read request starts with, without the `=`.
    pub fn response_key(&self) -> Option<&'a str> {
        match self {
            ControllerCommand::Query { item, .. } => Some(item.mnemonic()),
            ControllerCommand::GetConfig { item, .. } => Some(item.mnemonic()),
            ControllerCommand::Raw(text) if self.is_read() => Some(frame::response_key(*text)),
            _ => None,
        }
    }
}

fn write_request(
    frame: &mut CommandFrame,
    prefix: char,
    mnemonic: &str,
    index: u8,
    value: Option<i32>,
) -> Result<(), CommandFormatError> {
    let too_long = |_| CommandFormatError::TooLong { max: MAX_FRAME_LEN };
    write!(frame, "{}{}", prefix, mnemonic).map_err(too_long)?;
    if index != 0 {
        write!(frame, " {}", index).map_err(too_long)?;
    }
    if let Some(value) = value {
        write!(frame, " {}", value).map_err(too_long)?;
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_action() {
        let cmd = ControllerCommand::Action { item: CommandItem::Go, index: 1, value: 20 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "!G 1 20");

        let cmd = ControllerCommand::Action { item: CommandItem::Go, index: 2, value: -1000 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "!G 2 -1000");

        let cmd = ControllerCommand::Action { item: CommandItem::DigitalOut, index: 0, value: 5 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "!DS 5");

        // No value for commands that do not take one.
        let cmd = ControllerCommand::Action { item: CommandItem::EmergencyStop, index: 0, value: 99 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "!EX");
        let cmd = ControllerCommand::Action { item: CommandItem::Home, index: 1, value: 0 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "!H 1");
        assert!(!cmd.is_read());
        assert_eq!(cmd.response_key(), None);
    }

    #[test]
    fn test_format_reads() {
        let cmd = ControllerCommand::Query { item: OperatingItem::MotorAmps, index: 1 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "?A 1");
        assert!(cmd.is_read());
        assert_eq!(cmd.response_key(), Some("A"));

        let cmd = ControllerCommand::Query { item: OperatingItem::BatteryAmps, index: 0 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "?BA");

        let cmd = ControllerCommand::GetConfig { item: ConfigItem::Mmod, index: 2 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "~MMOD 2");
        assert_eq!(cmd.response_key(), Some("MMOD"));
    }

    #[test]
    fn test_format_set_config() {
        let cmd = ControllerCommand::SetConfig { item: ConfigItem::Echof, index: 0, value: 0 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "^ECHOF 0");
        let cmd = ControllerCommand::SetConfig { item: ConfigItem::Alim, index: 1, value: 450 };
        assert_eq!(cmd.format_into().unwrap().as_str(), "^ALIM 1 450");
    }

    #[test]
    fn test_format_ping_and_raw() {
        let ping = ControllerCommand::Ping.format_into().unwrap();
        assert_eq!(ping.as_bytes(), &[frame::PING]);

        let cmd = ControllerCommand::Raw("?TRN");
        assert_eq!(cmd.format_into().unwrap().as_str(), "?TRN");
        assert_eq!(cmd.response_key(), Some("TRN"));
        assert_eq!(ControllerCommand::Raw("!MG").response_key(), None);
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(
            ControllerCommand::Raw("!G 1 20\r!G 2 20").format_into(),
            Err(CommandFormatError::ControlCharacter(b'\r'))
        );
        let long = "?AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        assert_eq!(
            ControllerCommand::Raw(long).format_into(),
            Err(CommandFormatError::TooLong { max: MAX_FRAME_LEN })
        );
    }
}
