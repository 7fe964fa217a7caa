// src/common/error.rs

use super::command::CommandFormatError;
use super::response::DecodingError;

/// Errors raised by the controller engine.
///
/// A request that reaches the controller and is answered with a nak or
/// nothing at all is *not* an error at this level; see `RequestOutcome`.
/// Only the typed helpers (`set_command`, `get_value`, ...) fold those into
/// [`Rejected`](Self::Rejected) and [`NoResponse`](Self::NoResponse).
#[derive(Debug, thiserror::Error)]
pub enum ControllerError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the transport.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The transport did not accept a frame before the write deadline.
    #[error("Operation timed out")]
    Timeout,

    /// A request was issued without an open channel.
    #[error("Not connected to the controller")]
    NotConnected,

    /// `connect` was called on a connected controller.
    #[error("Already connected to the controller")]
    AlreadyConnected,

    /// Opening the channel or one of the handshake steps failed.
    #[error("Error connecting to the controller: {0}")]
    ConnectionFailed(String),

    /// The request could not be formatted into a frame.
    #[error("Command format failed: {0}")]
    CommandFormatFailed(#[from] CommandFormatError),

    /// A response line could not be decoded.
    #[error("Decoding failed: {0}")]
    Decoding(#[from] DecodingError),

    /// The controller answered a typed request with a nak.
    #[error("Rejected by the controller: {0}")]
    Rejected(String),

    /// The controller did not answer a typed request in time.
    #[error("No response from the controller: {0}")]
    NoResponse(String),
}
