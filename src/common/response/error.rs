// src/common/response/error.rs

use super::kind::ResponseKind;

/// Error type specific to decoding values out of a response line.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum DecodingError {
    /// The line splits into the wrong number of key/value parts.
    #[error("malformed {0:?} response")]
    MalformedResponse(ResponseKind),

    /// The line has no registered key, so its layout cannot be known.
    #[error("unknown response type")]
    UnknownResponseType,

    /// The kind is recognized but its value format is not established.
    #[error("decoding {0:?} responses is not implemented")]
    NotImplemented(ResponseKind),

    /// The line was handed to the decoder of a different kind.
    #[error("expected a {expected:?} response, got {found:?}")]
    KindMismatch {
        expected: ResponseKind,
        found: ResponseKind,
    },

    /// More values than a reading can hold.
    #[error("response carries more than {max} channels")]
    TooManyChannels { max: usize },
}
