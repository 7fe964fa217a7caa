// src/common/response/mod.rs

mod decode;
mod error;
mod kind;

pub use decode::{
    decode, decode_generic, decode_single_channel, decode_two_channel, decode_values,
    parse_leading_int, ChannelPair, Channels, DecodedReading, MAX_CHANNELS,
};
pub use error::DecodingError;
pub use kind::{classify, ChannelLayout, ResponseKind, RESPONSE_KEYS};
