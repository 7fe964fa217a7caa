// src/common/response/decode.rs

use arrayvec::ArrayVec;

use super::error::DecodingError;
use super::kind::{classify, ChannelLayout, ResponseKind};
use crate::common::frame::{CHANNEL_DELIMITER, KEY_DELIMITER};

/// Upper bound on the values a single response line may carry.
pub const MAX_CHANNELS: usize = 16;

/// Fixed-capacity list of channel values.
pub type Channels = ArrayVec<i64, MAX_CHANNELS>;

/// Values decoded from one response line, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReading {
    kind: ResponseKind,
    channels: Channels,
}

impl DecodedReading {
    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub fn channels(&self) -> &[i64] {
        &self.channels
    }

    /// Number of values present on the wire.
    pub fn count(&self) -> usize {
        self.channels.len()
    }

    /// Value of a 1-based channel, if the line carried it.
    pub fn channel(&self, channel: usize) -> Option<i64> {
        channel.checked_sub(1).and_then(|i| self.channels.get(i).copied())
    }
}

/// Result of the two-channel decoder.
///
/// `second` is 0 when the controller only reported one channel; `count`
/// tells the two cases apart.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelPair {
    pub first: i64,
    pub second: i64,
    pub count: usize,
}

// --- Internal Helpers ---

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split([KEY_DELIMITER, CHANNEL_DELIMITER])
}

fn ensure_kind(line: &str, expected: ResponseKind) -> Result<(), DecodingError> {
    let found = classify(line);
    if found != expected {
        return Err(DecodingError::KindMismatch { expected, found });
    }
    Ok(())
}

/// Lenient integer parse of a single field.
///
/// Mirrors C `atol`: leading whitespace is skipped, an optional sign is
/// honoured, digits are consumed until the first non-digit and anything
/// after that is ignored. A field with no leading digits parses as 0.
/// Out-of-range values saturate. This is not validation.
pub fn parse_leading_int(field: &str) -> i64 {
    let trimmed = field.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Splits off the key and leniently parses every remaining field.
///
/// Does not classify the line; callers that know the key already matched
/// (configuration reads, for instance) use this directly.
pub fn decode_values(line: &str) -> Result<Channels, DecodingError> {
    let mut fields = split_fields(line);
    // The key is dropped by position, not by value.
    fields.next();

    let mut channels = Channels::new();
    for field in fields {
        channels
            .try_push(parse_leading_int(field))
            .map_err(|_| DecodingError::TooManyChannels { max: MAX_CHANNELS })?;
    }
    if channels.is_empty() {
        return Err(DecodingError::MalformedResponse(classify(line)));
    }
    Ok(channels)
}

// --- Public Decoders ---

/// Decodes `KEY=v1` or `KEY=v1:v2`.
pub fn decode_two_channel(line: &str, kind: ResponseKind) -> Result<ChannelPair, DecodingError> {
    ensure_kind(line, kind)?;

    let mut fields: ArrayVec<&str, 3> = ArrayVec::new();
    for field in split_fields(line) {
        fields
            .try_push(field)
            .map_err(|_| DecodingError::MalformedResponse(kind))?;
    }

    match fields.as_slice() {
        [_, first] => Ok(ChannelPair { first: parse_leading_int(first), second: 0, count: 1 }),
        [_, first, second] => Ok(ChannelPair {
            first: parse_leading_int(first),
            second: parse_leading_int(second),
            count: 2,
        }),
        _ => Err(DecodingError::MalformedResponse(kind)),
    }
}

/// Decodes `KEY=v1`. Fields past the first value are ignored.
pub fn decode_single_channel(line: &str, kind: ResponseKind) -> Result<i64, DecodingError> {
    ensure_kind(line, kind)?;
    split_fields(line)
        .nth(1)
        .map(parse_leading_int)
        .ok_or(DecodingError::MalformedResponse(kind))
}

/// Decodes every value of any recognized line, whatever its kind.
pub fn decode_generic(line: &str) -> Result<DecodedReading, DecodingError> {
    let kind = classify(line);
    if kind.is_unknown() {
        return Err(DecodingError::UnknownResponseType);
    }
    let channels = decode_values(line)?;
    Ok(DecodedReading { kind, channels })
}

/// Decodes a line that is expected to be of `expected` kind, choosing the
/// strategy from the kind's [`ChannelLayout`].
///
/// Kinds without an established wire format fail with
/// [`DecodingError::NotImplemented`] before the line is inspected.
pub fn decode(line: &str, expected: ResponseKind) -> Result<DecodedReading, DecodingError> {
    if expected.is_unknown() {
        return Err(DecodingError::UnknownResponseType);
    }

    let mut channels = Channels::new();
    match expected.layout() {
        ChannelLayout::Undecodable => return Err(DecodingError::NotImplemented(expected)),
        ChannelLayout::TwoChannel => {
            let pair = decode_two_channel(line, expected)?;
            channels.push(pair.first);
            if pair.count == 2 {
                channels.push(pair.second);
            }
        }
        ChannelLayout::SingleChannel => {
            channels.push(decode_single_channel(line, expected)?);
        }
        ChannelLayout::Variadic => {
            ensure_kind(line, expected)?;
            channels = decode_values(line)?;
        }
    }

    Ok(DecodedReading { kind: expected, channels })
}
