// src/common/response/kind.rs

use core::fmt;

use crate::common::frame::KEY_DELIMITER;

/// Category of a line sent back by the controller, identified by its key.
///
/// Listed in the order the runtime queries appear in the controller manual.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResponseKind {
    /// `A=` motor amps.
    MotorAmps,
    /// `AI=` analog inputs.
    AnalogInput,
    /// `BA=` battery amps.
    BatteryAmps,
    /// `BS=` brushless motor speed in RPM.
    BrushlessMotorSpeedRpm,
    /// `BSR=` brushless motor speed relative to max.
    BrushlessMotorSpeedPercent,
    /// `C=` absolute encoder count.
    EncoderCountAbsolute,
    /// `CB=` absolute brushless counter.
    BrushlessEncoderCountAbsolute,
    /// `CBR=` relative brushless counter.
    BrushlessEncoderCountRelative,
    /// `CIA=` internal analog command.
    InternalAnalog,
    /// `CIP=` internal pulse command.
    InternalPulse,
    /// `CIS=` internal serial command.
    InternalSerial,
    /// `CR=` relative encoder count.
    EncoderCountRelative,
    /// `D=` all digital inputs.
    DigitalInputs,
    /// `DI=` individual digital inputs.
    IndividualDigitalInputs,
    /// `DO=` digital output status.
    DigitalOutputStatus,
    /// `E=` closed loop error.
    ClosedLoopError,
    /// `F=` feedback input.
    FeedbackIn,
    /// `FF=` fault flags.
    FaultFlag,
    /// `FID=` firmware identification.
    FirmwareId,
    /// `FS=` status flags.
    StatusFlag,
    /// `LK=` lock status.
    LockStatus,
    /// `M=` motor command applied.
    MotorCommandApplied,
    /// `P=` motor power output applied.
    MotorPowerOutputApplied,
    /// `PI=` pulse inputs.
    PulseInput,
    /// `S=` encoder speed in RPM.
    EncoderSpeedRpm,
    /// `SR=` encoder speed relative to max.
    EncoderSpeedRelative,
    /// `T=` case and internal temperatures.
    Temperature,
    /// `TM=` controller clock.
    ReadTime,
    /// `TRN=` control unit type and controller model.
    ControlUnitTypeAndControllerModel,
    /// `V=` internal voltages.
    Volts,
    /// `VAR=` user variable.
    UserVariable,
    /// Anything without a registered key.
    Unknown,
}

/// How the values of a response kind are laid out on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChannelLayout {
    /// `KEY=v1` or `KEY=v1:v2`.
    TwoChannel,
    /// `KEY=v1`.
    SingleChannel,
    /// `KEY=v1:v2:...:vn`.
    Variadic,
    /// Recognized, but the value format is not established.
    Undecodable,
}

/// Key table, including the `=` delimiter.
///
/// Keys are matched against the whole leading token of a line, so `B=`
/// can never shadow `BS=` or `BSR=`. No two entries share a key.
pub static RESPONSE_KEYS: [(&str, ResponseKind); 31] = [
    ("A=", ResponseKind::MotorAmps),
    ("AI=", ResponseKind::AnalogInput),
    ("BA=", ResponseKind::BatteryAmps),
    ("BS=", ResponseKind::BrushlessMotorSpeedRpm),
    ("BSR=", ResponseKind::BrushlessMotorSpeedPercent),
    ("C=", ResponseKind::EncoderCountAbsolute),
    ("CB=", ResponseKind::BrushlessEncoderCountAbsolute),
    ("CBR=", ResponseKind::BrushlessEncoderCountRelative),
    ("CIA=", ResponseKind::InternalAnalog),
    ("CIP=", ResponseKind::InternalPulse),
    ("CIS=", ResponseKind::InternalSerial),
    ("CR=", ResponseKind::EncoderCountRelative),
    ("D=", ResponseKind::DigitalInputs),
    ("DI=", ResponseKind::IndividualDigitalInputs),
    ("DO=", ResponseKind::DigitalOutputStatus),
    ("E=", ResponseKind::ClosedLoopError),
    ("F=", ResponseKind::FeedbackIn),
    ("FF=", ResponseKind::FaultFlag),
    ("FID=", ResponseKind::FirmwareId),
    ("FS=", ResponseKind::StatusFlag),
    ("LK=", ResponseKind::LockStatus),
    ("M=", ResponseKind::MotorCommandApplied),
    ("P=", ResponseKind::MotorPowerOutputApplied),
    ("PI=", ResponseKind::PulseInput),
    ("S=", ResponseKind::EncoderSpeedRpm),
    ("SR=", ResponseKind::EncoderSpeedRelative),
    ("T=", ResponseKind::Temperature),
    ("TM=", ResponseKind::ReadTime),
    ("TRN=", ResponseKind::ControlUnitTypeAndControllerModel),
    ("V=", ResponseKind::Volts),
    ("VAR=", ResponseKind::UserVariable),
];

/// Classifies a raw response line by its key.
///
/// Looks at the text up to and including the first `=` and matches it
/// case-sensitively against [`RESPONSE_KEYS`]. Total: lines without a
/// registered key, without `=`, or empty classify as [`ResponseKind::Unknown`].
pub fn classify(line: &str) -> ResponseKind {
    let Some(delimiter) = line.find(KEY_DELIMITER) else {
        return ResponseKind::Unknown;
    };
    let key = &line[..=delimiter];
    RESPONSE_KEYS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map_or(ResponseKind::Unknown, |(_, kind)| *kind)
}

impl ResponseKind {
    /// The wire key for this kind, including the `=`. `None` for `Unknown`.
    pub fn key(self) -> Option<&'static str> {
        RESPONSE_KEYS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(key, _)| *key)
    }

    /// Value layout used by [`decode`](super::decode).
    pub const fn layout(self) -> ChannelLayout {
        match self {
            ResponseKind::MotorAmps
            | ResponseKind::BatteryAmps
            | ResponseKind::EncoderCountAbsolute => ChannelLayout::TwoChannel,
            ResponseKind::BrushlessMotorSpeedRpm
            | ResponseKind::BrushlessMotorSpeedPercent
            | ResponseKind::BrushlessEncoderCountAbsolute
            | ResponseKind::BrushlessEncoderCountRelative => ChannelLayout::SingleChannel,
            ResponseKind::AnalogInput => ChannelLayout::Variadic,
            _ => ChannelLayout::Undecodable,
        }
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, ResponseKind::Unknown)
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            Some(key) => write!(f, "{:?} ({})", self, key),
            None => write!(f, "{:?}", self),
        }
    }
}
