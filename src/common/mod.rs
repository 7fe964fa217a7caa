// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
#[cfg(feature = "std")]
pub mod error;
pub mod fault_flags;
pub mod frame;
pub mod hal_traits;
pub mod items;
pub mod response;
pub mod timing;

// --- Re-export key types/traits/functions for easier access ---

pub use command::{CommandFormatError, CommandFrame, ControllerCommand, MAX_FRAME_LEN};
#[cfg(feature = "std")]
pub use error::ControllerError;
pub use fault_flags::FaultFlags;
pub use hal_traits::{ControllerSerial, SerialReader};
pub use items::{CommandItem, ConfigItem, OperatingItem};
pub use response::{
    classify, decode, decode_generic, ChannelLayout, DecodedReading, DecodingError, ResponseKind,
};
