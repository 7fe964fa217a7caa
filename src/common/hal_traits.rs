// src/common/hal_traits.rs

use core::fmt::Debug;

/// Write half of the serial channel to the controller, plus open/close.
///
/// Opening hands back the read half, which the line listener moves onto its
/// own thread. Writes are non-blocking in the `nb` style; the engine retries
/// `WouldBlock` until its write deadline.
pub trait ControllerSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Read half produced by [`open`](Self::open).
    type Reader: SerialReader<Error = Self::Error> + Send + 'static;

    /// Opens the channel on the given port name (`/dev/ttyACM0`, `COM3`, ...).
    fn open(&mut self, port: &str) -> Result<Self::Reader, Self::Error>;

    /// Attempts to write a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the byte cannot be accepted yet.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush everything written so far.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Closes the channel. Must be safe to call when already closed.
    fn close(&mut self);
}

/// Read half of the serial channel.
pub trait SerialReader {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is available yet.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;
}
