// src/controller/sync_controller/io_helpers.rs

use std::thread;
use std::time::{Duration, Instant};

use log::trace;

use super::SyncController;
use crate::common::{error::ControllerError, frame, hal_traits::ControllerSerial, timing};
use crate::controller::listener::Waiter;

// These take the interface rather than `&mut self` so callers can hold the
// persistent waiters while writing.
impl<IF> SyncController<IF>
where
    IF: ControllerSerial,
{
    /// Executes a non-blocking I/O operation (`f`) repeatedly until it
    /// stops returning `WouldBlock`, returning the final result or a timeout error.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        interface: &mut IF,
        timeout: Duration,
        mut f: FN,
    ) -> Result<T, ControllerError<IF::Error>>
    where
        FN: FnMut(&mut IF) -> nb::Result<T, IF::Error>,
    {
        let deadline = Instant::now() + timeout;

        loop {
            match f(interface) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(ControllerError::Timeout);
                    }
                    thread::sleep(timing::WRITE_RETRY_DELAY);
                }
                Err(nb::Error::Other(e)) => return Err(ControllerError::Io(e)),
            }
        }
    }

    /// Writes one frame, plus the carriage return when `terminated`.
    ///
    /// `armed` is the waiter for the frame's first reply. Requiring it here
    /// means nothing can be written before its reply has a listener.
    pub(super) fn write_frame(
        interface: &mut IF,
        bytes: &[u8],
        terminated: bool,
        armed: &Waiter,
        timeout: Duration,
    ) -> Result<(), ControllerError<IF::Error>> {
        trace!("writing {:?} with {:?}", String::from_utf8_lossy(bytes), armed);

        let terminator = terminated.then_some(frame::COMMAND_TERMINATOR);
        for byte in bytes.iter().copied().chain(terminator) {
            Self::execute_blocking_io_with_timeout(interface, timeout, |iface| iface.write_byte(byte))?;
        }
        Self::execute_blocking_io_with_timeout(interface, timeout, |iface| iface.flush())
    }
}
