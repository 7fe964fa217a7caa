// src/common/timing.rs

use core::time::Duration;

// The controller's console runs 115200 8N1 with command echo enabled.
// Every phase of a request (echo, acknowledgement, query data) gets its
// own bounded wait; the defaults below match the legacy driver.

/// Serial speed used when opening the console port.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default wait for each phase of a command or query.
pub const COMMAND_TIMEOUT: Duration = Duration::from_millis(15);

/// Default wait for the pong after a presence probe.
pub const PING_TIMEOUT: Duration = COMMAND_TIMEOUT;

/// Deadline for pushing one frame into the transport.
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(50);

/// Back-off applied by the line listener when the transport has no byte ready.
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Back-off between retries of a non-blocking write.
pub const WRITE_RETRY_DELAY: Duration = Duration::from_micros(100);

/// Read timeout handed to the OS serial driver; bounds how long the
/// listener thread takes to notice a stop request.
pub const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(10);
