// src/controller/mod.rs

pub mod config;
pub mod listener;
#[cfg(feature = "serialport")]
pub mod serial_port;
pub mod sync_controller;

pub use config::ControllerConfig;
pub use listener::{FilterRegistry, LineListener, Waiter};
#[cfg(feature = "serialport")]
pub use serial_port::SerialPortTransport;
pub use sync_controller::{ConnectionInfo, ConnectionState, RequestOutcome, SyncController};
