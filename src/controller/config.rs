// src/controller/config.rs

use core::time::Duration;

use crate::common::timing;

/// Tunables for a [`SyncController`](super::SyncController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Wait applied to each phase of a request (echo, ack/nak, data).
    pub command_timeout: Duration,
    /// Wait for the pong after a presence probe.
    pub ping_timeout: Duration,
    /// Deadline for pushing one frame into the transport.
    pub write_timeout: Duration,
    /// Listener back-off when no byte is available.
    pub read_poll_interval: Duration,
    /// Query used to read the device identity during the handshake.
    pub identity_query: String,
    /// Query used to read control unit type and controller model.
    pub model_query: String,
}

impl ControllerConfig {
    /// Create a configuration with the legacy defaults.
    pub fn new() -> Self {
        Self {
            command_timeout: timing::COMMAND_TIMEOUT,
            ping_timeout: timing::PING_TIMEOUT,
            write_timeout: timing::WRITE_TIMEOUT,
            read_poll_interval: timing::READ_POLL_INTERVAL,
            identity_query: String::from("?$1E"),
            model_query: String::from("?TRN"),
        }
    }

    /// Set the per-phase request timeout
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the ping timeout
    #[must_use]
    pub fn ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Set the write deadline
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the listener poll interval
    #[must_use]
    pub fn read_poll_interval(mut self, interval: Duration) -> Self {
        self.read_poll_interval = interval;
        self
    }

    /// Set the identity query sent during the handshake
    #[must_use]
    pub fn identity_query(mut self, query: impl Into<String>) -> Self {
        self.identity_query = query.into();
        self
    }

    /// Set the model query sent during the handshake
    #[must_use]
    pub fn model_query(mut self, query: impl Into<String>) -> Self {
        self.model_query = query.into();
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}
