// src/controller/sync_controller/mod.rs

mod io_helpers;
mod protocol_helpers;
#[cfg(test)]
mod test_support;
mod transaction;

pub use transaction::RequestOutcome;

use core::fmt;

use log::{debug, info, warn};

use super::config::ControllerConfig;
use super::listener::{self, FilterRegistry, LineListener, Waiter};
use crate::common::{
    command::ControllerCommand, error::ControllerError, frame, hal_traits::ControllerSerial,
};

/// Lifecycle of the link to the controller.
///
/// `Failed` is left only through a new `connect`, which starts over from
/// `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Handshaking,
    Connected,
    Failed(String),
}

/// What the controller reported about itself during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub port: String,
    /// Raw answer to the identity query.
    pub identity: String,
    /// Control unit type (`RCB500`).
    pub control_unit: String,
    /// Controller model (`MDC2250`).
    pub model: String,
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Connected to device {} on {} with control unit {} and controller model {}",
            self.identity, self.port, self.control_unit, self.model
        )
    }
}

/// Waiters that live as long as the open channel.
#[derive(Debug)]
struct Link {
    listener: LineListener,
    /// Both `+` and `-`, in arrival order.
    verdict: Waiter,
    pong: Waiter,
}

/// Blocking client for one controller on one serial channel.
#[derive(Debug)]
pub struct SyncController<IF>
where
    IF: ControllerSerial,
{
    interface: IF,
    config: ControllerConfig,
    state: ConnectionState,
    link: Option<Link>,
    info: Option<ConnectionInfo>,
}

impl<IF> SyncController<IF>
where
    IF: ControllerSerial,
{
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, ControllerConfig::default())
    }

    pub fn with_config(interface: IF, config: ControllerConfig) -> Self {
        SyncController {
            interface,
            config,
            state: ConnectionState::Disconnected,
            link: None,
            info: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Device details from the last successful handshake.
    pub fn info(&self) -> Option<&ConnectionInfo> {
        self.info.as_ref()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Filters of the open channel, for watching lines no request asks for
    /// (unsolicited telemetry). The handle can be moved to another thread.
    pub fn line_registry(&self) -> Option<FilterRegistry> {
        self.link.as_ref().map(|link| link.listener.registry().clone())
    }

    /// Opens `port` and runs the handshake: presence probe, identity query,
    /// model query.
    ///
    /// On any failure the channel is closed again, the state becomes
    /// [`ConnectionState::Failed`] and [`ControllerError::ConnectionFailed`]
    /// carries the reason.
    pub fn connect(&mut self, port: &str) -> Result<(), ControllerError<IF::Error>> {
        if self.state == ConnectionState::Connected {
            return Err(ControllerError::AlreadyConnected);
        }
        // Leftovers of a failed attempt.
        self.teardown();
        self.info = None;

        self.state = ConnectionState::Handshaking;
        debug!("connecting to controller on {}", port);

        match self.handshake(port) {
            Ok(info) => {
                info!("{}", info);
                self.info = Some(info);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(reason) => {
                warn!("connection on {} failed: {}", port, reason);
                self.teardown();
                self.state = ConnectionState::Failed(reason.clone());
                Err(ControllerError::ConnectionFailed(reason))
            }
        }
    }

    /// Releases the persistent waiters, stops the listener and closes the
    /// channel. Safe to call in any state, any number of times.
    pub fn disconnect(&mut self) {
        let was_open = self.link.is_some();
        self.teardown();
        self.info = None;
        self.state = ConnectionState::Disconnected;
        if was_open {
            info!("disconnected from controller");
        }
    }

    /// Writes the presence probe and waits for the pong.
    ///
    /// `Ok(false)` means the controller stayed silent for the ping timeout.
    pub fn ping(&mut self) -> Result<bool, ControllerError<IF::Error>> {
        let Some(link) = self.link.as_ref() else {
            return Err(ControllerError::NotConnected);
        };
        let probe = ControllerCommand::Ping.format_into()?;
        link.pong.clear();
        Self::write_frame(
            &mut self.interface,
            probe.as_bytes(),
            false,
            &link.pong,
            self.config.write_timeout,
        )?;
        let answered = link.pong.wait(self.config.ping_timeout).is_some();
        debug!("ping {}", if answered { "answered" } else { "unanswered" });
        Ok(answered)
    }

    fn handshake(&mut self, port: &str) -> Result<ConnectionInfo, String> {
        let reader = self
            .interface
            .open(port)
            .map_err(|e| format!("failed to open {}: {:?}", port, e))?;
        let line_listener = LineListener::start(reader, self.config.read_poll_interval)
            .map_err(|e| format!("failed to start line listener: {}", e))?;

        let verdict = line_listener.register(listener::any_of([frame::ACK, frame::NAK]));
        let pong = line_listener.register(listener::exactly(char::from(frame::PONG)));
        self.link = Some(Link { listener: line_listener, verdict, pong });

        if !self.ping().map_err(|e| format!("ping failed: {}", e))? {
            return Err("no ping response".to_string());
        }

        let identity_query = self.config.identity_query.clone();
        let identity = self.handshake_query(&identity_query)?;
        let identity = match identity.split_once(frame::KEY_DELIMITER) {
            Some((_, value)) => value.to_string(),
            None => identity,
        };

        let model_query = self.config.model_query.clone();
        let model_line = self.handshake_query(&model_query)?;
        let (control_unit, model) =
            protocol_helpers::parse_model_line(&model_line, frame::response_key(&model_query))
                .ok_or_else(|| format!("invalid TRN response: {}", model_line))?;

        Ok(ConnectionInfo {
            port: port.to_string(),
            identity,
            control_unit: control_unit.to_string(),
            model: model.to_string(),
        })
    }

    fn handshake_query(&mut self, query: &str) -> Result<String, String> {
        match self.issue_keyed_query(query) {
            Ok(RequestOutcome::Success(Some(line))) => Ok(line),
            Ok(RequestOutcome::Success(None)) => Err(format!("no query response for {}", query)),
            Ok(RequestOutcome::ExplicitFailure(reason)) | Ok(RequestOutcome::Timeout(reason)) => {
                Err(reason)
            }
            Err(e) => Err(format!("{} failed: {}", query, e)),
        }
    }

    fn teardown(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.listener.stop();
        }
        self.interface.close();
    }
}

impl<IF> Drop for SyncController<IF>
where
    IF: ControllerSerial,
{
    fn drop(&mut self) {
        self.disconnect();
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::test_support::{fast_config, MockCommError, SimulatedDevice};
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_connect_success() {
        let device = SimulatedDevice::new();
        let mut controller = SyncController::with_config(device, fast_config());
        assert_eq!(controller.state(), &ConnectionState::Disconnected);

        controller.connect("/dev/ttyACM0").unwrap();

        assert!(controller.is_connected());
        let info = controller.info().unwrap();
        assert_eq!(info.port, "/dev/ttyACM0");
        assert_eq!(info.identity, "MDC2250 v1.3");
        assert_eq!(info.control_unit, "RCB500");
        assert_eq!(info.model, "MDC2250");
        assert!(info.to_string().contains("controller model MDC2250"));

        assert!(controller.interface.is_open());
        assert_eq!(controller.interface.pings(), 1);
        assert_eq!(controller.interface.written().first(), Some(&frame::PING));
        assert_eq!(controller.interface.frames(), vec!["?$1E", "?TRN"]);
    }

    #[test]
    fn test_connect_twice_is_rejected() {
        let mut controller = SyncController::with_config(SimulatedDevice::new(), fast_config());
        controller.connect("COM3").unwrap();
        assert!(matches!(controller.connect("COM3"), Err(ControllerError::AlreadyConnected)));
        assert!(controller.is_connected());
    }

    #[test]
    fn test_connect_fails_without_pong() {
        let mut device = SimulatedDevice::new();
        device.answer_ping = false;
        let mut controller = SyncController::with_config(device, fast_config());

        let result = controller.connect("/dev/ttyACM0");

        assert!(matches!(result, Err(ControllerError::ConnectionFailed(ref r)) if r == "no ping response"));
        assert_eq!(controller.state(), &ConnectionState::Failed("no ping response".to_string()));
        assert!(!controller.interface.is_open());
        assert!(controller.link.is_none());
        assert!(controller.info().is_none());
        // The handshake stopped before any query.
        assert!(controller.interface.frames().is_empty());
    }

    #[test]
    fn test_connect_fails_on_open_error() {
        let mut device = SimulatedDevice::new();
        device.fail_open = true;
        let mut controller = SyncController::with_config(device, fast_config());

        match controller.connect("/dev/missing") {
            Err(ControllerError::ConnectionFailed(reason)) => {
                assert!(reason.contains("/dev/missing"));
                assert!(reason.contains(&format!("{:?}", MockCommError)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(controller.state(), ConnectionState::Failed(_)));
    }

    #[test]
    fn test_connect_fails_without_identity() {
        let mut device = SimulatedDevice::new();
        device.answers.remove("?$1E");
        let mut controller = SyncController::with_config(device, fast_config());

        let result = controller.connect("COM1");

        match result {
            Err(ControllerError::ConnectionFailed(reason)) => {
                assert!(reason.contains("no query response"), "{}", reason)
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!controller.interface.is_open());
        assert_eq!(controller.interface.frames(), vec!["?$1E"]);
    }

    #[test]
    fn test_connect_fails_on_invalid_model_line() {
        let mut device = SimulatedDevice::new();
        device.answers.insert("?TRN".to_string(), "TRN=RCB500".to_string());
        let mut controller = SyncController::with_config(device, fast_config());

        let result = controller.connect("COM1");

        match result {
            Err(ControllerError::ConnectionFailed(reason)) => {
                assert!(reason.starts_with("invalid TRN response"), "{}", reason)
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(controller.state(), ConnectionState::Failed(_)));
        assert!(!controller.interface.is_open());
    }

    #[test]
    fn test_reconnect_after_failure() {
        let mut device = SimulatedDevice::new();
        device.answer_ping = false;
        let mut controller = SyncController::with_config(device, fast_config());
        assert!(controller.connect("COM1").is_err());

        controller.interface.answer_ping = true;
        controller.connect("COM1").unwrap();

        assert!(controller.is_connected());
        assert_eq!(controller.interface.opens(), 2);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut controller = SyncController::with_config(SimulatedDevice::new(), fast_config());
        controller.disconnect();
        assert_eq!(controller.state(), &ConnectionState::Disconnected);

        controller.connect("COM1").unwrap();
        controller.disconnect();
        controller.disconnect();

        assert_eq!(controller.state(), &ConnectionState::Disconnected);
        assert!(!controller.interface.is_open());
        assert!(controller.info().is_none());
        assert!(matches!(controller.ping(), Err(ControllerError::NotConnected)));
    }

    #[test]
    fn test_requests_need_a_connection() {
        let mut controller = SyncController::with_config(SimulatedDevice::new(), fast_config());
        assert!(matches!(controller.ping(), Err(ControllerError::NotConnected)));
        assert!(matches!(controller.issue_command("!G 1 0"), Err(ControllerError::NotConnected)));
        assert!(matches!(controller.issue_keyed_query("?A"), Err(ControllerError::NotConnected)));
        assert!(controller.interface.written().is_empty());
        assert!(controller.line_registry().is_none());
    }

    #[test]
    fn test_line_registry_sees_unsolicited_lines() {
        let mut controller = SyncController::with_config(SimulatedDevice::new(), fast_config());
        controller.connect("COM1").unwrap();
        let registry = controller.line_registry().unwrap();
        let telemetry = registry.register(listener::starts_with("A="));

        controller.interface.inject_line("A=7:8");

        assert_eq!(telemetry.wait(Duration::from_millis(500)).as_deref(), Some("A=7:8"));
        controller.disconnect();
        assert!(controller.line_registry().is_none());
    }

    #[test]
    fn test_ping_after_connect() {
        let mut controller = SyncController::with_config(SimulatedDevice::new(), fast_config());
        controller.connect("COM1").unwrap();
        assert!(controller.ping().unwrap());

        controller.interface.answer_ping = false;
        assert!(!controller.ping().unwrap());
        assert_eq!(controller.interface.pings(), 3);
    }
}
