// src/controller/sync_controller/test_support.rs

//! Simulated controller for the engine tests.
//!
//! The device answers synchronously from inside `write_byte`: by the time
//! the terminating byte is accepted, its echo and reply are already queued
//! for the reader thread.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::SyncController;
use crate::common::frame::{COMMAND_PREFIX, COMMAND_TERMINATOR, PING, PONG, SET_CONFIG_PREFIX};
use crate::common::hal_traits::{ControllerSerial, SerialReader};
use crate::controller::config::ControllerConfig;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockCommError;

/// How the device answers commands (`!` and `^` frames).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reply {
    Ack,
    Nak,
    Silent,
}

#[derive(Debug, Default)]
struct Wire {
    to_host: VecDeque<u8>,
    written: Vec<u8>,
    pending: String,
    frames: Vec<String>,
    pings: usize,
}

#[derive(Debug)]
pub struct SimulatedDevice {
    wire: Arc<Mutex<Wire>>,
    pub echo: bool,
    pub answer_ping: bool,
    pub reply: Reply,
    /// Query frame -> answer line.
    pub answers: HashMap<String, String>,
    /// Lines sent after every echo, before the reply.
    pub noise: Vec<String>,
    pub fail_open: bool,
    open: bool,
    opens: usize,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        let answers = [
            ("?$1E", "$1E=MDC2250 v1.3"),
            ("?TRN", "TRN=RCB500:MDC2250"),
            ("?V", "V=120:240:50"),
            ("?FF", "FF=3"),
            ("?A 1", "A=120"),
            ("?A", "A=120:-35"),
            ("?BA", "BA=17:9"),
            ("~MMOD 1", "MMOD=3"),
            ("~ALIM", "ALIM=450:300"),
        ]
        .into_iter()
        .map(|(query, answer)| (query.to_string(), answer.to_string()))
        .collect();

        SimulatedDevice {
            wire: Arc::new(Mutex::new(Wire::default())),
            echo: true,
            answer_ping: true,
            reply: Reply::Ack,
            answers,
            noise: Vec::new(),
            fail_open: false,
            open: false,
            opens: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn opens(&self) -> usize {
        self.opens
    }

    pub fn pings(&self) -> usize {
        self.wire.lock().unwrap().pings
    }

    /// Terminated frames received so far, without the terminator.
    pub fn frames(&self) -> Vec<String> {
        self.wire.lock().unwrap().frames.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.wire.lock().unwrap().written.clone()
    }

    /// Queues a line for the host outside of any request.
    pub fn inject_line(&self, line: &str) {
        push_line(&mut self.wire.lock().unwrap(), line);
    }

    fn respond(&self, wire: &mut Wire, frame: &str) {
        if self.echo {
            push_line(wire, frame);
        }
        for line in &self.noise {
            push_line(wire, line);
        }
        if let Some(answer) = self.answers.get(frame) {
            push_line(wire, answer);
        } else if frame.starts_with(COMMAND_PREFIX) || frame.starts_with(SET_CONFIG_PREFIX) {
            match self.reply {
                Reply::Ack => push_line(wire, "+"),
                Reply::Nak => push_line(wire, "-"),
                Reply::Silent => {}
            }
        }
    }
}

fn push_line(wire: &mut Wire, line: &str) {
    wire.to_host.extend(line.bytes());
    wire.to_host.push_back(b'\r');
}

pub struct SimulatedReader {
    wire: Arc<Mutex<Wire>>,
}

impl SerialReader for SimulatedReader {
    type Error = MockCommError;

    fn read_byte(&mut self) -> nb::Result<u8, MockCommError> {
        self.wire
            .lock()
            .unwrap()
            .to_host
            .pop_front()
            .ok_or(nb::Error::WouldBlock)
    }
}

impl ControllerSerial for SimulatedDevice {
    type Error = MockCommError;
    type Reader = SimulatedReader;

    fn open(&mut self, _port: &str) -> Result<SimulatedReader, MockCommError> {
        if self.fail_open {
            return Err(MockCommError);
        }
        self.open = true;
        self.opens += 1;
        Ok(SimulatedReader { wire: Arc::clone(&self.wire) })
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), MockCommError> {
        if !self.open {
            return Err(nb::Error::Other(MockCommError));
        }
        let mut wire = self.wire.lock().unwrap();
        wire.written.push(byte);
        match byte {
            PING => {
                wire.pings += 1;
                if self.answer_ping {
                    wire.to_host.push_back(PONG);
                }
            }
            COMMAND_TERMINATOR => {
                let frame = std::mem::take(&mut wire.pending);
                self.respond(&mut wire, &frame);
                wire.frames.push(frame);
            }
            other => wire.pending.push(char::from(other)),
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), MockCommError> {
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Timeouts generous enough for a loaded test machine.
pub fn fast_config() -> ControllerConfig {
    ControllerConfig::new()
        .command_timeout(Duration::from_millis(100))
        .ping_timeout(Duration::from_millis(100))
        .read_poll_interval(Duration::from_micros(200))
}

/// A controller that completed the handshake against a fresh device.
pub fn connected() -> SyncController<SimulatedDevice> {
    let mut controller = SyncController::with_config(SimulatedDevice::new(), fast_config());
    controller.connect("/dev/ttyACM0").unwrap();
    controller
}
