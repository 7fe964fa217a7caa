// src/controller/serial_port.rs

//! Transport over a host serial port (USB CDC or RS-232).

use std::io::{self, Read, Write};

use log::debug;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::common::hal_traits::{ControllerSerial, SerialReader};
use crate::common::timing;

fn nb_from_io<T>(e: io::Error) -> nb::Result<T, io::Error> {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            Err(nb::Error::WouldBlock)
        }
        _ => Err(nb::Error::Other(e)),
    }
}

/// Write half of an open port; `open` hands out a cloned handle for reading.
pub struct SerialPortTransport {
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortTransport {
    pub fn new() -> Self {
        Self::with_baud_rate(timing::DEFAULT_BAUD_RATE)
    }

    pub fn with_baud_rate(baud_rate: u32) -> Self {
        SerialPortTransport { baud_rate, port: None }
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, io::Error> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port is not open"))
    }
}

impl Default for SerialPortTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerSerial for SerialPortTransport {
    type Error = io::Error;
    type Reader = SerialPortReader;

    fn open(&mut self, port: &str) -> Result<SerialPortReader, io::Error> {
        let handle = serialport::new(port, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timing::SERIAL_READ_TIMEOUT)
            .open()?;
        let reader = handle.try_clone()?;
        debug!("opened {} at {} baud", port, self.baud_rate);
        self.port = Some(handle);
        Ok(SerialPortReader { port: reader })
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), io::Error> {
        let port = self.port().map_err(nb::Error::Other)?;
        match port.write(&[byte]) {
            Ok(0) => Err(nb::Error::WouldBlock),
            Ok(_) => Ok(()),
            Err(e) => nb_from_io(e),
        }
    }

    fn flush(&mut self) -> nb::Result<(), io::Error> {
        let port = self.port().map_err(nb::Error::Other)?;
        port.flush().or_else(nb_from_io)
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("closed serial port");
        }
    }
}

/// Read half of an open port, moved onto the listener thread.
pub struct SerialPortReader {
    port: Box<dyn SerialPort>,
}

impl SerialReader for SerialPortReader {
    type Error = io::Error;

    fn read_byte(&mut self) -> nb::Result<u8, io::Error> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) => nb_from_io(e),
        }
    }
}
