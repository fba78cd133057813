//! [`SerialSink`] – command bytes to the motor controller's UART or stdout.
//!
//! [`SerialSink::open`] configures the line itself: the given baud rate,
//! 8 data bits, no parity, one stop bit, no flow control, raw mode.  Pending
//! input is discarded once the port is open.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use gatenav_types::GateNavError;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, StopBits};
use tracing::{info, trace};

use crate::sink::ByteSink;

/// Baud rate the motor controller listens at.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Upper bound on a single byte write to the UART.
const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// [`ByteSink`] over any writer.  Every byte is flushed immediately so the
/// motor controller sees it without buffering delay.
pub struct SerialSink {
    id: String,
    out: Box<dyn Write + Send>,
}

impl SerialSink {
    /// Wrap an arbitrary writer under the identifier `id`.
    pub fn from_writer(id: impl Into<String>, out: Box<dyn Write + Send>) -> Self {
        Self { id: id.into(), out }
    }

    /// Open a serial device (such as `/dev/serial0`) at `baud_rate`, 8N1.
    ///
    /// # Errors
    ///
    /// Returns [`GateNavError::SinkFault`] if the device cannot be opened or
    /// is not a serial port.
    pub fn open(path: impl AsRef<Path>, baud_rate: u32) -> Result<Self, GateNavError> {
        let device = path.as_ref().display().to_string();
        let fault = |details: String| GateNavError::SinkFault {
            device: device.clone(),
            details,
        };

        let port = serialport::new(device.as_str(), baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| fault(format!("cannot open: {e}")))?;
        port.clear(ClearBuffer::Input)
            .map_err(|e| fault(format!("cannot flush input: {e}")))?;

        info!(device = %device, baud_rate, "serial output opened (8N1)");
        Ok(Self::from_writer(device.clone(), Box::new(port)))
    }

    /// Write commands to the process's standard output.
    pub fn stdout() -> Self {
        Self::from_writer("stdout", Box::new(io::stdout()))
    }
}

impl ByteSink for SerialSink {
    fn id(&self) -> &str {
        &self.id
    }

    fn send(&mut self, byte: u8) -> Result<(), GateNavError> {
        self.out
            .write_all(&[byte])
            .and_then(|()| self.out.flush())
            .map_err(|e| GateNavError::SinkFault {
                device: self.id.clone(),
                details: e.to_string(),
            })?;
        trace!(device = %self.id, byte = %(byte as char), "command sent");
        Ok(())
    }
}
