//! Serial link to the mBit transmitter.
//!
//! The link is opened once at startup, owned by the single control thread
//! for the process lifetime, and closed exactly once during shutdown.
//! Sending is fire-and-forget: no acknowledgment is awaited and no retry is
//! attempted.

use crate::constants::{BAUD_RATE, DATA_BITS, PARITY, READ_TIMEOUT_MS, STOP_BITS};
use crate::error::Result;
use crate::protocol::MovementCommand;
use serialport::SerialPort;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Owned duplex connection to the transmitter.
pub struct RobotLink {
    port: Box<dyn SerialPort>,
    endpoint: String,
}

impl RobotLink {
    /// Open the serial endpoint with the fixed link parameters
    /// (115200 baud, 8 data bits, no parity, one stop bit, 2 s read timeout).
    ///
    /// Failure here is a fatal precondition for the application: without the
    /// link no command can ever be delivered, so callers report and exit
    /// instead of retrying.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let port = serialport::new(endpoint, BAUD_RATE)
            .data_bits(DATA_BITS)
            .parity(PARITY)
            .stop_bits(STOP_BITS)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()?;
        info!(endpoint, baud = BAUD_RATE, "serial link opened");
        Ok(RobotLink { port, endpoint: endpoint.to_string() })
    }

    /// List serial ports available on this machine.
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }

    /// Write one command frame to the transmitter.
    ///
    /// The full frame is written and flushed; delivery is at-most-once. A
    /// write failure is recoverable from the caller's point of view, the
    /// link itself stays usable.
    pub fn send(&mut self, command: &MovementCommand) -> Result<()> {
        let frame = command.frame();
        self.port.write_all(&frame)?;
        self.port.flush()?;
        debug!(
            direction = %command.direction,
            magnitude = command.magnitude,
            frame = %String::from_utf8_lossy(&frame).trim_end(),
            "command transmitted"
        );
        Ok(())
    }

    /// Close the link by consuming it.
    ///
    /// The owning context keeps the link in an `Option`, so a second close
    /// request finds nothing to close and is a no-op.
    pub fn close(self) {
        info!(endpoint = %self.endpoint, "serial link closed");
        // The handle is released when `self.port` drops here.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControlError;

    #[test]
    fn unopenable_endpoint_fails_to_connect() {
        let err = RobotLink::connect("/definitely/not/a/serial/port");
        assert!(matches!(err, Err(ControlError::SerialPort(_))));
    }
}
