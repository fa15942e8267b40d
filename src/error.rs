//! Error types for mBit control operations.

use thiserror::Error;

/// Result type alias for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Error types for the control station.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A transmit was requested after the serial link was closed
    #[error("Serial link is closed")]
    LinkClosed,

    /// Step count entered by the user is not a non-negative integer
    #[error("Invalid step count {input:?}: expected a non-negative integer")]
    InvalidInput {
        /// The rejected user input
        input: String,
    },

    /// Persisted step factor is missing, non-numeric or non-positive
    #[error("Invalid step factor in {path}: {reason}")]
    InvalidFactor {
        /// Settings file that failed validation
        path: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A peripheral run-loop or off one-shot failed to launch
    #[error("Failed to spawn {peripheral} process: {source}")]
    PeripheralSpawn {
        /// Which peripheral was being launched
        peripheral: &'static str,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// GPIO access error on the Raspberry Pi
    #[cfg(feature = "rpi-gpio")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
}
