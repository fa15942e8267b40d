//! # mBit Control
//!
//! Control station for an mBit tracked robot. Movement commands are encoded
//! into a minimal ASCII line protocol and sent fire-and-forget over a serial
//! link to the transmitter; two platform light fixtures (a traffic light and
//! an LED strip) run as independently supervised OS processes that are
//! spawned, killed and cleaned up in sync with operator toggles and with
//! guaranteed teardown on every exit path.
//!
//! ## Features
//!
//! - Encode (direction, steps) into `<code><magnitude>\r\n` command frames
//! - Persisted per-axis step factors scaling user steps into magnitudes
//! - Serial transport at 115200 8N1 with a one-time fatal connect
//! - Supervision of the `traffic-light` and `platform-light` peripheral
//!   binaries, each with a forever `run` entry and a one-shot `off` entry
//! - Idempotent shutdown coordination across all exit triggers
//! - `rpi-gpio` feature for driving real GPIO lines via rppal
//!
//! ## Example
//!
//! ```no_run
//! use mbit_control::{Direction, MovementCommand, RobotLink, StepFactors};
//!
//! fn main() -> mbit_control::Result<()> {
//!     let factors = StepFactors { longitudinal: 10, rotational: 5 };
//!     let mut link = RobotLink::connect("/dev/ttyACM0")?;
//!     let command = MovementCommand::from_input(Direction::Forward, "3", &factors)?;
//!     link.send(&command)?; // transmits "F30\r\n"
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod fixture;
pub mod protocol;
pub mod sequencer;
pub mod supervisor;
pub mod transport;

pub use app::App;
pub use config::{StepFactorStore, StepFactors};
pub use error::{ControlError, Result};
pub use fixture::{OutputBank, SimBank};
pub use protocol::{Direction, MovementCommand};
pub use sequencer::{Aspect, PlatformLight, TrafficPhase, TrafficSequencer};
pub use supervisor::{LightSupervisor, PeripheralKind, PeripheralSpec};
pub use transport::RobotLink;

#[cfg(feature = "rpi-gpio")]
pub use fixture::GpioBank;
