//! Protocol and fixture constants for the mBit control station.
//!
//! This module pins down the serial link parameters expected by the mBit
//! transmitter, the on-disk settings layout, and the BCM pin assignment of
//! the two platform light fixtures.

use std::time::Duration;

/// Baud rate of the mBit transmitter link (115200 bps)
pub const BAUD_RATE: u32 = 115_200;

/// Read timeout on the serial handle in milliseconds.
/// The sender never waits for a reply, but the handle is configured anyway.
pub const READ_TIMEOUT_MS: u64 = 2_000;

/// Data bits configuration (8 data bits)
pub const DATA_BITS: serialport::DataBits = serialport::DataBits::Eight;

/// Parity configuration (no parity)
pub const PARITY: serialport::Parity = serialport::Parity::None;

/// Stop bits configuration (1 stop bit)
pub const STOP_BITS: serialport::StopBits = serialport::StopBits::One;

/// Terminator appended to every command frame
pub const FRAME_TERMINATOR: &str = "\r\n";

/// Default serial endpoint on the Raspberry Pi
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Directory holding the persisted step factors
pub const DEFAULT_SETTINGS_DIR: &str = "./settings";

/// File holding the forward/backward step factor (plain decimal text)
pub const FB_FACTOR_FILE: &str = "fb_factor.dat";

/// File holding the left/right step factor (plain decimal text)
pub const LR_FACTOR_FILE: &str = "lr_factor.dat";

/// Step factor written when a settings file is missing
pub const DEFAULT_STEP_FACTOR: u32 = 1;

/// Main signal head lamps, BCM numbering: (red, yellow, green)
pub const MAIN_SIGNAL_PINS: (u8, u8, u8) = (17, 18, 27);

/// Side signal head lamps, BCM numbering: (red, yellow, green)
pub const SIDE_SIGNAL_PINS: (u8, u8, u8) = (22, 23, 24);

/// All six traffic light channels, main head first
pub const TRAFFIC_LIGHT_PINS: [u8; 6] = [17, 18, 27, 22, 23, 24];

/// Platform LED strip channel, BCM numbering
pub const PLATFORM_LIGHT_PIN: u8 = 25;

/// Hold duration of the green phases of the traffic light cycle
pub const GREEN_HOLD: Duration = Duration::from_secs(8);

/// Hold duration of the yellow phases of the traffic light cycle
pub const YELLOW_HOLD: Duration = Duration::from_secs(2);

/// Poll interval used while sleeping so a stop request is honored promptly
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);
