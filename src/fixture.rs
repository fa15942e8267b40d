//! Binary output fixtures.
//!
//! A fixture is a bank of binary output channels addressed by BCM pin
//! number. On the Raspberry Pi the bank drives real GPIO lines (behind the
//! `rpi-gpio` feature); everywhere else a simulated bank records levels and
//! logs transitions, which keeps the peripheral binaries and the tests
//! runnable off the platform.

use crate::error::Result;
use std::collections::HashMap;
use tracing::debug;

/// A bank of binary output channels.
pub trait OutputBank {
    /// Drive the given channels to the given levels, in order, in one pass.
    fn write(&mut self, levels: &[(u8, bool)]) -> Result<()>;

    /// Drive every channel of the bank low.
    fn all_off(&mut self) -> Result<()>;
}

/// In-memory fixture used off the Pi and in tests.
#[derive(Debug)]
pub struct SimBank {
    label: &'static str,
    levels: HashMap<u8, bool>,
}

impl SimBank {
    /// Create a bank for the given channels, all initially low.
    pub fn new(label: &'static str, pins: &[u8]) -> Self {
        SimBank { label, levels: pins.iter().map(|&p| (p, false)).collect() }
    }

    /// Current level of one channel. Unknown channels read low.
    pub fn level(&self, pin: u8) -> bool {
        self.levels.get(&pin).copied().unwrap_or(false)
    }

    /// True when every channel of the bank is low.
    pub fn is_all_off(&self) -> bool {
        self.levels.values().all(|&on| !on)
    }
}

impl OutputBank for SimBank {
    fn write(&mut self, levels: &[(u8, bool)]) -> Result<()> {
        for &(pin, on) in levels {
            self.levels.insert(pin, on);
            debug!(fixture = self.label, pin, on, "output level set");
        }
        Ok(())
    }

    fn all_off(&mut self) -> Result<()> {
        let pins: Vec<u8> = self.levels.keys().copied().collect();
        for pin in pins {
            self.levels.insert(pin, false);
        }
        debug!(fixture = self.label, "all outputs low");
        Ok(())
    }
}

/// GPIO-backed fixture for the Raspberry Pi.
#[cfg(feature = "rpi-gpio")]
pub struct GpioBank {
    pins: HashMap<u8, rppal::gpio::OutputPin>,
}

#[cfg(feature = "rpi-gpio")]
impl GpioBank {
    /// Claim the given BCM pins as outputs.
    ///
    /// The pins reset low when the bank drops, so a cooperative exit
    /// releases the fixture in a dark state.
    pub fn new(pins: &[u8]) -> Result<Self> {
        let gpio = rppal::gpio::Gpio::new()?;
        let mut claimed = HashMap::with_capacity(pins.len());
        for &pin in pins {
            claimed.insert(pin, gpio.get(pin)?.into_output_low());
        }
        Ok(GpioBank { pins: claimed })
    }
}

#[cfg(feature = "rpi-gpio")]
impl OutputBank for GpioBank {
    fn write(&mut self, levels: &[(u8, bool)]) -> Result<()> {
        for &(pin, on) in levels {
            if let Some(out) = self.pins.get_mut(&pin) {
                if on {
                    out.set_high();
                } else {
                    out.set_low();
                }
            }
        }
        Ok(())
    }

    fn all_off(&mut self) -> Result<()> {
        for out in self.pins.values_mut() {
            out.set_low();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_bank_tracks_levels() {
        let mut bank = SimBank::new("test", &[1, 2, 3]);
        assert!(bank.is_all_off());

        bank.write(&[(1, true), (3, true)]).unwrap();
        assert!(bank.level(1));
        assert!(!bank.level(2));
        assert!(bank.level(3));

        bank.all_off().unwrap();
        assert!(bank.is_all_off());
    }
}
