//! Timed run-loops executed inside the peripheral processes.
//!
//! The traffic light cycles through four fixed phases, each driving both
//! signal heads atomically before holding; the platform light holds a
//! static "on" pattern. Both loops run until an external stop request
//! (the binary's SIGINT handler raising a flag) and leave every output low
//! on the way out. A forced kill bypasses that path entirely, which is why
//! the supervisor always follows a kill with the separate `off` one-shot.

use crate::constants::{
    GREEN_HOLD, MAIN_SIGNAL_PINS, PLATFORM_LIGHT_PIN, SIDE_SIGNAL_PINS, STOP_POLL_INTERVAL,
    YELLOW_HOLD,
};
use crate::error::Result;
use crate::fixture::OutputBank;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// What a single signal head shows. Exactly one lamp is lit per aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Red,
    Yellow,
    Green,
}

impl Aspect {
    /// Lamp levels as (red, yellow, green).
    pub const fn lamp_levels(self) -> (bool, bool, bool) {
        match self {
            Aspect::Red => (true, false, false),
            Aspect::Yellow => (false, true, false),
            Aspect::Green => (false, false, true),
        }
    }
}

/// One phase of the traffic light cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficPhase {
    /// Main green, side red — 8 s
    MainGreen,
    /// Main yellow, side red — 2 s
    MainYellow,
    /// Main red, side green — 8 s
    SideGreen,
    /// Main red, side yellow — 2 s
    SideYellow,
}

impl TrafficPhase {
    /// Phase the cycle starts from.
    pub const fn first() -> Self {
        TrafficPhase::MainGreen
    }

    /// Next phase in the cycle.
    pub const fn next(self) -> Self {
        match self {
            TrafficPhase::MainGreen => TrafficPhase::MainYellow,
            TrafficPhase::MainYellow => TrafficPhase::SideGreen,
            TrafficPhase::SideGreen => TrafficPhase::SideYellow,
            TrafficPhase::SideYellow => TrafficPhase::MainGreen,
        }
    }

    /// How long the phase holds before advancing.
    pub const fn hold(self) -> Duration {
        match self {
            TrafficPhase::MainGreen | TrafficPhase::SideGreen => GREEN_HOLD,
            TrafficPhase::MainYellow | TrafficPhase::SideYellow => YELLOW_HOLD,
        }
    }

    /// Aspects shown by (main head, side head) during the phase.
    pub const fn aspects(self) -> (Aspect, Aspect) {
        match self {
            TrafficPhase::MainGreen => (Aspect::Green, Aspect::Red),
            TrafficPhase::MainYellow => (Aspect::Yellow, Aspect::Red),
            TrafficPhase::SideGreen => (Aspect::Red, Aspect::Green),
            TrafficPhase::SideYellow => (Aspect::Red, Aspect::Yellow),
        }
    }

    /// Full six-channel output vector for the phase, main head first.
    pub fn output_vector(self) -> [(u8, bool); 6] {
        let (main, side) = self.aspects();
        let (m_red, m_yellow, m_green) = main.lamp_levels();
        let (s_red, s_yellow, s_green) = side.lamp_levels();
        [
            (MAIN_SIGNAL_PINS.0, m_red),
            (MAIN_SIGNAL_PINS.1, m_yellow),
            (MAIN_SIGNAL_PINS.2, m_green),
            (SIDE_SIGNAL_PINS.0, s_red),
            (SIDE_SIGNAL_PINS.1, s_yellow),
            (SIDE_SIGNAL_PINS.2, s_green),
        ]
    }
}

/// The traffic light state machine.
pub struct TrafficSequencer<B: OutputBank> {
    bank: B,
    phase: TrafficPhase,
}

impl<B: OutputBank> TrafficSequencer<B> {
    pub fn new(bank: B) -> Self {
        TrafficSequencer { bank, phase: TrafficPhase::first() }
    }

    /// Current phase.
    pub fn phase(&self) -> TrafficPhase {
        self.phase
    }

    /// Write the current phase's output vector to the fixture.
    pub fn apply(&mut self) -> Result<()> {
        debug!(phase = ?self.phase, "applying phase outputs");
        self.bank.write(&self.phase.output_vector())
    }

    /// Advance to the next phase without touching the fixture.
    pub fn advance(&mut self) {
        self.phase = self.phase.next();
    }

    /// Cycle forever until `stop` is raised, then turn everything off.
    ///
    /// Each iteration sets the full output vector before sleeping for the
    /// phase hold, so the two heads never show a mixed state.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        info!("traffic light sequencer running");
        while !stop.load(Ordering::SeqCst) {
            self.apply()?;
            if !hold(stop, self.phase.hold()) {
                break;
            }
            self.advance();
        }
        info!("traffic light sequencer stopping, all outputs low");
        self.bank.all_off()
    }

    /// Access the fixture, used by the `off` entry point and by tests.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }
}

/// The platform LED strip: a static "on" pattern until stopped.
pub struct PlatformLight<B: OutputBank> {
    bank: B,
}

impl<B: OutputBank> PlatformLight<B> {
    pub fn new(bank: B) -> Self {
        PlatformLight { bank }
    }

    /// Turn the strip on and park until `stop` is raised, then turn it off.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        info!("platform light on");
        self.bank.write(&[(PLATFORM_LIGHT_PIN, true)])?;
        while !stop.load(Ordering::SeqCst) {
            thread::sleep(STOP_POLL_INTERVAL);
        }
        info!("platform light stopping, output low");
        self.bank.all_off()
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }
}

/// Sleep `total` in short slices, polling the stop flag.
/// Returns false when the sleep was cut short by a stop request.
fn hold(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(STOP_POLL_INTERVAL);
        thread::sleep(slice);
        remaining -= slice;
    }
    !stop.load(Ordering::SeqCst)
}
