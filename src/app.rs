//! Application context and shutdown coordination.
//!
//! One explicitly constructed object owns the step-factor store, the serial
//! link and the peripheral supervisor, with a fixed initialization order
//! (load config, open transport, enter the main loop) and a single teardown
//! path that every exit trigger funnels into.

use crate::config::{StepFactorStore, StepFactors};
use crate::error::{ControlError, Result};
use crate::protocol::{Direction, MovementCommand};
use crate::supervisor::{LightSupervisor, PeripheralKind};
use crate::transport::RobotLink;
use tracing::info;

/// Owns all long-lived resources of the control station.
pub struct App {
    factors: StepFactorStore,
    link: Option<RobotLink>,
    supervisor: LightSupervisor,
    shutdown_done: bool,
}

impl App {
    pub fn new(factors: StepFactorStore, link: RobotLink, supervisor: LightSupervisor) -> Self {
        App { factors, link: Some(link), supervisor, shutdown_done: false }
    }

    /// Context without a transmitter link, for driving only the light
    /// fixtures. Any transmit attempt reports [`ControlError::LinkClosed`].
    pub fn without_link(factors: StepFactorStore, supervisor: LightSupervisor) -> Self {
        App { factors, link: None, supervisor, shutdown_done: false }
    }

    /// Current step factors.
    pub fn factors(&self) -> StepFactors {
        self.factors.factors()
    }

    /// Commit new step factors to memory and durable storage.
    pub fn update_factors(&mut self, longitudinal: u32, rotational: u32) -> Result<()> {
        self.factors.update(longitudinal, rotational)
    }

    /// Encode a command from raw user text and transmit it.
    ///
    /// Invalid step text is rejected before anything reaches the wire; a
    /// transmit failure is recoverable and leaves all state unchanged.
    pub fn drive(&mut self, direction: Direction, steps: &str) -> Result<()> {
        let command = MovementCommand::from_input(direction, steps, &self.factors.factors())?;
        self.transmit(&command)
    }

    /// Transmit a single step in the given direction (magnitude = factor).
    pub fn nudge(&mut self, direction: Direction) -> Result<()> {
        let command = MovementCommand::new(direction, 1, &self.factors.factors());
        self.transmit(&command)
    }

    fn transmit(&mut self, command: &MovementCommand) -> Result<()> {
        match self.link.as_mut() {
            Some(link) => link.send(command),
            None => Err(ControlError::LinkClosed),
        }
    }

    /// Whether a peripheral is currently recorded as running.
    pub fn peripheral_running(&self, kind: PeripheralKind) -> bool {
        self.supervisor.is_running(kind)
    }

    /// Flip a peripheral's state; returns the new on/off state.
    pub fn toggle_peripheral(&mut self, kind: PeripheralKind) -> Result<bool> {
        if self.supervisor.is_running(kind) {
            self.supervisor.stop(kind)?;
            Ok(false)
        } else {
            self.supervisor.start(kind)?;
            Ok(true)
        }
    }

    /// Graceful teardown: close the transport if it is still open, then
    /// stop every running peripheral (kill plus off pass, per kind).
    ///
    /// Guarded so that multiple triggers (console quit, prompt interrupt,
    /// drop) run the sequence exactly once; every step is best-effort.
    pub fn shutdown(&mut self) {
        if self.shutdown_done {
            return;
        }
        self.shutdown_done = true;
        info!("shutting down");
        if let Some(link) = self.link.take() {
            link.close();
        }
        self.supervisor.stop_all();
        info!("shutdown complete");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
