//! Peripheral process supervision.
//!
//! Each light fixture runs as an independent OS process with its own
//! ownership of the output resource; the controller only ever talks to it
//! through process lifecycle operations. The supervisor tracks at most one
//! live process per peripheral kind and never issues a kill for a pid it
//! does not hold.
//!
//! Stopping is deliberately non-graceful: the run-loop is SIGKILLed, so it
//! gets no chance to clean up. The supervisor therefore always follows a
//! kill with the peripheral's short-lived `off` entry point, which performs
//! one "all outputs low" pass and exits.

use crate::error::{ControlError, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

/// The two supervised light fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeripheralKind {
    PlatformLight,
    TrafficLight,
}

impl PeripheralKind {
    /// Every supervised kind, in shutdown order.
    pub const ALL: [PeripheralKind; 2] =
        [PeripheralKind::TrafficLight, PeripheralKind::PlatformLight];

    /// Human-readable name, also used in spawn errors.
    pub const fn label(self) -> &'static str {
        match self {
            PeripheralKind::PlatformLight => "platform-light",
            PeripheralKind::TrafficLight => "traffic-light",
        }
    }
}

impl std::fmt::Display for PeripheralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How to launch a peripheral's two external entry points.
#[derive(Debug, Clone)]
pub struct PeripheralSpec {
    /// Executable implementing both entry points
    pub program: PathBuf,
    /// Arguments selecting the forever run-loop
    pub run_args: Vec<String>,
    /// Arguments selecting the one-shot all-outputs-off pass
    pub off_args: Vec<String>,
}

impl PeripheralSpec {
    /// Spec for a peripheral binary installed next to the current
    /// executable, using the `run`/`off` subcommands.
    pub fn sibling(bin_name: &str) -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().unwrap_or_else(|| std::path::Path::new("."));
        Ok(PeripheralSpec {
            program: dir.join(bin_name),
            run_args: vec!["run".into()],
            off_args: vec!["off".into()],
        })
    }
}

/// One live peripheral process. Holding the `Child` keeps the pid valid
/// until the supervisor reaps it, so a recorded process always has a pid.
#[derive(Debug)]
struct PeripheralProcess {
    child: Child,
}

/// Tracks and controls the peripheral run-loop processes.
#[derive(Debug)]
pub struct LightSupervisor {
    specs: HashMap<PeripheralKind, PeripheralSpec>,
    procs: HashMap<PeripheralKind, PeripheralProcess>,
}

impl LightSupervisor {
    /// Build a supervisor with explicit launch specs, one per kind.
    pub fn new(platform: PeripheralSpec, traffic: PeripheralSpec) -> Self {
        let mut specs = HashMap::new();
        specs.insert(PeripheralKind::PlatformLight, platform);
        specs.insert(PeripheralKind::TrafficLight, traffic);
        LightSupervisor { specs, procs: HashMap::new() }
    }

    /// Supervisor over the `platform-light` and `traffic-light` binaries
    /// installed next to the current executable.
    pub fn with_sibling_binaries() -> Result<Self> {
        Ok(Self::new(
            PeripheralSpec::sibling("platform-light")?,
            PeripheralSpec::sibling("traffic-light")?,
        ))
    }

    /// Whether a process of this kind is currently recorded as live.
    pub fn is_running(&self, kind: PeripheralKind) -> bool {
        self.procs.contains_key(&kind)
    }

    /// OS pid of the recorded process, if any.
    pub fn pid(&self, kind: PeripheralKind) -> Option<u32> {
        self.procs.get(&kind).map(|p| p.child.id())
    }

    /// Launch the peripheral's run-loop.
    ///
    /// A no-op when a process of this kind is already recorded: at most one
    /// live process per kind. A spawn failure is surfaced and nothing is
    /// recorded as running.
    pub fn start(&mut self, kind: PeripheralKind) -> Result<()> {
        if self.is_running(kind) {
            debug!(%kind, "peripheral already running, start ignored");
            return Ok(());
        }
        let spec = &self.specs[&kind];
        let child = Command::new(&spec.program)
            .args(&spec.run_args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ControlError::PeripheralSpawn { peripheral: kind.label(), source })?;
        info!(%kind, pid = child.id(), "peripheral started");
        self.procs.insert(kind, PeripheralProcess { child });
        Ok(())
    }

    /// Kill the peripheral's run-loop and run its off pass.
    ///
    /// A no-op when nothing is recorded as running: no kill is attempted and
    /// no off pass is launched. Otherwise the recorded pid receives SIGKILL,
    /// the child is reaped, and only then is the off one-shot launched, so
    /// the kill happens-before the off pass for this kind.
    pub fn stop(&mut self, kind: PeripheralKind) -> Result<()> {
        let Some(mut proc) = self.procs.remove(&kind) else {
            debug!(%kind, "peripheral not running, stop ignored");
            return Ok(());
        };
        let pid = Pid::from_raw(proc.child.id() as i32);
        if let Err(err) = kill(pid, Signal::SIGKILL) {
            // Already exited on its own; the off pass below still runs.
            warn!(%kind, %pid, %err, "kill failed");
        }
        if let Err(err) = proc.child.wait() {
            warn!(%kind, %err, "failed to reap peripheral process");
        }
        info!(%kind, %pid, "peripheral killed");
        self.run_off_pass(kind)
    }

    /// Best-effort stop of every kind; one failure never blocks the rest.
    pub fn stop_all(&mut self) {
        for kind in PeripheralKind::ALL {
            if let Err(err) = self.stop(kind) {
                warn!(%kind, %err, "peripheral cleanup failed");
            }
        }
    }

    /// Launch the one-shot off entry and wait for it to finish.
    ///
    /// The killed run-loop cannot guarantee it left its outputs low, so the
    /// off pass runs in a fresh process with its own claim on the fixture.
    fn run_off_pass(&self, kind: PeripheralKind) -> Result<()> {
        let spec = &self.specs[&kind];
        let mut child = Command::new(&spec.program)
            .args(&spec.off_args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ControlError::PeripheralSpawn { peripheral: kind.label(), source })?;
        let status = child.wait()?;
        debug!(%kind, %status, "off pass completed");
        Ok(())
    }
}

impl Drop for LightSupervisor {
    fn drop(&mut self) {
        // Last line of defense; the shutdown coordinator normally runs first
        // and leaves nothing to do here.
        self.stop_all();
    }
}
