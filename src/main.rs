//! # mBit Control Console
//!
//! Interactive operator console replacing the original GUI shell. Movement
//! commands are encoded and transmitted over the serial link; the two
//! platform light fixtures are toggled on and off as supervised processes.
//! Quitting, cancelling a prompt, an interrupt and an external termination
//! signal all funnel into the same idempotent shutdown path.
//!
//! # Usage
//!
//! ```bash
//! # Pick a port interactively
//! mbit-control
//!
//! # Or name the endpoint and settings directory
//! mbit-control --port /dev/ttyACM0 --settings-dir ./settings
//! ```

use clap::Parser;
use inquire::{InquireError, Select, Text};
use mbit_control::constants::{DEFAULT_PORT, DEFAULT_SETTINGS_DIR};
use mbit_control::{
    App, ControlError, Direction, LightSupervisor, PeripheralKind, RobotLink, StepFactorStore,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mbit-control")]
#[command(version)]
#[command(about = "Control station for the mBit tracked robot and its platform lights")]
struct Args {
    /// Serial endpoint of the mBit transmitter; prompted for when omitted
    #[arg(short, long)]
    port: Option<String>,

    /// Directory holding the persisted step factors
    #[arg(long, default_value = DEFAULT_SETTINGS_DIR)]
    settings_dir: PathBuf,
}

/// Whether the menu loop should keep going after an action.
enum Flow {
    Continue,
    Quit,
}

fn main() {
    if let Err(e) = run() {
        error!("startup failed: {e}");
        eprintln!("Cannot start: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let args = Args::parse();

    // Initialization order: load config, open transport, enter the loop.
    let factors = StepFactorStore::load(&args.settings_dir)?;
    let port = match args.port {
        Some(port) => port,
        None => select_port()?,
    };
    // A connect failure is fatal: without the link no command can ever be
    // delivered, so report and terminate before the main loop.
    let link = RobotLink::connect(&port)?;
    let supervisor = LightSupervisor::with_sibling_binaries()?;
    let app = Arc::new(Mutex::new(App::new(factors, link, supervisor)));

    // An external termination signal (SIGINT/SIGTERM outside a prompt, e.g.
    // while blocked in a transmit or an off-pass wait) runs the same
    // teardown the menu exit does; the done flag makes the overlap safe.
    let signal_app = Arc::clone(&app);
    ctrlc::set_handler(move || {
        info!("received termination signal");
        lock_app(&signal_app).shutdown();
        std::process::exit(0);
    })?;

    info!("console ready");
    loop {
        match menu(&app)? {
            Flow::Continue => {}
            Flow::Quit => break,
        }
    }

    lock_app(&app).shutdown();
    Ok(())
}

/// Lock the shared context. A poisoned lock still tears down cleanly.
fn lock_app(app: &Mutex<App>) -> MutexGuard<'_, App> {
    app.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interactive serial port selection, falling back to a free-text prompt
/// when enumeration finds nothing.
fn select_port() -> Result<String, Box<dyn std::error::Error>> {
    let ports = RobotLink::list_ports()?;
    if ports.is_empty() {
        let entered = Text::new("Serial endpoint:").with_default(DEFAULT_PORT).prompt()?;
        return Ok(entered);
    }

    let port_names: Vec<String> = ports
        .iter()
        .map(|p| format!("{} - {:?}", p.port_name, p.port_type))
        .collect();
    let selection = Select::new("Select the transmitter port:", port_names).prompt()?;
    // Extract just the port name (before " - ")
    Ok(selection.split(" - ").next().unwrap_or(DEFAULT_PORT).to_string())
}

fn menu(app: &Mutex<App>) -> Result<Flow, Box<dyn std::error::Error>> {
    const DRIVE: &str = "Drive (direction + steps)";
    const NUDGE: &str = "Single step";
    const LIGHTS: &str = "Toggle lights";
    const FACTORS: &str = "Step factors";
    const QUIT: &str = "Quit";

    let choice = match Select::new("Command:", vec![DRIVE, NUDGE, LIGHTS, FACTORS, QUIT]).prompt()
    {
        Ok(choice) => choice,
        // Esc or Ctrl-C at the top level quits; shutdown runs afterwards.
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            return Ok(Flow::Quit)
        }
        Err(e) => return Err(e.into()),
    };

    match choice {
        DRIVE => drive(app),
        NUDGE => nudge(app),
        LIGHTS => toggle_lights(app),
        FACTORS => update_factors(app),
        QUIT => return Ok(Flow::Quit),
        _ => unreachable!(),
    }
}

/// Select a direction. `None` means the operator backed out.
fn prompt_direction(with_stop: bool) -> Result<Option<Direction>, Box<dyn std::error::Error>> {
    let mut options = vec![
        ("Forward", Direction::Forward),
        ("Backward", Direction::Backward),
        ("Left", Direction::Left),
        ("Right", Direction::Right),
    ];
    if with_stop {
        options.push(("Stop", Direction::Stop));
    }
    let labels: Vec<&str> = options.iter().map(|(label, _)| *label).collect();
    match Select::new("Direction:", labels).prompt() {
        Ok(label) => Ok(options.iter().find(|(l, _)| *l == label).map(|(_, d)| *d)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn drive(app: &Mutex<App>) -> Result<Flow, Box<dyn std::error::Error>> {
    let Some(direction) = prompt_direction(true)? else {
        return Ok(Flow::Continue);
    };
    let steps = match Text::new("Steps:").prompt() {
        Ok(text) => text,
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            return Ok(Flow::Continue)
        }
        Err(e) => return Err(e.into()),
    };
    report(lock_app(app).drive(direction, &steps));
    Ok(Flow::Continue)
}

fn nudge(app: &Mutex<App>) -> Result<Flow, Box<dyn std::error::Error>> {
    let Some(direction) = prompt_direction(false)? else {
        return Ok(Flow::Continue);
    };
    report(lock_app(app).nudge(direction));
    Ok(Flow::Continue)
}

fn toggle_lights(app: &Mutex<App>) -> Result<Flow, Box<dyn std::error::Error>> {
    let options: Vec<String> = {
        let app = lock_app(app);
        PeripheralKind::ALL
            .iter()
            .map(|&kind| {
                let state = if app.peripheral_running(kind) { "on" } else { "off" };
                format!("{kind} [{state}]")
            })
            .collect()
    };
    let choice = match Select::new("Fixture:", options).prompt() {
        Ok(choice) => choice,
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            return Ok(Flow::Continue)
        }
        Err(e) => return Err(e.into()),
    };
    let kind = if choice.starts_with(PeripheralKind::TrafficLight.label()) {
        PeripheralKind::TrafficLight
    } else {
        PeripheralKind::PlatformLight
    };
    match lock_app(app).toggle_peripheral(kind) {
        Ok(true) => println!("{kind} is now on"),
        Ok(false) => println!("{kind} is now off"),
        Err(e) => eprintln!("{e}"),
    }
    Ok(Flow::Continue)
}

fn update_factors(app: &Mutex<App>) -> Result<Flow, Box<dyn std::error::Error>> {
    let current = lock_app(app).factors();
    let prompt = |label: &str, current: u32| -> Result<Option<String>, Box<dyn std::error::Error>> {
        match Text::new(label).with_default(&current.to_string()).prompt() {
            Ok(text) => Ok(Some(text)),
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    };

    let Some(fb) = prompt("Step length factor (forward/backward):", current.longitudinal)? else {
        return Ok(Flow::Continue);
    };
    let Some(lr) = prompt("Turn angle factor (left/right):", current.rotational)? else {
        return Ok(Flow::Continue);
    };

    let parse = |text: &str| -> Option<u32> { text.trim().parse().ok() };
    match (parse(&fb), parse(&lr)) {
        (Some(longitudinal), Some(rotational)) => {
            report(lock_app(app).update_factors(longitudinal, rotational));
        }
        _ => eprintln!("Factors must be positive integers; nothing was changed"),
    }
    Ok(Flow::Continue)
}

/// Print a recoverable failure without leaving the console.
fn report(result: Result<(), ControlError>) {
    if let Err(e) = result {
        eprintln!("{e}");
    }
}
