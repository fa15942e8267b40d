//! # Traffic Light Peripheral
//!
//! Runs the four-phase traffic light cycle as an independent process. The
//! supervisor in the control station spawns the `run` entry and force-kills
//! it on toggle-off, then invokes the `off` entry to guarantee a dark
//! fixture.
//!
//! # Usage
//!
//! ```bash
//! # Cycle forever (SIGINT turns everything off and exits)
//! traffic-light run
//!
//! # One pass: all outputs low, release the fixture, exit
//! traffic-light off
//! ```

use clap::{Parser, Subcommand};
use mbit_control::constants::TRAFFIC_LIGHT_PINS;
use mbit_control::fixture::OutputBank;
use mbit_control::sequencer::TrafficSequencer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "traffic-light")]
#[command(version)]
#[command(about = "Four-phase traffic light run-loop for the robot platform")]
struct Args {
    #[command(subcommand)]
    entry: Entry,
}

#[derive(Subcommand, Debug)]
enum Entry {
    /// Cycle the two signal heads forever until terminated
    Run,
    /// Drive all six outputs low and exit immediately
    Off,
}

#[cfg(feature = "rpi-gpio")]
fn open_bank() -> mbit_control::Result<mbit_control::GpioBank> {
    mbit_control::GpioBank::new(&TRAFFIC_LIGHT_PINS)
}

#[cfg(not(feature = "rpi-gpio"))]
fn open_bank() -> mbit_control::Result<mbit_control::SimBank> {
    Ok(mbit_control::SimBank::new("traffic-light", &TRAFFIC_LIGHT_PINS))
}

fn main() {
    if let Err(e) = run() {
        error!("traffic light failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut bank = open_bank()?;

    match args.entry {
        Entry::Run => {
            let stop = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&stop);
            ctrlc::set_handler(move || {
                info!("received shutdown signal");
                flag.store(true, Ordering::SeqCst);
            })?;
            TrafficSequencer::new(bank).run(&stop)?;
        }
        Entry::Off => {
            bank.all_off()?;
            info!("all traffic light outputs low");
        }
    }
    Ok(())
}
