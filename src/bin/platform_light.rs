//! # Platform Light Peripheral
//!
//! Holds the platform LED strip on as an independent process until
//! terminated. Same entry point contract as the traffic light: a forever
//! `run` loop plus a one-shot `off` pass the supervisor uses after a forced
//! kill.

use clap::{Parser, Subcommand};
use mbit_control::constants::PLATFORM_LIGHT_PIN;
use mbit_control::fixture::OutputBank;
use mbit_control::sequencer::PlatformLight;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "platform-light")]
#[command(version)]
#[command(about = "Platform LED strip run-loop for the robot platform")]
struct Args {
    #[command(subcommand)]
    entry: Entry,
}

#[derive(Subcommand, Debug)]
enum Entry {
    /// Hold the strip on until terminated
    Run,
    /// Drive the output low and exit immediately
    Off,
}

#[cfg(feature = "rpi-gpio")]
fn open_bank() -> mbit_control::Result<mbit_control::GpioBank> {
    mbit_control::GpioBank::new(&[PLATFORM_LIGHT_PIN])
}

#[cfg(not(feature = "rpi-gpio"))]
fn open_bank() -> mbit_control::Result<mbit_control::SimBank> {
    Ok(mbit_control::SimBank::new("platform-light", &[PLATFORM_LIGHT_PIN]))
}

fn main() {
    if let Err(e) = run() {
        error!("platform light failed: {e}");
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
            PlatformLight::new(bank).run(&stop)?;
        }
        Entry::Off => {
            bank.all_off()?;
            info!("platform light output low");
        }
    }
    Ok(())
}
