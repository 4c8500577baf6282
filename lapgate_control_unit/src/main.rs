//! # LapGate Control Unit
//!
//! Two-lane race timer. Loads the TOML configuration, wires the simulation
//! backend to the race engine and runs the control cycle until Ctrl-C (or
//! `--max-cycles`).

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lapgate_common::hal::Clock;
use lapgate_control_unit::config::{LapGateConfig, load_config};
use lapgate_control_unit::cycle::{CycleRunner, Peripherals};
use lapgate_control_unit::error::CycleError;
use lapgate_hal::drivers::simulation::{
    ConsoleDisplay, LoggingIndicator, LoggingLamp, LoggingTone, ScriptedButton, SimulatedTrack,
};
use lapgate_hal::{FileConfigStore, MonotonicClock};

/// LapGate Control Unit, dual-lane race timing
#[derive(Parser, Debug)]
#[command(name = "lapgate_control_unit")]
#[command(version)]
#[command(about = "Dual-lane infrared race timer")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(default_value = "config/lapgate.toml")]
    config: PathBuf,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Stop after this many cycles.
    #[arg(long, value_name = "N")]
    max_cycles: Option<u64>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("LapGate Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), CycleError> {
    let config = load_config(&args.config).inspect_err(|_| {
        setup_tracing(args, "info");
        error!("Failed to load {}", args.config.display());
    })?;
    setup_tracing(args, config.shared.log_level.as_directive());

    info!(
        "LapGate Control Unit v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );
    info!(
        "Config OK: cycle_time={}ms, min_lap={}ms, thresholds={}/{}",
        config.control.cycle_time_ms,
        config.timing.min_lap_ms,
        config.sensor.lap_threshold,
        config.sensor.sync_threshold,
    );

    let clock = MonotonicClock::new();
    let io = simulation_peripherals(&config, clock);
    let mut runner = CycleRunner::new(&config, io, clock.now_ms());
    info!("CycleRunner initialized, entering control loop");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    runner.run(&clock, &running, args.max_cycles);
    Ok(())
}

fn simulation_peripherals(config: &LapGateConfig, clock: MonotonicClock) -> Peripherals {
    let sim = &config.simulation;
    Peripherals {
        sensors: Box::new(SimulatedTrack::new(sim, clock)),
        button: Box::new(ScriptedButton::new(&sim.button, clock)),
        displays: [
            Box::new(ConsoleDisplay::new("lane 1")),
            Box::new(ConsoleDisplay::new("lane 2")),
        ],
        tone: Box::new(LoggingTone::default()),
        indicator: Box::new(LoggingIndicator::default()),
        lamp: Box::new(LoggingLamp::default()),
        store: Box::new(FileConfigStore::new(&config.control.store_path)),
    }
}

/// Setup tracing subscriber. `--verbose` forces DEBUG; otherwise `RUST_LOG`,
/// then the configured level.
fn setup_tracing(args: &Args, default_level: &str) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
