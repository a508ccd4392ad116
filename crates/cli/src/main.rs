mod batch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lander_shared::*;
use lander_sim::{run_flight, HoverPilot, IdlePilot, Pilot};

#[derive(Parser)]
#[command(name = "lander", about = "Hazard-flight simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fly one headless flight
    Run {
        /// Scenario to fly (meadow, harbor, storm, cargo)
        #[arg(long, default_value_t = Scenario::Meadow)]
        scenario: Scenario,

        /// Pilot (idle, hover, descend)
        #[arg(long, default_value = "descend")]
        pilot: String,

        /// Random seed for the flight
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Tick limit
        #[arg(long, default_value_t = MAX_TICKS)]
        ticks: u32,

        /// Output path for flight log JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// JSON file overriding simulation parameters
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Fly many seeds in parallel and summarize the outcomes
    Batch {
        #[arg(long, default_value_t = Scenario::Meadow)]
        scenario: Scenario,

        #[arg(long, default_value = "descend")]
        pilot: String,

        /// Number of seeds, starting from 0
        #[arg(long, default_value_t = 32)]
        seeds: u32,

        #[arg(long, default_value_t = MAX_TICKS)]
        ticks: u32,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Per-flight CSV output
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Resolve a pilot name to a boxed Pilot trait object.
///
/// Supported names:
/// - "idle" -> IdlePilot
/// - "hover" -> HoverPilot holding 150 units
/// - "descend" -> HoverPilot descending gently
pub(crate) fn resolve_pilot(name: &str) -> Box<dyn Pilot> {
    match name {
        "idle" => Box::new(IdlePilot),
        "hover" => Box::new(HoverPilot::hold(150.0)),
        "descend" => Box::new(HoverPilot::descend()),
        other => {
            eprintln!("Unknown pilot '{}'. Valid options: idle, hover, descend.", other);
            std::process::exit(1);
        }
    }
}

fn load_sim_config(path: Option<&Path>) -> SimConfig {
    let Some(path) = path else {
        return SimConfig::default();
    };
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<SimConfig>(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded simulation config");
            config
        }
        Err(e) => {
            eprintln!("Failed to load config {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            pilot,
            seed,
            ticks,
            output,
            config,
        } => {
            let sim_config = load_sim_config(config.as_deref());
            cmd_run(scenario, &pilot, seed, ticks, sim_config, output)
        }

        Commands::Batch {
            scenario,
            pilot,
            seeds,
            ticks,
            config,
            csv,
        } => {
            let sim_config = load_sim_config(config.as_deref());
            // Fail before spawning workers on a bad name
            let _ = resolve_pilot(&pilot);
            batch::cmd_batch(scenario, &pilot, seeds, ticks, sim_config, csv.as_deref())
        }
    }
}

fn cmd_run(scenario: Scenario, pilot_name: &str, seed: u64, ticks: u32, sim_config: SimConfig, output: Option<PathBuf>) {
    let mut pilot = resolve_pilot(pilot_name);

    let config = FlightConfig {
        seed,
        scenario,
        pilot_name: pilot.name().to_string(),
        max_ticks: ticks,
        sim_config,
    };

    println!("Flying {} with {} (seed={})", scenario, pilot.name(), seed);

    let log = run_flight(&config, pilot.as_mut());
    let result = &log.result;

    println!();
    println!("=== Flight Result ===");
    match result.outcome {
        FlightOutcome::Destroyed(cause) => println!("Outcome:    destroyed ({})", cause),
        other => println!("Outcome:    {:?}", other),
    }
    println!(
        "Final tick: {} ({:.1}s)",
        result.final_tick,
        result.final_tick as f32 / TICK_RATE as f32
    );
    println!();
    println!("--- Stats ---");
    println!("  Fuel used:  {:.1}", result.stats.fuel_used);
    println!(
        "  Landings:   {} ({} perfect)",
        result.stats.landings, result.stats.perfect_landings
    );
    println!("  Deliveries: {}", result.stats.deliveries);
    println!("  Juggles:    {}", result.stats.juggles);
    println!("  Max speed:  {:.2}", result.stats.max_speed);
    println!("  Events:     {}", log.events.len());

    if let Some(path) = output {
        match serde_json::to_string_pretty(&log) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => println!("\nFlight log written to {}", path.display()),
                Err(e) => eprintln!("\nFailed to write flight log: {}", e),
            },
            Err(e) => eprintln!("\nFailed to serialize flight log: {}", e),
        }
    }
}
