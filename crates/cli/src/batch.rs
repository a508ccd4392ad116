use std::io::Write;
use std::path::Path;

use rayon::prelude::*;

use lander_shared::*;
use lander_sim::run_flight;

use crate::resolve_pilot;

/// A single flight to be run in parallel.
struct FlightJob {
    scenario: Scenario,
    pilot: String,
    seed: u64,
    max_ticks: u32,
    sim_config: SimConfig,
}

fn run_job(job: &FlightJob) -> FlightResult {
    let mut pilot = resolve_pilot(&job.pilot);
    let config = FlightConfig {
        seed: job.seed,
        scenario: job.scenario,
        pilot_name: pilot.name().to_string(),
        max_ticks: job.max_ticks,
        sim_config: job.sim_config,
    };
    run_flight(&config, pilot.as_mut()).result
}

/// Aggregated outcome of every seed of a batch.
#[derive(Debug, Default)]
struct BatchSummary {
    flights: u32,
    survived: u32,
    stranded: u32,
    destroyed: Vec<(DeathCause, u32)>,
    mean_ticks: f32,
    mean_fuel_used: f32,
    landings: u32,
    perfect_landings: u32,
    deliveries: u32,
    juggles: u32,
}

fn summarize(results: &[FlightResult]) -> BatchSummary {
    let mut summary = BatchSummary {
        flights: results.len() as u32,
        ..Default::default()
    };
    if results.is_empty() {
        return summary;
    }

    for r in results {
        match r.outcome {
            FlightOutcome::Survived => summary.survived += 1,
            FlightOutcome::Stranded => summary.stranded += 1,
            FlightOutcome::Destroyed(cause) => match summary.destroyed.iter_mut().find(|(c, _)| *c == cause) {
                Some((_, n)) => *n += 1,
                None => summary.destroyed.push((cause, 1)),
            },
        }
        summary.landings += r.stats.landings;
        summary.perfect_landings += r.stats.perfect_landings;
        summary.deliveries += r.stats.deliveries;
        summary.juggles += r.stats.juggles;
    }

    let n = results.len() as f32;
    summary.mean_ticks = results.iter().map(|r| r.final_tick as f32).sum::<f32>() / n;
    summary.mean_fuel_used = results.iter().map(|r| r.stats.fuel_used).sum::<f32>() / n;
    summary.destroyed.sort_by(|a, b| b.1.cmp(&a.1));
    summary
}

fn print_summary(scenario: Scenario, pilot: &str, summary: &BatchSummary) {
    println!("\n--- {} / {} ---", scenario, pilot);
    println!("{:<20} {:>8}", "flights", summary.flights);
    println!("{:<20} {:>8}", "survived", summary.survived);
    println!("{:<20} {:>8}", "stranded", summary.stranded);
    for (cause, count) in &summary.destroyed {
        println!("{:<20} {:>8}   {}", "destroyed", count, cause);
    }
    println!("{:-<30}", "");
    println!("{:<20} {:>8.1}", "mean ticks", summary.mean_ticks);
    println!("{:<20} {:>8.2}", "mean fuel used", summary.mean_fuel_used);
    println!(
        "{:<20} {:>8}   ({} perfect)",
        "landings", summary.landings, summary.perfect_landings
    );
    println!("{:<20} {:>8}", "deliveries", summary.deliveries);
    println!("{:<20} {:>8}", "juggles", summary.juggles);
}

fn write_csv(path: &Path, seeds: &[u64], results: &[FlightResult]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "seed,outcome,final_tick,fuel_used,landings,perfect_landings,deliveries,juggles,max_speed")?;
    for (seed, r) in seeds.iter().zip(results) {
        let outcome = match r.outcome {
            FlightOutcome::Survived => "survived".to_string(),
            FlightOutcome::Stranded => "stranded".to_string(),
            FlightOutcome::Destroyed(cause) => format!("destroyed:{cause:?}"),
        };
        writeln!(
            file,
            "{},{},{},{:.3},{},{},{},{},{:.3}",
            seed,
            outcome,
            r.final_tick,
            r.stats.fuel_used,
            r.stats.landings,
            r.stats.perfect_landings,
            r.stats.deliveries,
            r.stats.juggles,
            r.stats.max_speed,
        )?;
    }
    Ok(())
}

pub fn cmd_batch(scenario: Scenario, pilot: &str, seeds: u32, max_ticks: u32, sim_config: SimConfig, csv: Option<&Path>) {
    println!(
        "=== Batch ===\nScenario: {} | Pilot: {} | Seeds: {} | Max ticks: {}",
        scenario, pilot, seeds, max_ticks
    );
    let start = std::time::Instant::now();

    let jobs: Vec<FlightJob> = (0..seeds)
        .map(|s| FlightJob {
            scenario,
            pilot: pilot.to_string(),
            seed: s as u64,
            max_ticks,
            sim_config,
        })
        .collect();
    let results: Vec<FlightResult> = jobs.par_iter().map(run_job).collect();

    print_summary(scenario, pilot, &summarize(&results));
    println!("\nCompleted in {:.2}s", start.elapsed().as_secs_f32());

    if let Some(path) = csv {
        let seeds: Vec<u64> = jobs.iter().map(|j| j.seed).collect();
        match write_csv(path, &seeds, &results) {
            Ok(()) => println!("CSV written to {}", path.display()),
            Err(e) => eprintln!("Failed to write CSV: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outcome: FlightOutcome, final_tick: u32) -> FlightResult {
        FlightResult {
            outcome,
            final_tick,
            stats: FlightStats {
                fuel_used: 10.0,
                landings: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let results = [
            result(FlightOutcome::Survived, 100),
            result(FlightOutcome::Destroyed(DeathCause::Water), 50),
            result(FlightOutcome::Destroyed(DeathCause::Water), 30),
            result(FlightOutcome::Destroyed(DeathCause::Lightning), 20),
        ];
        let summary = summarize(&results);

        assert_eq!(summary.flights, 4);
        assert_eq!(summary.survived, 1);
        assert_eq!(summary.destroyed[0], (DeathCause::Water, 2));
        assert_eq!(summary.landings, 4);
        assert!((summary.mean_ticks - 50.0).abs() < 1e-4);
        assert!((summary.mean_fuel_used - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_batch_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.flights, 0);
        assert_eq!(summary.mean_ticks, 0.0);
    }
}
