use lander_shared::*;

use crate::pilot::{Pilot, PilotView};
use crate::scenario::{build_world, viewport_around, wind_at};
use crate::world::{TickInput, World};

/// Fly one deterministic headless flight.
pub fn run_flight(config: &FlightConfig, pilot: &mut dyn Pilot) -> FlightLog {
    let (mut world, id) = build_world(config);
    fly(&mut world, id, config, pilot)
}

/// Fly a pilot through an already built world until its vehicle is lost or
/// the tick limit is reached.
pub fn fly(world: &mut World, id: VehicleId, config: &FlightConfig, pilot: &mut dyn Pilot) -> FlightLog {
    let mut frames = Vec::new();
    let mut events = Vec::new();
    let mut collisions = Vec::new();
    let mut outcome = FlightOutcome::Survived;

    // Capture initial frame
    frames.push(world.snapshot());

    for _ in 0..config.max_ticks {
        let Some(view) = PilotView::observe(world, id) else {
            break;
        };
        let input = TickInput {
            controls: vec![(id, pilot.fly(&view))],
            wind: wind_at(config.scenario, world.tick()),
            viewport: viewport_around(glam::Vec2::new(view.vehicle.x, view.vehicle.y)),
        };
        world.step(&input);

        for e in world.drain_events() {
            match e.event {
                SimEvent::VehicleDestroyed { id: v, cause, .. } if v == id => {
                    outcome = FlightOutcome::Destroyed(cause);
                }
                SimEvent::VehicleStranded { id: v, .. } if v == id => outcome = FlightOutcome::Stranded,
                _ => {}
            }
            events.push(e);
        }
        collisions.extend(world.drain_collisions());

        // Record frame every FRAME_INTERVAL ticks
        if world.tick() % FRAME_INTERVAL == 0 {
            frames.push(world.snapshot());
        }

        if outcome != FlightOutcome::Survived {
            if world.tick() % FRAME_INTERVAL != 0 {
                frames.push(world.snapshot());
            }
            break;
        }
    }

    tracing::debug!(
        pilot = pilot.name(),
        scenario = %config.scenario,
        seed = config.seed,
        ?outcome,
        ticks = world.tick(),
        "flight finished"
    );

    FlightLog {
        config: config.clone(),
        frames,
        events,
        collisions,
        result: FlightResult {
            outcome,
            final_tick: world.tick(),
            stats: world.stats(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pilot::{HoverPilot, IdlePilot};

    #[test]
    fn test_flight_records_frames() {
        let config = FlightConfig {
            max_ticks: 120,
            ..Default::default()
        };
        let log = run_flight(&config, &mut HoverPilot::hold(250.0));

        assert_eq!(log.result.outcome, FlightOutcome::Survived);
        assert_eq!(log.result.final_tick, 120);
        // One frame every FRAME_INTERVAL ticks plus the initial one
        assert_eq!(log.frames.len(), 120 / FRAME_INTERVAL as usize + 1);
    }

    #[test]
    fn test_idle_pilot_crashes_and_flight_ends() {
        let config = FlightConfig {
            scenario: Scenario::Meadow,
            sim_config: SimConfig {
                spawn_invulnerability_ms: 0,
                ..SimConfig::default()
            },
            ..Default::default()
        };
        let log = run_flight(&config, &mut IdlePilot);

        assert!(
            matches!(log.result.outcome, FlightOutcome::Destroyed(_)),
            "unpowered fall from the spawn height is fatal, got {:?}",
            log.result.outcome
        );
        assert!(log.result.final_tick < config.max_ticks);
        let last = log.frames.last().expect("final frame");
        assert_eq!(last.tick, log.result.final_tick);
    }
}
