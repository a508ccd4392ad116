use lander_shared::*;
use lander_sim::{run_flight, HoverPilot, IdlePilot, Pilot, PilotView};

fn config(scenario: Scenario, seed: u64, max_ticks: u32) -> FlightConfig {
    FlightConfig {
        seed,
        scenario,
        max_ticks,
        ..Default::default()
    }
}

#[test]
fn test_same_seed_same_flight() {
    for scenario in Scenario::ALL {
        let cfg = config(scenario, 7, 1200);
        let a = run_flight(&cfg, &mut HoverPilot::hold(120.0).toward(200.0));
        let b = run_flight(&cfg, &mut HoverPilot::hold(120.0).toward(200.0));

        let a = serde_json::to_string(&a).expect("serialize");
        let b = serde_json::to_string(&b).expect("serialize");
        assert_eq!(a, b, "{scenario} flight is not deterministic");
    }
}

#[test]
fn test_flight_log_round_trips_through_json() {
    let log = run_flight(&config(Scenario::Storm, 3, 600), &mut IdlePilot);
    let json = serde_json::to_string(&log).expect("serialize");
    let back: FlightLog = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back.frames.len(), log.frames.len());
    assert_eq!(back.events, log.events);
    assert_eq!(back.result.outcome, log.result.outcome);
    assert_eq!(back.config.scenario, Scenario::Storm);
}

#[test]
fn test_gentle_descent_lands_perfectly_on_meadow_pad() {
    let log = run_flight(&config(Scenario::Meadow, 1, 900), &mut HoverPilot::descend());

    let landing = log.events.iter().find_map(|e| match e.event {
        SimEvent::LandingResolved { quality, site, .. } => Some((quality, site)),
        _ => None,
    });
    assert!(
        matches!(landing, Some((LandingQuality::Perfect, LandingSite::Pad(_)))),
        "expected a perfect pad landing, got {:?} (outcome {:?})",
        landing,
        log.result.outcome
    );
    assert_eq!(log.result.outcome, FlightOutcome::Survived);
    assert_eq!(log.result.stats.perfect_landings, 1);
}

#[test]
fn test_cargo_scenario_picks_up_the_crate() {
    let log = run_flight(&config(Scenario::Cargo, 1, 900), &mut HoverPilot::descend());

    assert!(
        log.events.iter().any(|e| e.event
            == SimEvent::CargoAttached {
                id: VehicleId(0),
                cargo_type: CargoClass::Light
            }),
        "descending onto the crate should hook it"
    );
}

/// Retracts the gear on the first tick, then brakes like a careful pilot.
struct GearUpPilot {
    retracted: bool,
}

impl Pilot for GearUpPilot {
    fn name(&self) -> &str {
        "gear_up"
    }

    fn fly(&mut self, view: &PilotView) -> ControlState {
        let toggle = !self.retracted;
        self.retracted = true;
        ControlState {
            gear_toggle: toggle,
            thrust: view.vehicle.vy < -1.0,
            ..ControlState::none()
        }
    }
}

#[test]
fn test_gear_up_touchdown_is_fatal() {
    let cfg = FlightConfig {
        sim_config: SimConfig {
            spawn_invulnerability_ms: 0,
            ..SimConfig::default()
        },
        ..config(Scenario::Meadow, 1, 1200)
    };
    let log = run_flight(&cfg, &mut GearUpPilot { retracted: false });

    assert_eq!(
        log.result.outcome,
        FlightOutcome::Destroyed(DeathCause::GearNotDeployed),
        "events: {:?}",
        log.events
    );
}

#[test]
fn test_collisions_are_logged_with_timestamps() {
    let log = run_flight(&config(Scenario::Meadow, 1, 900), &mut HoverPilot::descend());
    let first = log.collisions.first().expect("touchdown produces a collision event");

    assert_eq!(first.category, CollisionCategory::LandingPad);
    assert_eq!(first.vehicle, VehicleId(0));
    assert!(first.timestamp_ms > 0);
}
