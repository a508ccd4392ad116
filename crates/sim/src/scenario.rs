//! Prebuilt worlds for headless runs.

use glam::Vec2;
use lander_shared::*;

use crate::bodies::BodyKind;
use crate::geometry::WaterRegion;
use crate::terrain::Heightfield;
use crate::world::World;

const SPAWN_ALTITUDE: f32 = 300.0;

fn meadow_terrain() -> Heightfield {
    Heightfield::new([
        (-2000.0, 120.0),
        (-600.0, 40.0),
        (-200.0, 0.0),
        (600.0, 0.0),
        (700.0, 90.0),
        (900.0, 0.0),
        (1600.0, 0.0),
        (2400.0, 160.0),
    ])
}

/// Build the world for a flight and return it with the piloted vehicle.
pub fn build_world(config: &FlightConfig) -> (World, VehicleId) {
    let sim = config.sim_config;
    match config.scenario {
        Scenario::Meadow => {
            let mut world = World::new(meadow_terrain(), sim, config.seed);
            world.add_pad(0.0, 10.0, 120.0);
            world.add_pad(1200.0, 10.0, 120.0);
            world.spawn_body(BodyKind::Tombstone, Vec2::new(350.0, 10.0), Vec2::ZERO);
            world.spawn_body(BodyKind::Marker, Vec2::new(-120.0, 10.0), Vec2::ZERO);
            let id = world.spawn_vehicle(Vec2::new(0.0, SPAWN_ALTITUDE));
            (world, id)
        }
        Scenario::Harbor => {
            let terrain = Heightfield::new([
                (-1000.0, 20.0),
                (200.0, 20.0),
                (240.0, -200.0),
                (1560.0, -200.0),
                (1600.0, 20.0),
                (2800.0, 20.0),
            ]);
            let mut world = World::new(terrain, sim, config.seed);
            world.set_water(Some(WaterRegion {
                min_x: 200.0,
                max_x: 1600.0,
                surface_y: 0.0,
            }));
            world.add_pad(0.0, 30.0, 120.0);
            world.add_boat(900.0, 12.0, 50.0, 1.0, (500.0, 1300.0));
            world.add_wall(200.0, 8.0, 40.0);
            world.add_wall(1600.0, 8.0, 40.0);
            let id = world.spawn_vehicle(Vec2::new(0.0, SPAWN_ALTITUDE));
            (world, id)
        }
        Scenario::Storm => {
            let mut world = World::new(meadow_terrain(), sim, config.seed);
            world.set_weather(Weather::Stormy);
            world.add_pad(0.0, 10.0, 120.0);
            world.add_building(-400.0, 80.0, 20.0, 180.0);
            world.add_building(450.0, 60.0, 0.0, 140.0);
            world.add_cloud(Vec2::new(0.0, SPAWN_ALTITUDE + 180.0), 60.0);
            world.add_cloud(Vec2::new(600.0, SPAWN_ALTITUDE + 220.0), 60.0);
            for x in [-150.0, 120.0, 250.0] {
                world.spawn_body(BodyKind::Prop, Vec2::new(x, 10.0), Vec2::ZERO);
            }
            let id = world.spawn_vehicle(Vec2::new(0.0, SPAWN_ALTITUDE));
            (world, id)
        }
        Scenario::Cargo => {
            let mut world = World::new(meadow_terrain(), sim, config.seed);
            world.add_pad(0.0, 10.0, 120.0);
            world.spawn_body(BodyKind::Cargo(CargoClass::Light), Vec2::new(300.0, CARGO_RADIUS), Vec2::ZERO);
            world.spawn_body(BodyKind::Cargo(CargoClass::Heavy), Vec2::new(-300.0, CARGO_RADIUS), Vec2::ZERO);
            let id = world.spawn_vehicle(Vec2::new(300.0, SPAWN_ALTITUDE));
            (world, id)
        }
    }
}

/// Wind strength for a scenario at a given tick.
pub fn wind_at(scenario: Scenario, tick: u32) -> f32 {
    match scenario {
        Scenario::Meadow | Scenario::Cargo => 0.0,
        Scenario::Harbor => 0.2,
        Scenario::Storm => 0.6 * (tick as f32 * 0.01).sin(),
    }
}

/// Region a renderer following the vehicle would show.
pub fn viewport_around(center: Vec2) -> Viewport {
    let half = Vec2::new(640.0, 360.0);
    Viewport::new(center - half, center + half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::VehicleRegistry;

    #[test]
    fn test_every_scenario_builds_with_a_live_vehicle() {
        for scenario in Scenario::ALL {
            let config = FlightConfig {
                scenario,
                ..Default::default()
            };
            let (world, id) = build_world(&config);
            let v = world.vehicle(id).expect("pilot vehicle exists");
            assert!(v.alive);
            assert!(!world.pads().is_empty(), "{scenario} needs a pad");
        }
    }

    #[test]
    fn test_storm_wind_gusts_both_ways() {
        let winds: Vec<f32> = (0..1000).step_by(50).map(|t| wind_at(Scenario::Storm, t)).collect();
        assert!(winds.iter().any(|w| *w > 0.3));
        assert!(winds.iter().any(|w| *w < -0.3));
        assert_eq!(wind_at(Scenario::Meadow, 500), 0.0);
    }
}
