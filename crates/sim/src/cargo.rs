//! Towed cargo swinging under the vehicle.
//!
//! The pendulum is integrated in the vehicle's non-inertial frame: the
//! vehicle's own acceleration is subtracted from gravity, so hard boosts and
//! turns swing the load. Angles are measured clockwise from straight down,
//! the same sense as the vehicle orientation.

use glam::Vec2;
use lander_shared::*;
use std::f32::consts::PI;
use thiserror::Error;

use crate::bodies::{Body, BodyKind};
use crate::vehicle::VehicleState;

#[derive(Debug, Error, PartialEq)]
pub enum CargoError {
    #[error("{vehicle} already tows {held:?} cargo")]
    AlreadyCarrying { vehicle: VehicleId, held: CargoClass },
    #[error("{0} is not towing anything")]
    NotCarrying(VehicleId),
    #[error("{0} is destroyed")]
    VehicleDestroyed(VehicleId),
    #[error("{0} is not cargo")]
    NotCargo(BodyId),
    #[error("cargo is {distance:.1} units away (max {max})")]
    OutOfRange { distance: f32, max: f32 },
}

/// Per-class pendulum constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumParams {
    pub wire_length: f32,
    pub damping: f32,
    pub coupling: f32,
    pub max_angle: f32,
    /// Factor applied to the angular velocity when the swing hits its limit.
    pub rebound: f32,
}

impl PendulumParams {
    pub fn for_class(class: CargoClass) -> Self {
        match class {
            CargoClass::Light => Self {
                wire_length: 45.0,
                damping: 0.97,
                coupling: 0.8,
                max_angle: 0.6 * PI,
                rebound: -0.3,
            },
            CargoClass::Heavy => Self {
                wire_length: 55.0,
                damping: 0.95,
                coupling: 0.6,
                max_angle: 0.5 * PI,
                rebound: -0.2,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CargoPendulum {
    pub owner: VehicleId,
    pub cargo: BodyId,
    pub class: CargoClass,
    /// Swing angle relative to the vehicle orientation.
    pub theta: f32,
    pub omega: f32,
    pub params: PendulumParams,
    prev_parent_velocity: Option<Vec2>,
}

impl CargoPendulum {
    pub fn new(owner: VehicleId, cargo: BodyId, class: CargoClass) -> Self {
        Self {
            owner,
            cargo,
            class,
            theta: 0.0,
            omega: 0.0,
            params: PendulumParams::for_class(class),
            prev_parent_velocity: None,
        }
    }

    pub fn world_angle(&self, parent_angle: f32) -> f32 {
        parent_angle + self.theta
    }

    /// Where the load hangs for a given hook point and vehicle orientation.
    pub fn cargo_position(&self, hook: Vec2, parent_angle: f32) -> Vec2 {
        hook + hanging_direction(self.world_angle(parent_angle)) * self.params.wire_length
    }

    /// Advance one tick given the vehicle's fresh velocity and orientation.
    pub fn step(&mut self, parent_velocity: Vec2, parent_angle: f32, parent_angular_velocity: f32, gravity: f32) {
        let accel = parent_velocity - self.prev_parent_velocity.unwrap_or(parent_velocity);
        self.prev_parent_velocity = Some(parent_velocity);

        let effective_gravity = Vec2::new(0.0, -gravity) - accel;
        let g_mag = effective_gravity.length();
        let g_angle = f32::atan2(-effective_gravity.x, -effective_gravity.y);

        let p = self.params;
        let restoring = -(g_mag / p.wire_length) * (self.world_angle(parent_angle) - g_angle).sin();
        let spin = -parent_angular_velocity * p.coupling;

        self.omega += restoring + spin;
        self.omega *= p.damping;
        self.theta += self.omega;

        if !self.theta.is_finite() || !self.omega.is_finite() {
            tracing::warn!(vehicle = %self.owner, "pendulum state diverged, resetting to rest");
            self.theta = 0.0;
            self.omega = 0.0;
        }

        if self.theta > p.max_angle {
            self.theta = p.max_angle;
            self.omega *= p.rebound;
        } else if self.theta < -p.max_angle {
            self.theta = -p.max_angle;
            self.omega *= p.rebound;
        }
    }
}

/// Unit vector from the hook to the load at a world swing angle.
pub fn hanging_direction(world_angle: f32) -> Vec2 {
    Vec2::new(-world_angle.sin(), -world_angle.cos())
}

/// Hook a resting cargo body onto a vehicle. Fails without side effects if
/// the vehicle already tows something or the body is out of reach.
pub fn try_attach(vehicle: &mut VehicleState, body: &Body) -> Result<CargoClass, CargoError> {
    if !vehicle.alive {
        return Err(CargoError::VehicleDestroyed(vehicle.id));
    }
    if let Some(held) = vehicle.cargo_class() {
        return Err(CargoError::AlreadyCarrying {
            vehicle: vehicle.id,
            held,
        });
    }
    let BodyKind::Cargo(class) = body.kind else {
        return Err(CargoError::NotCargo(body.id));
    };
    let distance = vehicle.position.distance(body.position);
    if distance > CARGO_PICKUP_RANGE {
        return Err(CargoError::OutOfRange {
            distance,
            max: CARGO_PICKUP_RANGE,
        });
    }
    vehicle.tow = Some(CargoPendulum::new(vehicle.id, body.id, class));
    Ok(class)
}

/// Unhook the towed load, returning its pendulum state.
pub fn detach(vehicle: &mut VehicleState) -> Result<CargoPendulum, CargoError> {
    vehicle.tow.take().ok_or(CargoError::NotCarrying(vehicle.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vehicle() -> VehicleState {
        VehicleState::new(VehicleId(1), Vec2::new(0.0, 100.0), &SimConfig::default(), 0)
    }

    fn crate_body(id: u32, class: CargoClass, at: Vec2) -> Body {
        Body::new(BodyId(id), BodyKind::Cargo(class), at)
    }

    #[test]
    fn test_second_cargo_rejected_until_drop() {
        let mut v = vehicle();
        let light = crate_body(1, CargoClass::Light, Vec2::new(0.0, 90.0));
        let heavy = crate_body(2, CargoClass::Heavy, Vec2::new(5.0, 90.0));

        assert_eq!(try_attach(&mut v, &light), Ok(CargoClass::Light));
        assert_eq!(v.mass(), LIGHT_CARGO_MASS);

        let err = try_attach(&mut v, &heavy).unwrap_err();
        assert_eq!(
            err,
            CargoError::AlreadyCarrying {
                vehicle: v.id,
                held: CargoClass::Light
            }
        );
        assert_eq!(v.cargo_class(), Some(CargoClass::Light));

        let dropped = detach(&mut v).expect("light cargo is attached");
        assert_eq!(dropped.cargo, BodyId(1));
        assert_eq!(v.mass(), BASE_MASS);

        assert_eq!(try_attach(&mut v, &heavy), Ok(CargoClass::Heavy));
        assert_eq!(v.mass(), HEAVY_CARGO_MASS);
    }

    #[test]
    fn test_pickup_range() {
        let mut v = vehicle();
        let far = crate_body(1, CargoClass::Light, Vec2::new(0.0, 70.0));
        assert!(matches!(try_attach(&mut v, &far), Err(CargoError::OutOfRange { .. })));
        let prop = Body::new(BodyId(2), BodyKind::Prop, Vec2::new(0.0, 95.0));
        assert_eq!(try_attach(&mut v, &prop), Err(CargoError::NotCargo(BodyId(2))));
        assert!(v.tow.is_none());
    }

    #[test]
    fn test_detach_without_cargo() {
        let mut v = vehicle();
        assert_eq!(detach(&mut v).unwrap_err(), CargoError::NotCarrying(v.id));
    }

    #[test]
    fn test_hanging_straight_down_at_rest() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Light);
        for _ in 0..120 {
            p.step(Vec2::ZERO, 0.0, 0.0, GRAVITY);
        }
        assert!(p.theta.abs() < 1e-6);
        let pos = p.cargo_position(Vec2::new(0.0, 100.0), 0.0);
        assert!((pos - Vec2::new(0.0, 55.0)).length() < 1e-4);
    }

    #[test]
    fn test_displaced_load_settles() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Heavy);
        p.theta = 0.3;
        for _ in 0..600 {
            p.step(Vec2::ZERO, 0.0, 0.0, GRAVITY);
        }
        assert!(p.theta.abs() < 0.01, "theta {}", p.theta);
    }

    #[test]
    fn test_acceleration_swings_load_backwards() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Light);
        let mut velocity = Vec2::ZERO;
        for _ in 0..300 {
            velocity.x += 0.1;
            p.step(velocity, 0.0, 0.0, GRAVITY);
        }
        // Equilibrium leans against the acceleration: atan(0.1 / g)
        let expected = f32::atan2(0.1, GRAVITY);
        assert!((p.theta - expected).abs() < 0.05, "theta {} expected {}", p.theta, expected);
        let pos = p.cargo_position(Vec2::ZERO, 0.0);
        assert!(pos.x < 0.0, "load trails behind the vehicle");
    }

    #[test]
    fn test_free_fall_has_no_restoring_torque() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Light);
        p.theta = 0.4;
        let mut velocity = Vec2::ZERO;
        p.step(velocity, 0.0, 0.0, GRAVITY);
        let theta_after_first = p.theta;
        for _ in 0..10 {
            velocity.y -= GRAVITY;
            p.step(velocity, 0.0, 0.0, GRAVITY);
        }
        // Only the leftover swing from the first tick keeps moving it
        assert!((p.theta - theta_after_first).abs() < 0.03);
    }

    #[test]
    fn test_clamp_rebounds_inelastically() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Heavy);
        p.theta = p.params.max_angle - 0.01;
        p.omega = 0.5;
        p.step(Vec2::ZERO, 0.0, 0.0, 0.0);
        assert_eq!(p.theta, p.params.max_angle);
        assert!(p.omega < 0.0);
        assert!(p.omega.abs() < 0.5 * 0.3);
    }

    #[test]
    fn test_parent_spin_drags_the_load() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Light);
        p.step(Vec2::ZERO, 0.0, ROTATION_SPEED, GRAVITY);
        assert!(p.theta < 0.0);
    }

    #[test]
    fn test_non_finite_state_is_reset() {
        let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), CargoClass::Light);
        p.omega = f32::NAN;
        p.step(Vec2::ZERO, 0.0, 0.0, GRAVITY);
        assert_eq!(p.theta, 0.0);
        assert_eq!(p.omega, 0.0);
    }

    proptest! {
        #[test]
        fn prop_swing_stays_within_limits(
            heavy in any::<bool>(),
            accels in prop::collection::vec((-2.0f32..2.0, -2.0f32..2.0, -3.2f32..3.2, -0.05f32..0.05), 1..400),
        ) {
            let class = if heavy { CargoClass::Heavy } else { CargoClass::Light };
            let mut p = CargoPendulum::new(VehicleId(1), BodyId(1), class);
            let max = p.params.max_angle;
            let mut velocity = Vec2::ZERO;
            for (ax, ay, angle, spin) in accels {
                velocity += Vec2::new(ax, ay);
                p.step(velocity, angle, spin, GRAVITY);
                prop_assert!(p.theta >= -max && p.theta <= max, "theta {} outside ±{}", p.theta, max);
            }
        }
    }
}
