use glam::Vec2;
use lander_shared::*;

use crate::cargo::CargoPendulum;

/// Fuel tank. The level never leaves `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fuel {
    level: f32,
    max: f32,
}

impl Fuel {
    pub fn full(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { level: max, max }
    }

    pub fn with_level(level: f32, max: f32) -> Self {
        let mut fuel = Self::full(max);
        fuel.set(level);
        fuel
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0.0
    }

    /// Burn up to `amount`; returns what was actually burned.
    pub fn consume(&mut self, amount: f32) -> f32 {
        let before = self.level;
        self.set(self.level - amount.max(0.0));
        before - self.level
    }

    pub fn refill(&mut self, amount: f32) {
        self.set(self.level + amount.max(0.0));
    }

    fn set(&mut self, level: f32) {
        self.level = if level.is_finite() {
            level.clamp(0.0, self.max)
        } else {
            0.0
        };
    }
}

/// Discrete vehicle mass classes; the mass follows the attached cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleMass {
    Baseline,
    LightCargo,
    HeavyCargo,
}

impl VehicleMass {
    pub fn for_cargo(cargo: Option<CargoClass>) -> Self {
        match cargo {
            None => VehicleMass::Baseline,
            Some(CargoClass::Light) => VehicleMass::LightCargo,
            Some(CargoClass::Heavy) => VehicleMass::HeavyCargo,
        }
    }

    pub fn value(self) -> f32 {
        match self {
            VehicleMass::Baseline => BASE_MASS,
            VehicleMass::LightCargo => LIGHT_CARGO_MASS,
            VehicleMass::HeavyCargo => HEAVY_CARGO_MASS,
        }
    }
}

/// Debounce bookkeeping consulted by the collision resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandingMemory {
    pub last_pad_landing_ms: Option<u64>,
    /// Pad the vehicle last landed on; cleared once it leaves the pad bounds.
    pub last_pad: Option<PadId>,
    pub last_boat_landing_ms: Option<u64>,
    pub last_boat: Option<BoatId>,
    /// Pad the vehicle was spawned on, ignored until `armed`.
    pub spawn_pad: Option<PadId>,
    /// Set once the vehicle has moved faster than the spawn-pad arm speed.
    pub armed: bool,
    pub docked: Option<BoatId>,
}

/// Work done by one dynamics tick that the world has to follow up on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutput {
    pub fuel_burned: f32,
    pub gear_toggled: bool,
    pub drop_requested: bool,
}

#[derive(Debug, Clone)]
pub struct VehicleState {
    pub id: VehicleId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Orientation in radians, 0 = nose up, positive = tilted clockwise.
    pub angle: f32,
    pub angular_velocity: f32,
    pub fuel: Fuel,
    pub gear_extended: bool,
    pub thrust_multiplier: f32,
    pub thrusting: bool,
    pub invulnerable_until_ms: u64,
    pub debug_invulnerable: bool,
    pub alive: bool,
    pub tow: Option<CargoPendulum>,
    pub landing: LandingMemory,
    pub juggles: u32,
    pub stranded_ms: u64,
    pub stranded_reported: bool,
    prev_controls: ControlState,
}

impl VehicleState {
    pub fn new(id: VehicleId, position: Vec2, config: &SimConfig, now_ms: u64) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            fuel: Fuel::full(config.max_fuel),
            gear_extended: true,
            thrust_multiplier: 1.0,
            thrusting: false,
            invulnerable_until_ms: now_ms + config.spawn_invulnerability_ms,
            debug_invulnerable: false,
            alive: true,
            tow: None,
            landing: LandingMemory::default(),
            juggles: 0,
            stranded_ms: 0,
            stranded_reported: false,
            prev_controls: ControlState::none(),
        }
    }

    pub fn cargo_class(&self) -> Option<CargoClass> {
        self.tow.as_ref().map(|t| t.class)
    }

    pub fn mass(&self) -> f32 {
        VehicleMass::for_cargo(self.cargo_class()).value()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Unit vector the engine pushes along.
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.angle.sin(), self.angle.cos())
    }

    pub fn wrapped_angle(&self) -> f32 {
        normalize_angle(self.angle)
    }

    pub fn is_invulnerable(&self, now_ms: u64) -> bool {
        self.debug_invulnerable || now_ms < self.invulnerable_until_ms
    }

    /// Corners of the rotated hull box.
    pub fn corners(&self) -> [Vec2; 4] {
        let rot = Vec2::from_angle(-self.angle);
        let (hw, hh) = (VEHICLE_HALF_WIDTH, VEHICLE_HALF_HEIGHT);
        [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]
        .map(|c| self.position + rot.rotate(c))
    }

    /// Axis-aligned bounds of the hull as (min, max).
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        (min, max)
    }

    pub fn lower_edge(&self) -> f32 {
        self.bounds().0.y
    }

    /// Attachment point of the tow wire.
    pub fn hook(&self) -> Vec2 {
        self.position - self.forward() * VEHICLE_HALF_HEIGHT
    }

    /// Advance one tick of flight dynamics.
    pub fn step(&mut self, controls: &ControlState, wind: f32, config: &SimConfig) -> StepOutput {
        let mut out = StepOutput::default();
        let prev = self.prev_controls;
        self.prev_controls = *controls;

        // Rotation: held input sets the rate, released input lets it decay
        match (controls.rotate_left, controls.rotate_right) {
            (true, false) => self.angular_velocity = -config.rotation_speed,
            (false, true) => self.angular_velocity = config.rotation_speed,
            _ => self.angular_velocity *= config.angular_damping,
        }

        // Gear toggles on the down-transition only
        if controls.gear_toggle && !prev.gear_toggle {
            self.gear_extended = !self.gear_extended;
            out.gear_toggled = true;
        }
        out.drop_requested = controls.drop_cargo && !prev.drop_cargo;

        let mass = self.mass();

        // Thrust
        self.thrusting = controls.thrust && !self.fuel.is_empty();
        if self.thrusting {
            let burn = if self.gear_extended {
                config.fuel_burn_rate * GEAR_FUEL_FACTOR
            } else {
                config.fuel_burn_rate
            };
            out.fuel_burned = self.fuel.consume(burn);

            let profile = if self.gear_extended { GEAR_THRUST_FACTOR } else { 1.0 };
            let force = config.thrust_force * profile * self.thrust_multiplier.max(0.0);
            self.velocity += self.forward() * (force / mass);
        }

        // Gravity, wind and air friction
        self.velocity.y -= config.gravity;
        let wind = if wind.is_finite() { wind.clamp(-1.0, 1.0) } else { 0.0 };
        self.velocity.x += wind * config.wind_force / mass;
        self.velocity *= 1.0 - config.air_friction;

        // Extended gear adds drag
        if self.gear_extended {
            self.velocity.x *= GEAR_DRAG_X;
            self.velocity.y *= GEAR_DRAG_Y;
        }

        self.position += self.velocity;
        self.angle += self.angular_velocity;

        if !self.landing.armed && self.speed() > SPAWN_PAD_ARM_SPEED {
            self.landing.armed = true;
        }
        if self.landing.docked.is_some() && self.speed() > UNDOCK_SPEED {
            self.landing.docked = None;
        }

        out
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            vx: self.velocity.x,
            vy: self.velocity.y,
            angle: self.angle,
            fuel: self.fuel.level(),
            gear_extended: self.gear_extended,
            cargo: self.cargo_class(),
            cargo_angle: self.tow.as_ref().map(|t| t.theta),
            alive: self.alive,
        }
    }
}

/// Normalize angle to [-PI, PI].
pub fn normalize_angle(a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !a.is_finite() {
        return a;
    }
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    // rem_euclid can land exactly on TAU through rounding
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
