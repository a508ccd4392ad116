use glam::Vec2;
use lander_shared::*;
use rand::Rng;

use crate::bodies::Body;
use crate::vehicle::VehicleState;

/// Anything a blast can shove.
pub trait ImpulseTarget {
    fn position(&self) -> Vec2;
    fn mass(&self) -> f32;
    /// Light debris gets kicked harder and higher.
    fn is_light(&self) -> bool;
    fn apply_impulse(&mut self, impulse: Vec2, angular: f32);
}

impl ImpulseTarget for Body {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn is_light(&self) -> bool {
        self.kind.is_light()
    }

    fn apply_impulse(&mut self, impulse: Vec2, angular: f32) {
        self.velocity += impulse / self.mass.max(f32::EPSILON);
        self.angular_velocity += angular;
    }
}

impl ImpulseTarget for VehicleState {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn mass(&self) -> f32 {
        VehicleState::mass(self)
    }

    fn is_light(&self) -> bool {
        false
    }

    fn apply_impulse(&mut self, impulse: Vec2, angular: f32) {
        self.velocity += impulse / VehicleState::mass(self);
        self.angular_velocity += angular;
    }
}

/// Quadratic falloff: 1 at the origin, 0 at and beyond the radius.
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius.is_nan() || distance.is_nan() || radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    let t = 1.0 - distance.max(0.0) / radius;
    t * t
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub origin: Vec2,
    pub radius: f32,
    pub force: f32,
}

impl Blast {
    pub fn new(origin: Vec2, config: &ExplosionConfig) -> Self {
        Self {
            origin,
            radius: config.radius,
            force: config.force,
        }
    }

    /// Radial impulse magnitude at a distance from the origin.
    pub fn magnitude_at(&self, distance: f32) -> f32 {
        self.force * falloff(distance, self.radius)
    }

    /// Linear impulse for a target, before the random tumble. `None` outside
    /// the blast radius.
    pub fn impulse_on(&self, position: Vec2, light: bool, config: &ExplosionConfig) -> Option<Vec2> {
        let offset = position - self.origin;
        let distance = offset.length();
        let mut magnitude = self.magnitude_at(distance);
        if magnitude <= 0.0 {
            return None;
        }
        let bias = if light {
            magnitude *= config.light_multiplier;
            config.light_upward_bias
        } else {
            config.upward_bias
        };
        // A target sitting on the origin goes straight up
        let direction = offset.try_normalize().unwrap_or(Vec2::Y);
        Some(direction * magnitude + Vec2::Y * magnitude * bias)
    }
}

/// Push every target inside the blast radius. Returns how many were hit.
pub fn apply_explosion<'a, R: Rng>(
    blast: &Blast,
    targets: impl IntoIterator<Item = &'a mut dyn ImpulseTarget>,
    config: &ExplosionConfig,
    rng: &mut R,
) -> usize {
    let mut hit = 0;
    for target in targets {
        let Some(impulse) = blast.impulse_on(target.position(), target.is_light(), config) else {
            continue;
        };
        let strength = falloff(target.position().distance(blast.origin), blast.radius);
        let angular = rng.gen_range(-1.0f32..1.0) * config.tumble * strength;
        target.apply_impulse(impulse, angular);
        hit += 1;
    }
    hit
}
