use glam::Vec2;
use lander_shared::*;

use crate::geometry::WaterRegion;
use crate::terrain::TerrainQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Prop,
    Marker,
    Debris,
    Tombstone,
    Cargo(CargoClass),
}

impl BodyKind {
    /// Decorative props, markers and debris are kicked harder by blasts.
    pub fn is_light(self) -> bool {
        matches!(self, BodyKind::Prop | BodyKind::Marker | BodyKind::Debris)
    }

    pub fn mass(self) -> f32 {
        match self {
            BodyKind::Prop => 1.0,
            BodyKind::Marker | BodyKind::Debris => 0.5,
            BodyKind::Tombstone => 3.0,
            BodyKind::Cargo(CargoClass::Light) => 3.0,
            BodyKind::Cargo(CargoClass::Heavy) => 5.0,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            BodyKind::Prop => 6.0,
            BodyKind::Marker | BodyKind::Debris => 4.0,
            BodyKind::Tombstone => 10.0,
            BodyKind::Cargo(_) => CARGO_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub mass: f32,
    pub radius: f32,
}

impl Body {
    pub fn new(id: BodyId, kind: BodyKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            mass: kind.mass(),
            radius: kind.radius(),
        }
    }

    fn step(&mut self, terrain: &dyn TerrainQuery, wind: f32, config: &SimConfig) {
        self.velocity.y -= config.gravity;
        self.velocity.x += wind.clamp(-1.0, 1.0) * config.wind_force / self.mass;
        self.velocity *= 1.0 - config.air_friction;
        self.position += self.velocity;
        self.angle += self.angular_velocity;
        self.angular_velocity *= 0.98;

        let ground = terrain.height_at(self.position.x);
        if self.position.y - self.radius < ground {
            self.position.y = ground + self.radius;
            if self.velocity.y < 0.0 {
                self.velocity.y = -self.velocity.y * BOUNCE_RESTITUTION;
            }
            self.velocity.x *= 0.8;
            self.angular_velocity *= 0.8;
        }
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            angle: self.angle,
        }
    }
}

/// Registry of loose dynamic bodies in insertion order.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
    next_id: u32,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, kind: BodyKind, position: Vec2, velocity: Vec2) -> BodyId {
        let id = self.allocate_id();
        let mut body = Body::new(id, kind, position);
        body.velocity = velocity;
        self.bodies.push(body);
        id
    }

    /// Put a previously removed body back under its original id.
    pub fn reinsert(&mut self, body: Body) {
        self.next_id = self.next_id.max(body.id.0 + 1);
        self.bodies.push(body);
    }

    pub fn allocate_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.bodies.iter().position(|b| b.id == id)?;
        Some(self.bodies.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Integrate every body; bodies that end up under water sink and are
    /// returned to the caller.
    pub fn step(
        &mut self,
        terrain: &dyn TerrainQuery,
        water: Option<&WaterRegion>,
        wind: f32,
        config: &SimConfig,
    ) -> Vec<Body> {
        for body in &mut self.bodies {
            body.step(terrain, wind, config);
        }
        let Some(water) = water else {
            return Vec::new();
        };
        let (sunk, kept): (Vec<Body>, Vec<Body>) = std::mem::take(&mut self.bodies)
            .into_iter()
            .partition(|b| water.is_submerged(b.position));
        self.bodies = kept;
        sunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;

    #[test]
    fn test_body_falls_and_rests_on_ground() {
        let mut reg = BodyRegistry::new();
        let id = reg.spawn(BodyKind::Tombstone, Vec2::new(0.0, 100.0), Vec2::ZERO);
        let config = SimConfig::default();
        for _ in 0..600 {
            reg.step(&FlatTerrain(0.0), None, 0.0, &config);
        }
        let body = reg.get(id).expect("tombstone should still exist");
        assert!(body.position.y >= body.radius - 1e-3);
        assert!(body.position.y < body.radius + 1.0);
    }

    #[test]
    fn test_bodies_sink_in_water() {
        let mut reg = BodyRegistry::new();
        let wet = reg.spawn(BodyKind::Prop, Vec2::new(50.0, 8.0), Vec2::ZERO);
        let dry = reg.spawn(BodyKind::Prop, Vec2::new(500.0, 8.0), Vec2::ZERO);
        let water = WaterRegion {
            min_x: 0.0,
            max_x: 100.0,
            surface_y: 20.0,
        };
        let sunk = reg.step(&FlatTerrain(0.0), Some(&water), 0.0, &SimConfig::default());
        assert_eq!(sunk.len(), 1);
        assert_eq!(sunk[0].id, wet);
        assert!(reg.get(dry).is_some());
        assert!(reg.get(wet).is_none());
    }

    #[test]
    fn test_ids_are_unique_after_reinsert() {
        let mut reg = BodyRegistry::new();
        let a = reg.spawn(BodyKind::Marker, Vec2::ZERO, Vec2::ZERO);
        let body = reg.remove(a).expect("just spawned");
        reg.reinsert(body);
        let b = reg.spawn(BodyKind::Marker, Vec2::ZERO, Vec2::ZERO);
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_light_kinds() {
        assert!(BodyKind::Prop.is_light());
        assert!(BodyKind::Debris.is_light());
        assert!(!BodyKind::Tombstone.is_light());
        assert!(!BodyKind::Cargo(CargoClass::Light).is_light());
    }
}
