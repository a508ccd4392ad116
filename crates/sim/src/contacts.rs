//! Narrow phase: which world colliders the vehicle hull touches this tick.

use glam::Vec2;
use lander_shared::*;

use crate::bodies::{BodyKind, BodyRegistry};
use crate::collision::ColliderKind;
use crate::geometry::*;
use crate::terrain::TerrainQuery;
use crate::vehicle::VehicleState;

/// One vehicle touching one collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub vehicle: VehicleId,
    pub kind: ColliderKind,
    /// Raw id of the touched entity; 0 for terrain.
    pub subject: u32,
    /// Unit normal pointing from the collider toward the vehicle.
    pub normal: Vec2,
    /// How far the hull overlaps the collider along `normal`.
    pub depth: f32,
}

impl Contact {
    /// Identity of the touching pair across ticks.
    pub fn pair(&self) -> (VehicleId, ColliderKind, u32) {
        (self.vehicle, self.kind, self.subject)
    }
}

/// Everything the hull can touch.
pub struct Scene<'a> {
    pub terrain: &'a dyn TerrainQuery,
    pub water: Option<&'a WaterRegion>,
    pub pads: &'a [LandingPad],
    pub boats: &'a [Boat],
    pub walls: &'a [BrickWall],
    pub buildings: &'a [Building],
    pub projectiles: &'a [Projectile],
    pub bodies: &'a BodyRegistry,
}

pub fn find_contacts(vehicle: &VehicleState, scene: &Scene) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let (min, max) = vehicle.bounds();

    if let Some(depth) = ground_penetration(vehicle, scene) {
        contacts.push(Contact {
            vehicle: vehicle.id,
            kind: ColliderKind::Terrain,
            subject: 0,
            normal: Vec2::Y,
            depth,
        });
    }

    let rects = scene
        .pads
        .iter()
        .map(|p| (ColliderKind::LandingPad, p.id.0, p.rect()))
        .chain(scene.boats.iter().map(|b| (ColliderKind::BoatDeck, b.id.0, b.rect())))
        .chain(scene.walls.iter().map(|w| (ColliderKind::BrickWall, w.id.0, w.rect())))
        .chain(scene.buildings.iter().map(|b| (ColliderKind::Building, b.id.0, b.rect())));
    for (kind, subject, rect) in rects {
        if let Some((normal, depth)) = box_overlap((min, max), rect) {
            contacts.push(Contact {
                vehicle: vehicle.id,
                kind,
                subject,
                normal,
                depth,
            });
        }
    }

    for p in scene.projectiles {
        if let Some((normal, depth)) = hull_circle(vehicle, p.position, p.radius) {
            contacts.push(Contact {
                vehicle: vehicle.id,
                kind: ColliderKind::Projectile,
                subject: p.id.0,
                normal,
                depth,
            });
        }
    }

    for body in scene.bodies.iter().filter(|b| b.kind == BodyKind::Tombstone) {
        if let Some((normal, depth)) = hull_circle(vehicle, body.position, body.radius) {
            contacts.push(Contact {
                vehicle: vehicle.id,
                kind: ColliderKind::Tombstone,
                subject: body.id.0,
                normal,
                depth,
            });
        }
    }

    contacts
}

/// Deepest hull corner below the ground or water surface, if any.
fn ground_penetration(vehicle: &VehicleState, scene: &Scene) -> Option<f32> {
    vehicle
        .corners()
        .iter()
        .map(|c| surface_at(scene.terrain.height_at(c.x), scene.water, c.x) - c.y)
        .filter(|d| *d >= -CONTACT_SLOP)
        .max_by(f32::total_cmp)
        .map(|d| d.max(0.0))
}

/// Overlap of two axis-aligned boxes, resolved along the shallower axis.
fn box_overlap(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> Option<(Vec2, f32)> {
    let overlap = a.1.min(b.1) - a.0.max(b.0);
    if overlap.x < -CONTACT_SLOP || overlap.y < -CONTACT_SLOP {
        return None;
    }
    let a_center = (a.0 + a.1) * 0.5;
    let b_center = (a.0.max(b.0) + a.1.min(b.1)) * 0.5;
    if overlap.y <= overlap.x {
        let sign = if a_center.y >= b_center.y { 1.0 } else { -1.0 };
        Some((Vec2::new(0.0, sign), overlap.y.max(0.0)))
    } else {
        let sign = if a_center.x >= b_center.x { 1.0 } else { -1.0 };
        Some((Vec2::new(sign, 0.0), overlap.x.max(0.0)))
    }
}

/// Rotated hull against a circle.
fn hull_circle(vehicle: &VehicleState, center: Vec2, radius: f32) -> Option<(Vec2, f32)> {
    let half = Vec2::new(VEHICLE_HALF_WIDTH, VEHICLE_HALF_HEIGHT);
    let to_local = Vec2::from_angle(vehicle.angle);
    let to_world = Vec2::from_angle(-vehicle.angle);

    let local = to_local.rotate(center - vehicle.position);
    let closest = local.clamp(-half, half);
    let gap = local - closest;
    let distance = gap.length();
    if distance > radius + CONTACT_SLOP {
        return None;
    }
    let normal = (-to_world.rotate(gap))
        .try_normalize()
        .or_else(|| (vehicle.position - center).try_normalize())
        .unwrap_or(Vec2::Y);
    Some((normal, (radius - distance).max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;

    fn scene<'a>(terrain: &'a FlatTerrain, pads: &'a [LandingPad], bodies: &'a BodyRegistry) -> Scene<'a> {
        Scene {
            terrain,
            water: None,
            pads,
            boats: &[],
            walls: &[],
            buildings: &[],
            projectiles: &[],
            bodies,
        }
    }

    fn vehicle_at(x: f32, y: f32) -> VehicleState {
        VehicleState::new(VehicleId(1), Vec2::new(x, y), &SimConfig::default(), 0)
    }

    #[test]
    fn test_terrain_contact_when_hull_touches_ground() {
        let ground = FlatTerrain(0.0);
        let bodies = BodyRegistry::new();
        let s = scene(&ground, &[], &bodies);

        assert!(find_contacts(&vehicle_at(0.0, 100.0), &s).is_empty());

        let contacts = find_contacts(&vehicle_at(0.0, VEHICLE_HALF_HEIGHT - 2.0), &s);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].kind, ColliderKind::Terrain);
        assert!((contacts[0].depth - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_pad_contact_normal_points_up() {
        let ground = FlatTerrain(-100.0);
        let bodies = BodyRegistry::new();
        let pads = [LandingPad {
            id: PadId(3),
            x: 0.0,
            surface_y: 0.0,
            width: 80.0,
        }];
        let s = scene(&ground, &pads, &bodies);
        let contacts = find_contacts(&vehicle_at(5.0, VEHICLE_HALF_HEIGHT - 1.0), &s);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].kind, ColliderKind::LandingPad);
        assert_eq!(contacts[0].subject, 3);
        assert_eq!(contacts[0].normal, Vec2::Y);
    }

    #[test]
    fn test_wall_contact_from_the_side() {
        let ground = FlatTerrain(-1000.0);
        let bodies = BodyRegistry::new();
        let walls = [BrickWall {
            id: WallId(1),
            x: 100.0,
            half_width: 10.0,
            top_y: 500.0,
        }];
        let s = Scene {
            walls: &walls,
            ..scene(&ground, &[], &bodies)
        };
        let contacts = find_contacts(&vehicle_at(100.0 - 10.0 - VEHICLE_HALF_WIDTH + 1.0, 200.0), &s);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].normal, Vec2::NEG_X);
    }

    #[test]
    fn test_tombstone_circle_against_rotated_hull() {
        let ground = FlatTerrain(-1000.0);
        let mut bodies = BodyRegistry::new();
        bodies.spawn(BodyKind::Tombstone, Vec2::new(0.0, 0.0), Vec2::ZERO);
        let s = scene(&ground, &[], &bodies);

        let mut v = vehicle_at(VEHICLE_HALF_WIDTH + 5.0, 0.0);
        assert_eq!(find_contacts(&v, &s).len(), 1, "upright hull reaches the stone");

        // Turned on its side the hull is narrower horizontally
        v.angle = std::f32::consts::FRAC_PI_2;
        v.position.x = VEHICLE_HALF_HEIGHT + 12.0;
        assert!(find_contacts(&v, &s).is_empty());
    }
}
