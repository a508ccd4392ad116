//! Collision resolver: turns a beginning contact into an outcome.
//!
//! Dispatch goes through a table keyed by the pair of collider kinds. The
//! resolver updates the vehicle's landing bookkeeping but never destroys it;
//! the world applies the returned [`Resolution`].

use glam::Vec2;
use lander_shared::*;
use serde::{Deserialize, Serialize};

use crate::contacts::Contact;
use crate::geometry::{Boat, LandingPad, WaterRegion};
use crate::landing::{classify_landing, LandingLimits};
use crate::terrain::TerrainQuery;
use crate::vehicle::VehicleState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    Vehicle,
    Terrain,
    LandingPad,
    BoatDeck,
    BrickWall,
    Building,
    Projectile,
    Tombstone,
}

impl ColliderKind {
    pub fn category(self) -> Option<CollisionCategory> {
        match self {
            ColliderKind::Vehicle => None,
            ColliderKind::Terrain => Some(CollisionCategory::Terrain),
            ColliderKind::LandingPad => Some(CollisionCategory::LandingPad),
            ColliderKind::BoatDeck => Some(CollisionCategory::BoatDeck),
            ColliderKind::BrickWall => Some(CollisionCategory::BrickWall),
            ColliderKind::Building => Some(CollisionCategory::Building),
            ColliderKind::Projectile => Some(CollisionCategory::Projectile),
            ColliderKind::Tombstone => Some(CollisionCategory::Tombstone),
        }
    }

    /// Surfaces that hold a vehicle up while it rests against them.
    pub fn is_solid(self) -> bool {
        !matches!(self, ColliderKind::Projectile | ColliderKind::Tombstone | ColliderKind::Vehicle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Terrain,
    LandingPad,
    BoatDeck,
    BrickWall,
    Building,
    Projectile,
    Tombstone,
}

const DISPATCH: [((ColliderKind, ColliderKind), Rule); 7] = [
    ((ColliderKind::Vehicle, ColliderKind::Terrain), Rule::Terrain),
    ((ColliderKind::Vehicle, ColliderKind::LandingPad), Rule::LandingPad),
    ((ColliderKind::Vehicle, ColliderKind::BoatDeck), Rule::BoatDeck),
    ((ColliderKind::Vehicle, ColliderKind::BrickWall), Rule::BrickWall),
    ((ColliderKind::Vehicle, ColliderKind::Building), Rule::Building),
    ((ColliderKind::Vehicle, ColliderKind::Projectile), Rule::Projectile),
    ((ColliderKind::Vehicle, ColliderKind::Tombstone), Rule::Tombstone),
];

/// Look up the rule for a pair of colliders in either order.
pub fn rule_for(a: ColliderKind, b: ColliderKind) -> Option<Rule> {
    DISPATCH
        .iter()
        .find(|((x, y), _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, rule)| *rule)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Nothing happens beyond resting support.
    Ignored,
    Bounce,
    Landed {
        site: LandingSite,
        quality: LandingQuality,
    },
    Destroyed(DeathCause),
    Juggled {
        count: u32,
    },
}

/// World state the rules consult.
pub struct ResolveEnv<'a> {
    pub terrain: &'a dyn TerrainQuery,
    pub water: Option<&'a WaterRegion>,
    pub pads: &'a [LandingPad],
    pub boats: &'a [Boat],
    pub now_ms: u64,
    pub config: &'a SimConfig,
}

/// Resolve a beginning contact between a vehicle and a collider.
pub fn resolve(vehicle: &mut VehicleState, contact: &Contact, env: &ResolveEnv) -> Resolution {
    let Some(rule) = rule_for(ColliderKind::Vehicle, contact.kind) else {
        tracing::debug!(kind = ?contact.kind, "no collision rule for pair");
        return Resolution::Ignored;
    };

    let resolution = match rule {
        Rule::Terrain => terrain_rule(vehicle, env),
        Rule::LandingPad => pad_rule(vehicle, PadId(contact.subject), env),
        Rule::BoatDeck => boat_rule(vehicle, BoatId(contact.subject), env),
        Rule::BrickWall => speed_rule(vehicle, env.config.wall_crash_speed, DeathCause::Wall),
        Rule::Building => speed_rule(vehicle, env.config.building_crash_speed, DeathCause::Building),
        Rule::Projectile => Resolution::Destroyed(DeathCause::ShotDown),
        Rule::Tombstone => {
            vehicle.juggles += 1;
            Resolution::Juggled { count: vehicle.juggles }
        }
    };

    match resolution {
        Resolution::Destroyed(cause) if vehicle.is_invulnerable(env.now_ms) => {
            tracing::debug!(vehicle = %vehicle.id, %cause, "fatal contact suppressed by invulnerability");
            Resolution::Bounce
        }
        other => other,
    }
}

fn speed_rule(vehicle: &VehicleState, crash_speed: f32, cause: DeathCause) -> Resolution {
    if vehicle.speed() > crash_speed {
        Resolution::Destroyed(cause)
    } else {
        Resolution::Bounce
    }
}

fn terrain_rule(vehicle: &VehicleState, env: &ResolveEnv) -> Resolution {
    let x = vehicle.position.x;
    let lower = vehicle.lower_edge();

    if let Some(water) = env.water {
        let touching_water = water.covers(x) && lower - water.surface_y <= TERRAIN_CONTACT_TOLERANCE;
        if touching_water {
            if near_water_refuge(vehicle, water, env) {
                return speed_rule(vehicle, env.config.terrain_crash_speed, DeathCause::Ground);
            }
            return Resolution::Destroyed(DeathCause::Water);
        }
    }

    if lower - env.terrain.height_at(x) > TERRAIN_CONTACT_TOLERANCE {
        return Resolution::Ignored;
    }
    speed_rule(vehicle, env.config.terrain_crash_speed, DeathCause::Ground)
}

/// Water contact is survivable next to pads, boat decks and the shoreline.
fn near_water_refuge(vehicle: &VehicleState, water: &WaterRegion, env: &ResolveEnv) -> bool {
    let x = vehicle.position.x;
    let lower = vehicle.lower_edge();
    let near_pad = env
        .pads
        .iter()
        .any(|p| (x - p.x).abs() <= p.half_width() + WATER_PAD_TOLERANCE);
    let near_boat = env.boats.iter().any(|b| {
        (x - b.x).abs() <= b.half_width + WATER_BOAT_TOLERANCE_X && (lower - b.deck_y).abs() <= WATER_BOAT_TOLERANCE_Y
    });
    near_pad || near_boat || water.edge_distance(x) <= WATER_WALL_TOLERANCE
}

fn debounced(last_ms: Option<u64>, now_ms: u64, window_ms: u64) -> bool {
    last_ms.is_some_and(|t| now_ms.saturating_sub(t) < window_ms)
}

fn pad_rule(vehicle: &mut VehicleState, pad_id: PadId, env: &ResolveEnv) -> Resolution {
    let Some(pad) = env.pads.iter().find(|p| p.id == pad_id) else {
        tracing::warn!(pad = pad_id.0, "contact with unknown pad");
        return Resolution::Ignored;
    };
    let memory = &vehicle.landing;
    if memory.spawn_pad == Some(pad.id) && !memory.armed {
        return Resolution::Ignored;
    }
    if debounced(memory.last_pad_landing_ms, env.now_ms, env.config.landing_debounce_ms) {
        tracing::debug!(vehicle = %vehicle.id, pad = pad.id.0, "pad landing debounced");
        return Resolution::Ignored;
    }
    if memory.last_pad == Some(pad.id) {
        return Resolution::Ignored;
    }
    if !touchdown_window(vehicle, pad.x, pad.half_width(), pad.surface_y) {
        return Resolution::Bounce;
    }

    let limits = LandingLimits::from_config(env.config);
    let outcome = classify_landing(vehicle.speed(), vehicle.angle, vehicle.gear_extended, &limits);
    match outcome.quality() {
        Some(quality) => {
            vehicle.landing.last_pad_landing_ms = Some(env.now_ms);
            vehicle.landing.last_pad = Some(pad.id);
            Resolution::Landed {
                site: LandingSite::Pad(pad.id),
                quality,
            }
        }
        None => crash_of(outcome),
    }
}

fn boat_rule(vehicle: &mut VehicleState, boat_id: BoatId, env: &ResolveEnv) -> Resolution {
    let Some(boat) = env.boats.iter().find(|b| b.id == boat_id) else {
        tracing::warn!(boat = boat_id.0, "contact with unknown boat");
        return Resolution::Ignored;
    };
    let memory = &vehicle.landing;
    if debounced(memory.last_boat_landing_ms, env.now_ms, env.config.landing_debounce_ms) {
        tracing::debug!(vehicle = %vehicle.id, boat = boat.id.0, "deck landing debounced");
        return Resolution::Ignored;
    }
    if memory.last_boat == Some(boat.id) || memory.docked == Some(boat.id) {
        return Resolution::Ignored;
    }
    if !touchdown_window(vehicle, boat.x, boat.half_width, boat.deck_y) {
        return Resolution::Bounce;
    }

    let limits = LandingLimits::from_config(env.config);
    let outcome = classify_landing(vehicle.speed(), vehicle.angle, vehicle.gear_extended, &limits);
    match outcome.quality() {
        Some(quality) => {
            vehicle.landing.last_boat_landing_ms = Some(env.now_ms);
            vehicle.landing.last_boat = Some(boat.id);
            vehicle.landing.docked = Some(boat.id);
            Resolution::Landed {
                site: LandingSite::Boat(boat.id),
                quality,
            }
        }
        None => crash_of(outcome),
    }
}

fn crash_of(outcome: LandingOutcome) -> Resolution {
    match outcome {
        LandingOutcome::Crash(cause) => Resolution::Destroyed(cause),
        _ => Resolution::Bounce,
    }
}

/// Centered over the surface and with the hull bottom near it. The lower
/// bound stretches by this tick's descent so a fast arrival from above still
/// counts as a touchdown rather than a side hit.
fn touchdown_window(vehicle: &VehicleState, center_x: f32, half_width: f32, surface_y: f32) -> bool {
    let dx = vehicle.position.x - center_x;
    let dy = vehicle.lower_edge() - surface_y;
    let descent = (-vehicle.velocity.y).max(0.0);
    dx.abs() <= half_width && (PAD_SURFACE_BELOW - descent..=PAD_SURFACE_ABOVE).contains(&dy)
}

/// Forget the last pad or boat once the vehicle has clearly left it, so a
/// later touchdown counts again.
pub fn release_landing_sites(vehicle: &mut VehicleState, pads: &[LandingPad], boats: &[Boat]) {
    let lower = vehicle.lower_edge();
    let x = vehicle.position.x;
    let left = |cx: f32, half: f32, surface: f32| {
        (x - cx).abs() > half + PAD_EXIT_MARGIN_X || lower - surface > PAD_EXIT_MARGIN_Y
    };

    if let Some(id) = vehicle.landing.last_pad {
        let gone = pads
            .iter()
            .find(|p| p.id == id)
            .map_or(true, |p| left(p.x, p.half_width(), p.surface_y));
        if gone {
            vehicle.landing.last_pad = None;
        }
    }
    if let Some(id) = vehicle.landing.last_boat {
        let gone = boats
            .iter()
            .find(|b| b.id == id)
            .map_or(true, |b| left(b.x, b.half_width, b.deck_y));
        if gone {
            vehicle.landing.last_boat = None;
        }
    }
}

/// Push the hull out of a solid surface and adjust its velocity according
/// to how the contact was resolved.
pub fn respond(vehicle: &mut VehicleState, contact: &Contact, resolution: &Resolution) {
    if !contact.kind.is_solid() {
        return;
    }
    vehicle.position += contact.normal * contact.depth;

    let normal_speed = vehicle.velocity.dot(contact.normal);
    match resolution {
        Resolution::Landed { .. } => {
            vehicle.velocity = Vec2::ZERO;
            vehicle.angular_velocity = 0.0;
        }
        Resolution::Bounce if normal_speed < 0.0 => {
            vehicle.velocity -= contact.normal * normal_speed * (1.0 + BOUNCE_RESTITUTION);
            if vehicle.velocity.length() < REST_SPEED * BOUNCE_RESTITUTION {
                vehicle.velocity = Vec2::ZERO;
            }
        }
        Resolution::Ignored if normal_speed < 0.0 => {
            support(vehicle, contact.normal, normal_speed);
        }
        _ => {}
    }
}

/// Resting contact: cancel the motion into the surface and drag along it.
pub fn support(vehicle: &mut VehicleState, normal: Vec2, normal_speed: f32) {
    vehicle.velocity -= normal * normal_speed;
    let tangent = normal.perp();
    let along = vehicle.velocity.dot(tangent);
    vehicle.velocity -= tangent * along * 0.2;
    if vehicle.velocity.length() < STRANDED_SPEED {
        vehicle.velocity = Vec2::ZERO;
    }
}
