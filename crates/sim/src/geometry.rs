//! Static and kinematic world fixtures the vehicle can touch.

use glam::Vec2;
use lander_shared::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingPad {
    pub id: PadId,
    /// Center of the pad surface.
    pub x: f32,
    pub surface_y: f32,
    pub width: f32,
}

impl LandingPad {
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Top surface rectangle as (min, max).
    pub fn rect(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.x - self.half_width(), self.surface_y - PAD_THICKNESS),
            Vec2::new(self.x + self.half_width(), self.surface_y),
        )
    }
}

/// A boat patrolling back and forth; its deck is a moving landing platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boat {
    pub id: BoatId,
    pub x: f32,
    pub deck_y: f32,
    pub half_width: f32,
    /// Horizontal speed in units/tick; the sign is the current heading.
    pub speed: f32,
    pub patrol_min_x: f32,
    pub patrol_max_x: f32,
}

impl Boat {
    /// Move along the patrol route; returns the displacement applied.
    pub fn advance(&mut self) -> f32 {
        let before = self.x;
        self.x += self.speed;
        if self.x > self.patrol_max_x {
            self.x = self.patrol_max_x;
            self.speed = -self.speed.abs();
        } else if self.x < self.patrol_min_x {
            self.x = self.patrol_min_x;
            self.speed = self.speed.abs();
        }
        self.x - before
    }

    pub fn rect(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.x - self.half_width, self.deck_y - BOAT_HULL_DEPTH),
            Vec2::new(self.x + self.half_width, self.deck_y),
        )
    }
}

/// World and water boundary wall, extending down from `top_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickWall {
    pub id: WallId,
    pub x: f32,
    pub half_width: f32,
    pub top_y: f32,
}

impl BrickWall {
    pub fn rect(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.x - self.half_width, f32::MIN),
            Vec2::new(self.x + self.half_width, self.top_y),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub x: f32,
    pub width: f32,
    pub base_y: f32,
    pub height: f32,
}

impl Building {
    pub fn rect(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.x - self.width * 0.5, self.base_y),
            Vec2::new(self.x + self.width * 0.5, self.base_y + self.height),
        )
    }
}

/// Horizontal span covered by water up to `surface_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterRegion {
    pub min_x: f32,
    pub max_x: f32,
    pub surface_y: f32,
}

impl WaterRegion {
    pub fn covers(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn is_submerged(&self, p: Vec2) -> bool {
        self.covers(p.x) && p.y < self.surface_y
    }

    /// Distance to the nearer shore edge.
    pub fn edge_distance(&self, x: f32) -> f32 {
        (x - self.min_x).abs().min((self.max_x - x).abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub ticks_remaining: u32,
}

impl Projectile {
    pub fn step(&mut self) {
        self.position += self.velocity;
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
    }
}

/// Ground surface including water: the higher of terrain and water level.
pub fn surface_at(terrain_height: f32, water: Option<&WaterRegion>, x: f32) -> f32 {
    match water {
        Some(w) if w.covers(x) => terrain_height.max(w.surface_y),
        _ => terrain_height,
    }
}
