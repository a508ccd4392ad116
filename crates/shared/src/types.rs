use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SimConfig;
use crate::events::TimedEvent;
use crate::ids::*;

/// Per-vehicle control state sampled once per tick.
///
/// `gear_toggle` and `drop_cargo` are levels; the dynamics react only to
/// their down-transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlState {
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub gear_toggle: bool,
    pub drop_cargo: bool,
}

impl ControlState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn thrust() -> Self {
        Self {
            thrust: true,
            ..Self::default()
        }
    }
}

/// Non-crash landing tiers produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandingQuality {
    Perfect,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingOutcome {
    Perfect,
    Good,
    Crash(DeathCause),
}

impl LandingOutcome {
    pub fn quality(&self) -> Option<LandingQuality> {
        match self {
            LandingOutcome::Perfect => Some(LandingQuality::Perfect),
            LandingOutcome::Good => Some(LandingQuality::Good),
            LandingOutcome::Crash(_) => None,
        }
    }

    /// Narrative crash reason, if this outcome is a crash.
    pub fn reason(&self) -> Option<String> {
        match self {
            LandingOutcome::Crash(cause) => Some(cause.to_string()),
            _ => None,
        }
    }
}

/// Why a vehicle was lost. `Display` yields the narrative string shown to the
/// player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    GearNotDeployed,
    BadAngle,
    TooFast,
    Ground,
    Water,
    Wall,
    Building,
    ShotDown,
    Lightning,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DeathCause::GearNotDeployed => "Landing gear not deployed!",
            DeathCause::BadAngle => "Bad angle!",
            DeathCause::TooFast => "Too fast!",
            DeathCause::Ground => "Crashed into the ground!",
            DeathCause::Water => "Crashed into the water!",
            DeathCause::Wall => "Crashed into a wall!",
            DeathCause::Building => "Crashed into a building!",
            DeathCause::ShotDown => "Shot down!",
            DeathCause::Lightning => "Struck by lightning!",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandingSite {
    Pad(PadId),
    Boat(BoatId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCategory {
    Terrain,
    LandingPad,
    Projectile,
    Building,
    BoatDeck,
    BrickWall,
    Tombstone,
}

/// A resolved contact between a vehicle and a world hazard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub category: CollisionCategory,
    pub vehicle: VehicleId,
    /// Raw id of the touched entity (pad, boat, wall, ...); 0 for terrain.
    pub subject: u32,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CargoClass {
    Light,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetachReason {
    Dropped,
    Delivered,
    Sunk,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Stormy,
}

/// Visible region supplied by the renderer; used to cull lightning scans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min: Vec2,
    pub max: Vec2,
}

impl Viewport {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// A region large enough to contain any world position.
    pub fn unbounded() -> Self {
        Self {
            min: Vec2::splat(f32::MIN),
            max: Vec2::splat(f32::MAX),
        }
    }

    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= self.min.x - margin
            && p.x <= self.max.x + margin
            && p.y >= self.min.y - margin
            && p.y <= self.max.y + margin
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::unbounded()
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub angle: f32,
    pub fuel: f32,
    pub gear_extended: bool,
    pub cargo: Option<CargoClass>,
    pub cargo_angle: Option<f32>,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CloudSnapshot {
    pub id: CloudId,
    pub x: f32,
    pub y: f32,
    pub charging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u32,
    pub vehicles: Vec<VehicleSnapshot>,
    pub bodies: Vec<BodySnapshot>,
    pub clouds: Vec<CloudSnapshot>,
}

// ---------------------------------------------------------------------------
// Flight log
// ---------------------------------------------------------------------------

/// Prebuilt worlds for headless flights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Rolling hills with two pads and a tombstone.
    #[default]
    Meadow,
    /// Sea between two walls, a patrol boat and a shore pad.
    Harbor,
    /// Meadow under thunderclouds with gusting wind and a few buildings.
    Storm,
    /// A crate waiting to be flown to the pad.
    Cargo,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::Meadow, Scenario::Harbor, Scenario::Storm, Scenario::Cargo];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Meadow => "meadow",
            Scenario::Harbor => "harbor",
            Scenario::Storm => "storm",
            Scenario::Cargo => "cargo",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| format!("unknown scenario: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    pub seed: u64,
    pub scenario: Scenario,
    pub pilot_name: String,
    pub max_ticks: u32,
    pub sim_config: SimConfig,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scenario: Scenario::default(),
            pilot_name: "pilot".into(),
            max_ticks: crate::MAX_TICKS,
            sim_config: SimConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLog {
    pub config: FlightConfig,
    pub frames: Vec<FrameSnapshot>,
    pub events: Vec<TimedEvent>,
    pub collisions: Vec<CollisionEvent>,
    pub result: FlightResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightOutcome {
    Destroyed(DeathCause),
    Stranded,
    Survived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightResult {
    pub outcome: FlightOutcome,
    pub final_tick: u32,
    pub stats: FlightStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightStats {
    pub fuel_used: f32,
    pub landings: u32,
    pub perfect_landings: u32,
    pub deliveries: u32,
    pub juggles: u32,
    pub max_speed: f32,
}
