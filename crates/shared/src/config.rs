use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Tunable simulation parameters. Every field defaults to the matching
/// constant, so a partial JSON override only needs the fields it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub gravity: f32,
    pub air_friction: f32,
    pub wind_force: f32,
    pub rotation_speed: f32,
    pub angular_damping: f32,
    pub thrust_force: f32,
    pub max_fuel: f32,
    pub fuel_burn_rate: f32,
    pub safe_landing_velocity: f32,
    pub safe_landing_angle: f32,
    pub terrain_crash_speed: f32,
    pub wall_crash_speed: f32,
    pub building_crash_speed: f32,
    pub spawn_invulnerability_ms: u64,
    pub landing_debounce_ms: u64,
    pub lightning: LightningConfig,
    pub explosion: ExplosionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            air_friction: AIR_FRICTION,
            wind_force: WIND_FORCE,
            rotation_speed: ROTATION_SPEED,
            angular_damping: ANGULAR_DAMPING,
            thrust_force: THRUST_FORCE,
            max_fuel: MAX_FUEL,
            fuel_burn_rate: FUEL_BURN_RATE,
            safe_landing_velocity: SAFE_LANDING_VELOCITY,
            safe_landing_angle: SAFE_LANDING_ANGLE,
            terrain_crash_speed: TERRAIN_CRASH_SPEED,
            wall_crash_speed: WALL_CRASH_SPEED,
            building_crash_speed: BUILDING_CRASH_SPEED,
            spawn_invulnerability_ms: SPAWN_INVULNERABILITY_MS,
            landing_debounce_ms: LANDING_DEBOUNCE_MS,
            lightning: LightningConfig::default(),
            explosion: ExplosionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    pub scan_interval_ms: u64,
    pub warning_band_x: f32,
    /// Vertical warning band below the cloud, offset from its collision radius.
    pub warning_min_below: f32,
    pub warning_max_below: f32,
    pub strike_band_x: f32,
    pub strike_max_below: f32,
    /// Targets closer than this to the terrain are grounded and never struck.
    pub grounded_distance: f32,
    pub warning_chance: f64,
    pub ambient_chance: f64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub cooldown_ms: u64,
    pub ambient_cooldown_ms: u64,
    /// How many clouds may be charging a strike at once.
    pub max_pending_strikes: usize,
    pub view_margin: f32,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: LIGHTNING_SCAN_INTERVAL_MS,
            warning_band_x: LIGHTNING_WARNING_BAND_X,
            warning_min_below: LIGHTNING_WARNING_MIN_BELOW,
            warning_max_below: LIGHTNING_WARNING_MAX_BELOW,
            strike_band_x: LIGHTNING_STRIKE_BAND_X,
            strike_max_below: LIGHTNING_STRIKE_MAX_BELOW,
            grounded_distance: LIGHTNING_GROUNDED_DISTANCE,
            warning_chance: LIGHTNING_WARNING_CHANCE,
            ambient_chance: LIGHTNING_AMBIENT_CHANCE,
            min_delay_ms: LIGHTNING_MIN_DELAY_MS,
            max_delay_ms: LIGHTNING_MAX_DELAY_MS,
            cooldown_ms: LIGHTNING_COOLDOWN_MS,
            ambient_cooldown_ms: AMBIENT_COOLDOWN_MS,
            max_pending_strikes: 1,
            view_margin: LIGHTNING_VIEW_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    pub radius: f32,
    pub force: f32,
    pub upward_bias: f32,
    pub light_multiplier: f32,
    pub light_upward_bias: f32,
    pub tumble: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            radius: EXPLOSION_RADIUS,
            force: EXPLOSION_FORCE,
            upward_bias: EXPLOSION_UPWARD_BIAS,
            light_multiplier: EXPLOSION_LIGHT_MULTIPLIER,
            light_upward_bias: EXPLOSION_LIGHT_UPWARD_BIAS,
            tumble: EXPLOSION_TUMBLE,
        }
    }
}
