// Tick rate
pub const TICK_RATE: u32 = 60;

// Flight
pub const FLIGHT_DURATION_SECS: u32 = 120;
pub const MAX_TICKS: u32 = TICK_RATE * FLIGHT_DURATION_SECS; // 7200

// World (side-view: X=horizontal, Y=altitude). Speeds are units/tick.
pub const GRAVITY: f32 = 0.28;
pub const AIR_FRICTION: f32 = 0.01;
pub const WIND_FORCE: f32 = 0.05;

// Vehicle body
pub const VEHICLE_HALF_WIDTH: f32 = 15.0;
pub const VEHICLE_HALF_HEIGHT: f32 = 12.0;
pub const BASE_MASS: f32 = 5.0;
pub const LIGHT_CARGO_MASS: f32 = 8.0;
pub const HEAVY_CARGO_MASS: f32 = 10.0;

// Vehicle controls
pub const ROTATION_SPEED: f32 = 0.05; // rad/tick
pub const ANGULAR_DAMPING: f32 = 0.95;
pub const THRUST_FORCE: f32 = 4.5;
pub const MAX_FUEL: f32 = 100.0;
pub const FUEL_BURN_RATE: f32 = 0.1; // per thrusting tick

// Landing gear profile
pub const GEAR_FUEL_FACTOR: f32 = 1.2;
pub const GEAR_THRUST_FACTOR: f32 = 0.7;
pub const GEAR_DRAG_X: f32 = 0.98;
pub const GEAR_DRAG_Y: f32 = 0.99;

// Landing safety
pub const SAFE_LANDING_VELOCITY: f32 = 3.0;
pub const SAFE_LANDING_ANGLE: f32 = 0.4; // ~23 degrees
pub const PERFECT_LANDING_FUEL_BONUS: f32 = 30.0;
pub const GOOD_LANDING_FUEL_BONUS: f32 = 15.0;

// Collision thresholds
pub const TERRAIN_CRASH_SPEED: f32 = 8.0;
pub const WALL_CRASH_SPEED: f32 = 6.0;
pub const BUILDING_CRASH_SPEED: f32 = 8.0;
pub const TERRAIN_CONTACT_TOLERANCE: f32 = 30.0;
pub const SPAWN_INVULNERABILITY_MS: u64 = 2000;
pub const LANDING_DEBOUNCE_MS: u64 = 1000;
pub const PAD_EXIT_MARGIN_X: f32 = 20.0;
pub const PAD_EXIT_MARGIN_Y: f32 = 30.0;
pub const PAD_SURFACE_BELOW: f32 = -5.0;
pub const PAD_SURFACE_ABOVE: f32 = 10.0;
pub const PAD_THICKNESS: f32 = 10.0;
pub const SPAWN_PAD_ARM_SPEED: f32 = 0.5;
pub const UNDOCK_SPEED: f32 = 1.0;
pub const BOAT_HULL_DEPTH: f32 = 12.0;
pub const BOUNCE_RESTITUTION: f32 = 0.3;
pub const REST_SPEED: f32 = 1.0;
pub const TOMBSTONE_KICK: f32 = 4.0;
pub const CONTACT_SLOP: f32 = 0.5;

// Water tolerance bands
pub const WATER_PAD_TOLERANCE: f32 = 50.0;
pub const WATER_BOAT_TOLERANCE_X: f32 = 20.0;
pub const WATER_BOAT_TOLERANCE_Y: f32 = 30.0;
pub const WATER_WALL_TOLERANCE: f32 = 40.0;

// Stranded detector
pub const STRANDED_SPEED: f32 = 0.1;
pub const STRANDED_MS: u64 = 3000;

// Cargo
pub const CARGO_PICKUP_RANGE: f32 = 25.0;
pub const CARGO_RADIUS: f32 = 8.0;

// Lightning
pub const LIGHTNING_SCAN_INTERVAL_MS: u64 = 500;
pub const LIGHTNING_WARNING_BAND_X: f32 = 180.0;
pub const LIGHTNING_WARNING_MIN_BELOW: f32 = 10.0;
pub const LIGHTNING_WARNING_MAX_BELOW: f32 = 190.0;
pub const LIGHTNING_STRIKE_BAND_X: f32 = 250.0;
pub const LIGHTNING_STRIKE_MAX_BELOW: f32 = 200.0;
pub const LIGHTNING_GROUNDED_DISTANCE: f32 = 50.0;
pub const LIGHTNING_WARNING_CHANCE: f64 = 0.35;
pub const LIGHTNING_AMBIENT_CHANCE: f64 = 0.02;
pub const LIGHTNING_MIN_DELAY_MS: u64 = 2000;
pub const LIGHTNING_MAX_DELAY_MS: u64 = 3000;
pub const LIGHTNING_COOLDOWN_MS: u64 = 4000;
pub const AMBIENT_COOLDOWN_MS: u64 = 3000;
pub const LIGHTNING_VIEW_MARGIN: f32 = 200.0;

// Explosions
pub const EXPLOSION_RADIUS: f32 = 300.0;
pub const EXPLOSION_FORCE: f32 = 12.0;
pub const EXPLOSION_UPWARD_BIAS: f32 = 0.5;
pub const EXPLOSION_LIGHT_MULTIPLIER: f32 = 1.5;
pub const EXPLOSION_LIGHT_UPWARD_BIAS: f32 = 0.8;
pub const EXPLOSION_TUMBLE: f32 = 0.05;
pub const DEBRIS_DELAY_MS: u64 = 3500;
pub const DEBRIS_PIECES: u32 = 3;
pub const DEBRIS_MAX_SPEED: f32 = 4.0;

// Flight log
pub const FRAME_INTERVAL: u32 = 4; // record every 4th tick = 15fps

/// Convert a tick count to whole milliseconds of simulated time.
pub const fn ticks_to_ms(ticks: u32) -> u64 {
    ticks as u64 * 1000 / TICK_RATE as u64
}

/// Number of ticks needed for at least `ms` milliseconds to elapse,
/// saturating at `u32::MAX`.
pub const fn ms_to_ticks(ms: u64) -> u32 {
    let ticks = ms.saturating_mul(TICK_RATE as u64).div_ceil(1000);
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}
