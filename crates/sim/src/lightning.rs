//! Storm clouds that lock onto a vehicle, charge, and strike or miss.
//!
//! Idle -> Warning -> Pending -> Resolved -> Idle. A warning schedules its
//! own resolution through the [`Scheduler`]; the world moves the cloud to
//! Pending when that entry fires and the strike is evaluated later the same
//! tick.

use glam::Vec2;
use lander_shared::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schedule::{Deferred, EntityRef, Scheduler};
use crate::terrain::{TerrainQuery, VehicleRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeOutcome {
    Strike,
    Miss,
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatState {
    Idle,
    Warning {
        target: VehicleId,
        started_ms: u64,
        strike_delay_ms: u64,
    },
    Pending {
        target: VehicleId,
    },
    Resolved {
        outcome: StrikeOutcome,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreatCloud {
    pub id: CloudId,
    pub position: Vec2,
    pub collision_radius: f32,
    pub state: ThreatState,
    pub cooldown_until_ms: u64,
}

impl ThreatCloud {
    pub fn is_charging(&self) -> bool {
        matches!(self.state, ThreatState::Warning { .. } | ThreatState::Pending { .. })
    }

    pub fn snapshot(&self) -> CloudSnapshot {
        CloudSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            charging: self.is_charging(),
        }
    }
}

/// What the storm sees this tick.
pub struct StormContext<'a> {
    pub tick: u32,
    pub weather: Weather,
    pub viewport: Viewport,
    pub vehicles: &'a dyn VehicleRegistry,
    pub terrain: &'a dyn TerrainQuery,
    pub config: &'a LightningConfig,
}

impl StormContext<'_> {
    fn now_ms(&self) -> u64 {
        ticks_to_ms(self.tick)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LightningSystem {
    clouds: Vec<ThreatCloud>,
    next_id: u32,
    next_scan_ms: u64,
}

impl LightningSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cloud(&mut self, position: Vec2, collision_radius: f32) -> CloudId {
        let id = CloudId(self.next_id);
        self.next_id += 1;
        self.clouds.push(ThreatCloud {
            id,
            position,
            collision_radius,
            state: ThreatState::Idle,
            cooldown_until_ms: 0,
        });
        id
    }

    /// Remove a cloud along with any strike it has scheduled.
    pub fn remove_cloud(&mut self, id: CloudId, scheduler: &mut Scheduler) -> Option<ThreatCloud> {
        let idx = self.clouds.iter().position(|c| c.id == id)?;
        scheduler.cancel_entity(EntityRef::Cloud(id));
        Some(self.clouds.remove(idx))
    }

    pub fn cloud(&self, id: CloudId) -> Option<&ThreatCloud> {
        self.clouds.iter().find(|c| c.id == id)
    }

    pub fn cloud_mut(&mut self, id: CloudId) -> Option<&mut ThreatCloud> {
        self.clouds.iter_mut().find(|c| c.id == id)
    }

    pub fn clouds(&self) -> &[ThreatCloud] {
        &self.clouds
    }

    /// Clouds currently holding a strike slot.
    pub fn charging(&self) -> usize {
        self.clouds.iter().filter(|c| c.is_charging()).count()
    }

    /// The scheduled resolution of a warning came due.
    pub fn arm(&mut self, cloud: CloudId, target: VehicleId) -> bool {
        let Some(c) = self.cloud_mut(cloud) else {
            tracing::debug!(%cloud, "strike resolution for a removed cloud dropped");
            return false;
        };
        match c.state {
            ThreatState::Warning { target: t, .. } if t == target => {
                c.state = ThreatState::Pending { target };
                true
            }
            state => {
                tracing::debug!(%cloud, ?state, "strike resolution no longer applies");
                false
            }
        }
    }

    /// Drop every threat aimed at a vehicle that is gone or destroyed.
    pub fn cancel_target(&mut self, target: VehicleId, now_ms: u64, config: &LightningConfig, scheduler: &mut Scheduler) {
        scheduler.cancel_where(|e| matches!(e.payload, Deferred::ResolveStrike { target: t } if t == target));
        for cloud in &mut self.clouds {
            let aimed = match cloud.state {
                ThreatState::Warning { target: t, .. } | ThreatState::Pending { target: t } => t == target,
                _ => false,
            };
            if aimed {
                tracing::debug!(cloud = %cloud.id, vehicle = %target, "lightning threat cancelled");
                cloud.state = ThreatState::Idle;
                cloud.cooldown_until_ms = now_ms + config.cooldown_ms;
            }
        }
    }

    /// Resolve pending strikes, let cooldowns lapse, and scan for new
    /// threats when the scan interval has elapsed.
    pub fn update<R: Rng>(&mut self, ctx: &StormContext, rng: &mut R, scheduler: &mut Scheduler) -> Vec<SimEvent> {
        let now_ms = ctx.now_ms();
        let mut events = Vec::new();

        for cloud in &mut self.clouds {
            if let ThreatState::Pending { target } = cloud.state {
                let outcome = strike_outcome(cloud, target, ctx);
                events.push(match outcome {
                    StrikeOutcome::Strike => {
                        tracing::info!(cloud = %cloud.id, vehicle = %target, "lightning strike");
                        SimEvent::LightningStrike {
                            id: target,
                            cloud: cloud.id,
                        }
                    }
                    _ => SimEvent::LightningMiss { cloud: cloud.id },
                });
                cloud.state = ThreatState::Resolved { outcome };
                cloud.cooldown_until_ms = now_ms + ctx.config.cooldown_ms;
            }
        }

        for cloud in &mut self.clouds {
            if matches!(cloud.state, ThreatState::Resolved { .. }) && now_ms >= cloud.cooldown_until_ms {
                cloud.state = ThreatState::Idle;
            }
        }

        if ctx.weather == Weather::Stormy && now_ms >= self.next_scan_ms {
            self.next_scan_ms = now_ms + ctx.config.scan_interval_ms;
            self.scan(ctx, rng, scheduler, &mut events);
        }
        events
    }

    fn scan<R: Rng>(&mut self, ctx: &StormContext, rng: &mut R, scheduler: &mut Scheduler, events: &mut Vec<SimEvent>) {
        let now_ms = ctx.now_ms();
        let config = ctx.config;
        let mut charging = self.charging();
        let mut targeted: Vec<VehicleId> = self
            .clouds
            .iter()
            .filter_map(|c| match c.state {
                ThreatState::Warning { target, .. } | ThreatState::Pending { target } => Some(target),
                _ => None,
            })
            .collect();

        for cloud in &mut self.clouds {
            if cloud.state != ThreatState::Idle
                || now_ms < cloud.cooldown_until_ms
                || !ctx.viewport.contains(cloud.position, config.view_margin)
            {
                continue;
            }

            if charging < config.max_pending_strikes {
                if let Some(target) = find_target(cloud, ctx, &targeted) {
                    if rng.gen_bool(config.warning_chance.clamp(0.0, 1.0)) {
                        let strike_delay_ms = if config.max_delay_ms > config.min_delay_ms {
                            rng.gen_range(config.min_delay_ms..config.max_delay_ms)
                        } else {
                            config.min_delay_ms
                        };
                        cloud.state = ThreatState::Warning {
                            target,
                            started_ms: now_ms,
                            strike_delay_ms,
                        };
                        scheduler.schedule(
                            ctx.tick.saturating_add(ms_to_ticks(strike_delay_ms)),
                            EntityRef::Cloud(cloud.id),
                            Deferred::ResolveStrike { target },
                        );
                        charging += 1;
                        targeted.push(target);
                        tracing::debug!(cloud = %cloud.id, vehicle = %target, strike_delay_ms, "lightning warning");
                        events.push(SimEvent::LightningWarning {
                            cloud: cloud.id,
                            target,
                        });
                        continue;
                    }
                }
            }

            if rng.gen_bool(config.ambient_chance.clamp(0.0, 1.0)) {
                cloud.state = ThreatState::Resolved {
                    outcome: StrikeOutcome::Ambient,
                };
                cloud.cooldown_until_ms = now_ms + config.ambient_cooldown_ms;
                events.push(SimEvent::AmbientDischarge { cloud: cloud.id });
            }
        }
    }
}

/// First live vehicle, by id, inside the warning band under the cloud and not
/// already threatened by another cloud.
fn find_target(cloud: &ThreatCloud, ctx: &StormContext, taken: &[VehicleId]) -> Option<VehicleId> {
    let config = ctx.config;
    let r = cloud.collision_radius;
    let mut ids = ctx.vehicles.vehicle_ids();
    ids.sort();
    ids.into_iter().filter(|id| !taken.contains(id)).find(|id| {
        ctx.vehicles.vehicle(*id).is_some_and(|v| {
            let dx = (cloud.position.x - v.position.x).abs();
            let below = cloud.position.y - v.position.y;
            v.alive
                && dx <= config.warning_band_x
                && below >= r + config.warning_min_below
                && below <= r + config.warning_max_below
        })
    })
}

fn strike_outcome(cloud: &ThreatCloud, target: VehicleId, ctx: &StormContext) -> StrikeOutcome {
    let config = ctx.config;
    let Some(v) = ctx.vehicles.vehicle(target).filter(|v| v.alive) else {
        tracing::warn!(cloud = %cloud.id, vehicle = %target, "strike target left the world");
        return StrikeOutcome::Miss;
    };
    let dx = (cloud.position.x - v.position.x).abs();
    let below = cloud.position.y - v.position.y;
    let in_band = dx <= config.strike_band_x && below >= 0.0 && below <= cloud.collision_radius + config.strike_max_below;
    let grounded = v.lower_edge() - ctx.terrain.height_at(v.position.x) < config.grounded_distance;

    if in_band && !grounded && ctx.weather == Weather::Stormy {
        StrikeOutcome::Strike
    } else {
        StrikeOutcome::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;
    use crate::vehicle::VehicleState;
    use rand::rngs::mock::StepRng;

    const CLOUD_Y: f32 = 500.0;
    const RADIUS: f32 = 40.0;

    /// Every probability roll succeeds and every delay is the minimum.
    fn lucky() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every probability roll fails.
    fn unlucky() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn vehicles_at(points: &[(f32, f32)]) -> Vec<VehicleState> {
        points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| VehicleState::new(VehicleId(i as u32), Vec2::new(*x, *y), &SimConfig::default(), 0))
            .collect()
    }

    fn ctx<'a>(tick: u32, vehicles: &'a Vec<VehicleState>, terrain: &'a FlatTerrain, config: &'a LightningConfig) -> StormContext<'a> {
        StormContext {
            tick,
            weather: Weather::Stormy,
            viewport: Viewport::unbounded(),
            vehicles,
            terrain,
            config,
        }
    }

    /// Run the storm from `from` until the scheduled resolution fires.
    fn run_until_resolution(
        storm: &mut LightningSystem,
        scheduler: &mut Scheduler,
        vehicles: &Vec<VehicleState>,
        terrain: &FlatTerrain,
        config: &LightningConfig,
    ) -> Vec<SimEvent> {
        let mut rng = unlucky();
        for tick in 1..=ms_to_ticks(config.max_delay_ms) + 1 {
            let mut armed = false;
            for due in scheduler.drain_due(tick) {
                if let Deferred::ResolveStrike { target } = due.payload {
                    if let EntityRef::Cloud(cloud) = due.entity {
                        armed |= storm.arm(cloud, target);
                    }
                }
            }
            let events = storm.update(&ctx(tick, vehicles, terrain, config), &mut rng, scheduler);
            if armed {
                return events;
            }
        }
        Vec::new()
    }

    #[test]
    fn test_warning_then_strike() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        let cloud = storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut scheduler = Scheduler::new();

        let events = storm.update(&ctx(0, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        assert_eq!(
            events,
            vec![SimEvent::LightningWarning {
                cloud,
                target: VehicleId(0)
            }]
        );
        assert_eq!(
            storm.cloud(cloud).map(|c| c.state),
            Some(ThreatState::Warning {
                target: VehicleId(0),
                started_ms: 0,
                strike_delay_ms: LIGHTNING_MIN_DELAY_MS
            })
        );
        assert_eq!(scheduler.len(), 1);

        let events = run_until_resolution(&mut storm, &mut scheduler, &vehicles, &terrain, &config);
        assert_eq!(
            events,
            vec![SimEvent::LightningStrike {
                id: VehicleId(0),
                cloud
            }]
        );
        let c = storm.cloud(cloud).expect("cloud still exists");
        assert_eq!(
            c.state,
            ThreatState::Resolved {
                outcome: StrikeOutcome::Strike
            }
        );
        assert!(c.cooldown_until_ms >= LIGHTNING_MIN_DELAY_MS + LIGHTNING_COOLDOWN_MS);
    }

    #[test]
    fn test_grounded_target_always_misses() {
        let config = LightningConfig::default();
        let vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0)]);
        // Ground raised to just under the vehicle after the warning
        let high_ground = FlatTerrain(vehicles[0].lower_edge() - 20.0);
        let open_sky = FlatTerrain(0.0);
        let mut storm = LightningSystem::new();
        let cloud = storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut scheduler = Scheduler::new();

        storm.update(&ctx(0, &vehicles, &open_sky, &config), &mut lucky(), &mut scheduler);
        let events = run_until_resolution(&mut storm, &mut scheduler, &vehicles, &high_ground, &config);
        assert_eq!(events, vec![SimEvent::LightningMiss { cloud }]);
    }

    #[test]
    fn test_target_leaving_band_misses() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let mut vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        let cloud = storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut scheduler = Scheduler::new();

        storm.update(&ctx(0, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        vehicles[0].position.x = 400.0;
        let events = run_until_resolution(&mut storm, &mut scheduler, &vehicles, &terrain, &config);
        assert_eq!(events, vec![SimEvent::LightningMiss { cloud }]);

        let resolved_ms = ticks_to_ms(ms_to_ticks(config.min_delay_ms));
        let c = storm.cloud(cloud).expect("cloud still exists");
        assert_eq!(
            c.state,
            ThreatState::Resolved {
                outcome: StrikeOutcome::Miss
            }
        );
        assert!(c.cooldown_until_ms >= resolved_ms + LIGHTNING_COOLDOWN_MS);
    }

    #[test]
    fn test_single_pending_slot() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0), (1000.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        storm.add_cloud(Vec2::new(1000.0, CLOUD_Y), RADIUS);
        let mut scheduler = Scheduler::new();

        let events = storm.update(&ctx(0, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        let warnings = events
            .iter()
            .filter(|e| matches!(e, SimEvent::LightningWarning { .. }))
            .count();
        assert_eq!(warnings, 1);
        assert_eq!(storm.charging(), 1);

        let wider = LightningConfig {
            max_pending_strikes: 2,
            ..config
        };
        let mut storm2 = LightningSystem::new();
        storm2.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        storm2.add_cloud(Vec2::new(1000.0, CLOUD_Y), RADIUS);
        storm2.update(&ctx(0, &vehicles, &terrain, &wider), &mut lucky(), &mut Scheduler::new());
        assert_eq!(storm2.charging(), 2);
    }

    #[test]
    fn test_one_threat_per_vehicle() {
        let config = LightningConfig {
            max_pending_strikes: 2,
            ..LightningConfig::default()
        };
        let terrain = FlatTerrain(0.0);
        let vehicles = vehicles_at(&[(50.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        storm.add_cloud(Vec2::new(100.0, CLOUD_Y), RADIUS);

        storm.update(&ctx(0, &vehicles, &terrain, &config), &mut lucky(), &mut Scheduler::new());
        assert_eq!(storm.charging(), 1, "second cloud must not pile onto the same target");
    }

    #[test]
    fn test_ambient_discharge_and_cooldown() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let vehicles = Vec::new();
        let mut storm = LightningSystem::new();
        let cloud = storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut scheduler = Scheduler::new();

        let events = storm.update(&ctx(0, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        assert_eq!(events, vec![SimEvent::AmbientDischarge { cloud }]);

        // Next scan falls inside the ambient cooldown
        let tick = ms_to_ticks(LIGHTNING_SCAN_INTERVAL_MS);
        let events = storm.update(&ctx(tick, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        assert!(events.is_empty());

        let tick = ms_to_ticks(AMBIENT_COOLDOWN_MS);
        let events = storm.update(&ctx(tick, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        assert_eq!(events, vec![SimEvent::AmbientDischarge { cloud }]);
    }

    #[test]
    fn test_clear_weather_never_scans() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut clear = ctx(0, &vehicles, &terrain, &config);
        clear.weather = Weather::Clear;
        assert!(storm.update(&clear, &mut lucky(), &mut Scheduler::new()).is_empty());
    }

    #[test]
    fn test_out_of_view_cloud_is_skipped() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut far_view = ctx(0, &vehicles, &terrain, &config);
        far_view.viewport = Viewport::new(Vec2::new(5000.0, 0.0), Vec2::new(6000.0, 1000.0));
        assert!(storm.update(&far_view, &mut lucky(), &mut Scheduler::new()).is_empty());
    }

    #[test]
    fn test_removing_cloud_or_target_cancels_strike() {
        let config = LightningConfig::default();
        let terrain = FlatTerrain(0.0);
        let vehicles = vehicles_at(&[(0.0, CLOUD_Y - RADIUS - 100.0)]);
        let mut storm = LightningSystem::new();
        let cloud = storm.add_cloud(Vec2::new(0.0, CLOUD_Y), RADIUS);
        let mut scheduler = Scheduler::new();

        storm.update(&ctx(0, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        storm.cancel_target(VehicleId(0), 100, &config, &mut scheduler);
        assert!(scheduler.is_empty());
        assert_eq!(storm.charging(), 0);

        storm.cloud_mut(cloud).expect("cloud exists").cooldown_until_ms = 0;
        let tick = ms_to_ticks(LIGHTNING_SCAN_INTERVAL_MS);
        storm.update(&ctx(tick, &vehicles, &terrain, &config), &mut lucky(), &mut scheduler);
        assert_eq!(scheduler.len(), 1);
        assert!(storm.remove_cloud(cloud, &mut scheduler).is_some());
        assert!(scheduler.is_empty());
        assert!(!storm.arm(cloud, VehicleId(0)));
    }
}
