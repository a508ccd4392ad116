use glam::Vec2;
use lander_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::bodies::{Body, BodyKind, BodyRegistry};
use crate::cargo::{detach, try_attach, CargoError};
use crate::collision::{release_landing_sites, resolve, respond, ColliderKind, Resolution, ResolveEnv};
use crate::contacts::{find_contacts, Scene};
use crate::explosion::{apply_explosion, Blast, ImpulseTarget};
use crate::geometry::*;
use crate::landing::landing_fuel_bonus;
use crate::lightning::{LightningSystem, StormContext, StrikeOutcome, ThreatState};
use crate::schedule::{Deferred, EntityRef, ScheduledEvent, Scheduler};
use crate::terrain::{TerrainQuery, VehicleRegistry};
use crate::vehicle::VehicleState;

#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("no such vehicle: {0}")]
    UnknownVehicle(VehicleId),
    #[error("{0} has been destroyed")]
    VehicleDestroyed(VehicleId),
    #[error("no such pad: {0:?}")]
    UnknownPad(PadId),
    #[error("no such cloud: {0}")]
    UnknownCloud(CloudId),
    #[error("no such body: {0:?}")]
    UnknownBody(BodyId),
    #[error(transparent)]
    Cargo(#[from] CargoError),
}

/// Everything the collaborators hand the simulation for one tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub controls: Vec<(VehicleId, ControlState)>,
    /// Wind strength, clamped to [-1, 1] by the dynamics.
    pub wind: f32,
    pub viewport: Viewport,
}

type ContactPair = (VehicleId, ColliderKind, u32);

/// The shared per-tick world snapshot every component reads and writes.
pub struct World {
    pub config: SimConfig,
    terrain: Box<dyn TerrainQuery>,
    vehicles: Vec<VehicleState>,
    bodies: BodyRegistry,
    /// Cargo bodies currently hanging under a vehicle.
    towed: BTreeMap<BodyId, Body>,
    pads: Vec<LandingPad>,
    boats: Vec<Boat>,
    walls: Vec<BrickWall>,
    buildings: Vec<Building>,
    water: Option<WaterRegion>,
    projectiles: Vec<Projectile>,
    lightning: LightningSystem,
    scheduler: Scheduler,
    rng: Pcg64,
    weather: Weather,
    tick: u32,
    events: Vec<TimedEvent>,
    collisions: Vec<CollisionEvent>,
    active_pairs: BTreeSet<ContactPair>,
    stats: FlightStats,
    next_vehicle: u32,
    next_fixture: u32,
}

impl World {
    pub fn new(terrain: impl TerrainQuery + 'static, config: SimConfig, seed: u64) -> Self {
        Self {
            config,
            terrain: Box::new(terrain),
            vehicles: Vec::new(),
            bodies: BodyRegistry::new(),
            towed: BTreeMap::new(),
            pads: Vec::new(),
            boats: Vec::new(),
            walls: Vec::new(),
            buildings: Vec::new(),
            water: None,
            projectiles: Vec::new(),
            lightning: LightningSystem::new(),
            scheduler: Scheduler::new(),
            rng: Pcg64::seed_from_u64(seed),
            weather: Weather::Clear,
            tick: 0,
            events: Vec::new(),
            collisions: Vec::new(),
            active_pairs: BTreeSet::new(),
            stats: FlightStats::default(),
            next_vehicle: 0,
            next_fixture: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn now_ms(&self) -> u64 {
        ticks_to_ms(self.tick)
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn stats(&self) -> FlightStats {
        self.stats
    }

    pub fn vehicles(&self) -> &[VehicleState] {
        &self.vehicles
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut VehicleState> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    pub fn pads(&self) -> &[LandingPad] {
        &self.pads
    }

    pub fn boats(&self) -> &[Boat] {
        &self.boats
    }

    pub fn water(&self) -> Option<&WaterRegion> {
        self.water.as_ref()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn lightning(&self) -> &LightningSystem {
        &self.lightning
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.collisions)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.tick,
            vehicles: self.vehicles.iter().map(|v| v.snapshot()).collect(),
            bodies: self
                .bodies
                .iter()
                .chain(self.towed.values())
                .map(|b| b.snapshot())
                .collect(),
            clouds: self.lightning.clouds().iter().map(|c| c.snapshot()).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // World building
    // -----------------------------------------------------------------------

    fn next_fixture_id(&mut self) -> u32 {
        let id = self.next_fixture;
        self.next_fixture += 1;
        id
    }

    pub fn add_pad(&mut self, x: f32, surface_y: f32, width: f32) -> PadId {
        let id = PadId(self.next_fixture_id());
        self.pads.push(LandingPad { id, x, surface_y, width });
        id
    }

    pub fn add_boat(&mut self, x: f32, deck_y: f32, half_width: f32, speed: f32, patrol: (f32, f32)) -> BoatId {
        let id = BoatId(self.next_fixture_id());
        self.boats.push(Boat {
            id,
            x,
            deck_y,
            half_width,
            speed,
            patrol_min_x: patrol.0.min(patrol.1),
            patrol_max_x: patrol.0.max(patrol.1),
        });
        id
    }

    pub fn add_wall(&mut self, x: f32, half_width: f32, top_y: f32) -> WallId {
        let id = WallId(self.next_fixture_id());
        self.walls.push(BrickWall { id, x, half_width, top_y });
        id
    }

    pub fn add_building(&mut self, x: f32, width: f32, base_y: f32, height: f32) -> BuildingId {
        let id = BuildingId(self.next_fixture_id());
        self.buildings.push(Building {
            id,
            x,
            width,
            base_y,
            height,
        });
        id
    }

    pub fn set_water(&mut self, water: Option<WaterRegion>) {
        self.water = water;
    }

    pub fn set_weather(&mut self, weather: Weather) {
        if weather != self.weather {
            tracing::debug!(?weather, "weather changed");
        }
        self.weather = weather;
    }

    pub fn add_cloud(&mut self, position: Vec2, collision_radius: f32) -> CloudId {
        self.lightning.add_cloud(position, collision_radius)
    }

    pub fn remove_cloud(&mut self, id: CloudId) -> Result<(), WorldError> {
        self.lightning
            .remove_cloud(id, &mut self.scheduler)
            .map(|_| ())
            .ok_or(WorldError::UnknownCloud(id))
    }

    pub fn spawn_body(&mut self, kind: BodyKind, position: Vec2, velocity: Vec2) -> BodyId {
        self.bodies.spawn(kind, position, velocity)
    }

    pub fn spawn_projectile(&mut self, position: Vec2, velocity: Vec2, radius: f32, lifetime_ticks: u32) -> ProjectileId {
        let id = ProjectileId(self.next_fixture_id());
        self.projectiles.push(Projectile {
            id,
            position,
            velocity,
            radius,
            ticks_remaining: lifetime_ticks,
        });
        id
    }

    // -----------------------------------------------------------------------
    // Vehicles
    // -----------------------------------------------------------------------

    pub fn spawn_vehicle(&mut self, position: Vec2) -> VehicleId {
        let id = VehicleId(self.next_vehicle);
        self.next_vehicle += 1;
        let now = self.now_ms();
        self.vehicles.push(VehicleState::new(id, position, &self.config, now));
        tracing::debug!(vehicle = %id, x = position.x, y = position.y, "vehicle spawned");
        id
    }

    /// Spawn resting on a pad. The pad is ignored as a landing site until
    /// the vehicle has lifted off.
    pub fn spawn_vehicle_on_pad(&mut self, pad: PadId) -> Result<VehicleId, WorldError> {
        let p = self
            .pads
            .iter()
            .find(|p| p.id == pad)
            .copied()
            .ok_or(WorldError::UnknownPad(pad))?;
        let id = self.spawn_vehicle(Vec2::new(p.x, p.surface_y + VEHICLE_HALF_HEIGHT));
        if let Some(v) = self.vehicle_mut(id) {
            v.landing.spawn_pad = Some(pad);
        }
        Ok(id)
    }

    /// Take a vehicle out of the world, cancelling everything that still
    /// refers to it.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Result<VehicleState, WorldError> {
        let idx = self.index_of(id)?;
        if self.vehicles[idx].tow.is_some() {
            self.release_cargo(idx, DetachReason::Released);
        }
        let now = self.now_ms();
        let cancelled = self.scheduler.cancel_entity(EntityRef::Vehicle(id));
        self.lightning
            .cancel_target(id, now, &self.config.lightning, &mut self.scheduler);
        self.active_pairs.retain(|(v, _, _)| *v != id);
        tracing::debug!(vehicle = %id, cancelled, "vehicle removed");
        Ok(self.vehicles.remove(idx))
    }

    /// Multiply thrust for a while. A second grant replaces the first.
    pub fn grant_thrust_boost(&mut self, id: VehicleId, multiplier: f32, duration_ms: u64) -> Result<(), WorldError> {
        let idx = self.live_index(id)?;
        let multiplier = if multiplier.is_finite() { multiplier.max(0.0) } else { 1.0 };
        self.vehicles[idx].thrust_multiplier = multiplier;
        self.scheduler
            .cancel_where(|e| e.entity == EntityRef::Vehicle(id) && e.payload == Deferred::ExpireThrustBoost);
        self.scheduler.schedule(
            self.tick.saturating_add(ms_to_ticks(duration_ms)),
            EntityRef::Vehicle(id),
            Deferred::ExpireThrustBoost,
        );
        Ok(())
    }

    /// Hook a specific cargo body onto a vehicle.
    pub fn attach_cargo(&mut self, id: VehicleId, body: BodyId) -> Result<CargoClass, WorldError> {
        let idx = self.index_of(id)?;
        let cargo = self.bodies.get(body).ok_or(WorldError::UnknownBody(body))?;
        match try_attach(&mut self.vehicles[idx], cargo) {
            Ok(class) => {
                self.stow(body);
                self.emit(SimEvent::CargoAttached { id, cargo_type: class });
                Ok(class)
            }
            Err(e) => {
                tracing::warn!(vehicle = %id, error = %e, "cargo pickup rejected");
                Err(e.into())
            }
        }
    }

    pub fn drop_cargo(&mut self, id: VehicleId) -> Result<CargoClass, WorldError> {
        let idx = self.index_of(id)?;
        if self.vehicles[idx].tow.is_none() {
            return Err(CargoError::NotCarrying(id).into());
        }
        self.release_cargo(idx, DetachReason::Dropped)
            .ok_or(WorldError::Cargo(CargoError::NotCarrying(id)))
    }

    /// Detonate at `origin`, shoving loose bodies and surviving vehicles.
    pub fn explode(&mut self, origin: Vec2) -> usize {
        let blast = Blast::new(origin, &self.config.explosion);
        let targets = self
            .bodies
            .iter_mut()
            .map(|b| b as &mut dyn ImpulseTarget)
            .chain(
                self.vehicles
                    .iter_mut()
                    .filter(|v| v.alive)
                    .map(|v| v as &mut dyn ImpulseTarget),
            );
        let hit = apply_explosion(&blast, targets, &self.config.explosion, &mut self.rng);
        self.emit(SimEvent::ExplosionOccurred {
            x: origin.x,
            y: origin.y,
            radius: blast.radius,
        });
        hit
    }

    fn index_of(&self, id: VehicleId) -> Result<usize, WorldError> {
        self.vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or(WorldError::UnknownVehicle(id))
    }

    fn live_index(&self, id: VehicleId) -> Result<usize, WorldError> {
        let idx = self.index_of(id)?;
        if !self.vehicles[idx].alive {
            return Err(WorldError::VehicleDestroyed(id));
        }
        Ok(idx)
    }

    fn emit(&mut self, event: SimEvent) {
        self.events.push(TimedEvent { tick: self.tick, event });
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the world by one tick.
    pub fn step(&mut self, input: &TickInput) {
        let now_ms = self.now_ms();
        let wind = if input.wind.is_finite() { input.wind.clamp(-1.0, 1.0) } else { 0.0 };

        for due in self.scheduler.drain_due(self.tick) {
            self.apply_deferred(due);
        }

        self.move_kinematics();

        let mut drops = Vec::new();
        for v in self.vehicles.iter_mut().filter(|v| v.alive) {
            let controls = input
                .controls
                .iter()
                .find(|(id, _)| *id == v.id)
                .map(|(_, c)| *c)
                .unwrap_or_default();
            let out = v.step(&controls, wind, &self.config);
            self.stats.fuel_used += out.fuel_burned;
            self.stats.max_speed = self.stats.max_speed.max(v.speed());
            if out.drop_requested {
                drops.push(v.id);
            }
        }

        self.resolve_contacts(now_ms);
        self.update_cargo(&drops);
        self.update_lightning(input.viewport);

        let sunk = self
            .bodies
            .step(&*self.terrain, self.water.as_ref(), wind, &self.config);
        for body in sunk {
            tracing::debug!(body = body.id.0, kind = ?body.kind, "body sank");
        }

        self.detect_stranded();
        self.tick += 1;
    }

    fn apply_deferred(&mut self, due: ScheduledEvent) {
        match (due.entity, due.payload) {
            (EntityRef::Cloud(cloud), Deferred::ResolveStrike { target }) => {
                if self.vehicle(target).is_some_and(|v| v.alive) {
                    self.lightning.arm(cloud, target);
                } else {
                    tracing::debug!(%cloud, vehicle = %target, "strike target gone, resolution dropped");
                }
            }
            (EntityRef::Vehicle(id), Deferred::SpawnDebris) => {
                let Some(at) = self.vehicle(id).map(|v| v.position) else {
                    return;
                };
                for _ in 0..DEBRIS_PIECES {
                    let velocity = Vec2::new(
                        self.rng.gen_range(-DEBRIS_MAX_SPEED..DEBRIS_MAX_SPEED),
                        self.rng.gen_range(0.0..DEBRIS_MAX_SPEED),
                    );
                    self.bodies.spawn(BodyKind::Debris, at, velocity);
                }
            }
            (EntityRef::Vehicle(id), Deferred::ExpireThrustBoost) => {
                if let Some(v) = self.vehicle_mut(id) {
                    v.thrust_multiplier = 1.0;
                }
            }
            (entity, payload) => {
                tracing::warn!(?entity, ?payload, "mismatched scheduled event dropped");
            }
        }
    }

    fn move_kinematics(&mut self) {
        for boat in &mut self.boats {
            let dx = boat.advance();
            for v in self
                .vehicles
                .iter_mut()
                .filter(|v| v.alive && v.landing.docked == Some(boat.id))
            {
                v.position.x += dx;
            }
        }
        for p in &mut self.projectiles {
            p.step();
        }
        self.projectiles.retain(|p| p.ticks_remaining > 0);
    }

    fn resolve_contacts(&mut self, now_ms: u64) {
        let mut seen = BTreeSet::new();
        let mut consumed = Vec::new();

        for idx in 0..self.vehicles.len() {
            if !self.vehicles[idx].alive {
                continue;
            }
            release_landing_sites(&mut self.vehicles[idx], &self.pads, &self.boats);

            let scene = Scene {
                terrain: &*self.terrain,
                water: self.water.as_ref(),
                pads: &self.pads,
                boats: &self.boats,
                walls: &self.walls,
                buildings: &self.buildings,
                projectiles: &self.projectiles,
                bodies: &self.bodies,
            };
            let contacts = find_contacts(&self.vehicles[idx], &scene);

            for contact in contacts {
                let pair = contact.pair();
                seen.insert(pair);
                let vehicle = &mut self.vehicles[idx];
                if !vehicle.alive {
                    break;
                }
                if self.active_pairs.contains(&pair) {
                    respond(vehicle, &contact, &Resolution::Ignored);
                    continue;
                }

                let env = ResolveEnv {
                    terrain: &*self.terrain,
                    water: self.water.as_ref(),
                    pads: &self.pads,
                    boats: &self.boats,
                    now_ms,
                    config: &self.config,
                };
                let resolution = resolve(vehicle, &contact, &env);
                respond(vehicle, &contact, &resolution);
                if let Some(category) = contact.kind.category() {
                    self.collisions.push(CollisionEvent {
                        category,
                        vehicle: contact.vehicle,
                        subject: contact.subject,
                        timestamp_ms: now_ms,
                    });
                }
                if contact.kind == ColliderKind::Projectile {
                    consumed.push(ProjectileId(contact.subject));
                }

                match resolution {
                    Resolution::Landed { site, quality } => self.on_landing(idx, site, quality),
                    Resolution::Destroyed(cause) => self.destroy(idx, cause),
                    Resolution::Juggled { count } => {
                        if let Some(stone) = self.bodies.get_mut(BodyId(contact.subject)) {
                            stone.velocity += Vec2::new(-contact.normal.x, 1.0) * TOMBSTONE_KICK;
                        }
                        self.stats.juggles += 1;
                        self.emit(SimEvent::TombstoneJuggled {
                            id: contact.vehicle,
                            count,
                        });
                    }
                    Resolution::Ignored | Resolution::Bounce => {}
                }
            }
        }

        self.active_pairs = seen;
        self.projectiles.retain(|p| !consumed.contains(&p.id));
    }

    fn on_landing(&mut self, idx: usize, site: LandingSite, quality: LandingQuality) {
        let v = &mut self.vehicles[idx];
        let id = v.id;
        v.fuel.refill(landing_fuel_bonus(quality));
        tracing::info!(vehicle = %id, ?quality, ?site, "landing resolved");

        self.stats.landings += 1;
        if quality == LandingQuality::Perfect {
            self.stats.perfect_landings += 1;
        }
        self.emit(SimEvent::LandingResolved { id, quality, site });

        if matches!(site, LandingSite::Pad(_)) && self.vehicles[idx].tow.is_some() {
            self.release_cargo(idx, DetachReason::Delivered);
            self.stats.deliveries += 1;
        }
    }

    fn destroy(&mut self, idx: usize, cause: DeathCause) {
        let v = &mut self.vehicles[idx];
        if !v.alive {
            return;
        }
        v.alive = false;
        v.thrusting = false;
        let (id, position) = (v.id, v.position);
        tracing::info!(vehicle = %id, %cause, x = position.x, y = position.y, "vehicle destroyed");

        if self.vehicles[idx].tow.is_some() {
            self.release_cargo(idx, DetachReason::Released);
        }
        self.emit(SimEvent::VehicleDestroyed { id, cause, position });

        let now = self.now_ms();
        self.lightning
            .cancel_target(id, now, &self.config.lightning, &mut self.scheduler);
        self.scheduler
            .cancel_where(|e| e.entity == EntityRef::Vehicle(id) && e.payload == Deferred::ExpireThrustBoost);
        self.active_pairs.retain(|(v, _, _)| *v != id);

        self.explode(position);
        self.scheduler.schedule(
            self.tick.saturating_add(ms_to_ticks(DEBRIS_DELAY_MS)),
            EntityRef::Vehicle(id),
            Deferred::SpawnDebris,
        );
    }

    // -----------------------------------------------------------------------
    // Cargo
    // -----------------------------------------------------------------------

    fn stow(&mut self, body: BodyId) {
        if let Some(b) = self.bodies.remove(body) {
            self.towed.insert(body, b);
        }
    }

    /// Unhook a vehicle's cargo. Dropped and released loads fall from the
    /// hook end; delivered and sunk loads leave the world.
    fn release_cargo(&mut self, idx: usize, reason: DetachReason) -> Option<CargoClass> {
        let v = &mut self.vehicles[idx];
        let tow = match detach(v) {
            Ok(tow) => tow,
            Err(e) => {
                tracing::debug!(error = %e, "nothing to release");
                return None;
            }
        };
        let (id, hook_end, velocity) = (v.id, tow.cargo_position(v.hook(), v.angle), v.velocity);

        if let Some(mut body) = self.towed.remove(&tow.cargo) {
            if matches!(reason, DetachReason::Dropped | DetachReason::Released) {
                body.position = hook_end;
                body.velocity = velocity;
                self.bodies.reinsert(body);
            }
        }
        tracing::debug!(vehicle = %id, cargo = ?tow.class, ?reason, "cargo detached");
        self.emit(SimEvent::CargoDetached {
            id,
            cargo_type: tow.class,
            reason,
        });
        Some(tow.class)
    }

    fn update_cargo(&mut self, drops: &[VehicleId]) {
        for id in drops {
            if let Ok(idx) = self.live_index(*id) {
                if self.vehicles[idx].tow.is_some() {
                    self.release_cargo(idx, DetachReason::Dropped);
                }
            }
        }

        for idx in 0..self.vehicles.len() {
            let v = &mut self.vehicles[idx];
            if !v.alive {
                continue;
            }
            let (velocity, angle, spin, hook) = (v.velocity, v.angle, v.angular_velocity, v.hook());
            let Some(tow) = v.tow.as_mut() else {
                continue;
            };
            tow.step(velocity, angle, spin, self.config.gravity);
            let at = tow.cargo_position(hook, angle);
            if let Some(body) = self.towed.get_mut(&tow.cargo) {
                body.position = at;
                body.velocity = velocity;
            }
            if self.water.is_some_and(|w| w.is_submerged(at)) {
                self.release_cargo(idx, DetachReason::Sunk);
            }
        }

        for idx in 0..self.vehicles.len() {
            let v = &self.vehicles[idx];
            if !v.alive || v.tow.is_some() {
                continue;
            }
            let candidate = self
                .bodies
                .iter()
                .filter(|b| matches!(b.kind, BodyKind::Cargo(_)) && b.velocity.length() < REST_SPEED)
                .map(|b| (b.id, b.position.distance(v.position)))
                .filter(|(_, d)| *d <= CARGO_PICKUP_RANGE)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id);
            if let Some(body) = candidate {
                let id = v.id;
                // Cannot fail: the vehicle is alive, empty and in range
                let _ = self.attach_cargo(id, body);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lightning and stranding
    // -----------------------------------------------------------------------

    fn update_lightning(&mut self, viewport: Viewport) {
        let ctx = StormContext {
            tick: self.tick,
            weather: self.weather,
            viewport,
            vehicles: &self.vehicles,
            terrain: &*self.terrain,
            config: &self.config.lightning,
        };
        let events = self.lightning.update(&ctx, &mut self.rng, &mut self.scheduler);

        for event in events {
            let SimEvent::LightningStrike { id, cloud } = event else {
                self.emit(event);
                continue;
            };
            let Ok(idx) = self.live_index(id) else {
                self.emit(SimEvent::LightningMiss { cloud });
                continue;
            };
            let now = self.now_ms();
            if self.vehicles[idx].is_invulnerable(now) {
                // Absorbed strikes read as misses
                tracing::debug!(vehicle = %id, %cloud, "lightning strike absorbed by invulnerability");
                if let Some(c) = self.lightning.cloud_mut(cloud) {
                    c.state = ThreatState::Resolved {
                        outcome: StrikeOutcome::Miss,
                    };
                }
                self.emit(SimEvent::LightningMiss { cloud });
                continue;
            }
            self.emit(event);
            self.destroy(idx, DeathCause::Lightning);
        }
    }

    fn detect_stranded(&mut self) {
        let dt_ms = ticks_to_ms(self.tick + 1) - ticks_to_ms(self.tick);
        let mut stranded = Vec::new();
        for v in self.vehicles.iter_mut().filter(|v| v.alive) {
            let on_pad = self
                .active_pairs
                .iter()
                .any(|(id, kind, _)| *id == v.id && *kind == ColliderKind::LandingPad);
            let supported = on_pad || v.landing.docked.is_some();
            if v.fuel.is_empty() && v.speed() < STRANDED_SPEED && !supported {
                v.stranded_ms += dt_ms;
                if v.stranded_ms >= STRANDED_MS && !v.stranded_reported {
                    v.stranded_reported = true;
                    stranded.push((v.id, v.position));
                }
            } else {
                v.stranded_ms = 0;
                v.stranded_reported = false;
            }
        }
        for (id, position) in stranded {
            tracing::info!(vehicle = %id, "vehicle stranded without fuel");
            self.emit(SimEvent::VehicleStranded { id, position });
        }
    }
}

impl VehicleRegistry for World {
    fn vehicle(&self, id: VehicleId) -> Option<&VehicleState> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.iter().map(|v| v.id).collect()
    }
}

impl TerrainQuery for World {
    fn height_at(&self, x: f32) -> f32 {
        self.terrain.height_at(x)
    }
}
