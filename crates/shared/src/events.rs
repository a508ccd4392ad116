use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ids::*;
use crate::types::*;

/// Abstract events produced by the simulation core for renderers, audio,
/// scoring and other collaborators to react to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    VehicleDestroyed {
        id: VehicleId,
        cause: DeathCause,
        position: Vec2,
    },
    LandingResolved {
        id: VehicleId,
        quality: LandingQuality,
        site: LandingSite,
    },
    CargoAttached {
        id: VehicleId,
        cargo_type: CargoClass,
    },
    CargoDetached {
        id: VehicleId,
        cargo_type: CargoClass,
        reason: DetachReason,
    },
    LightningWarning {
        cloud: CloudId,
        target: VehicleId,
    },
    /// Always followed by the target's `VehicleDestroyed` in the same tick. A
    /// strike absorbed by invulnerability is reported as `LightningMiss`.
    LightningStrike {
        id: VehicleId,
        cloud: CloudId,
    },
    LightningMiss {
        cloud: CloudId,
    },
    AmbientDischarge {
        cloud: CloudId,
    },
    ExplosionOccurred {
        x: f32,
        y: f32,
        radius: f32,
    },
    TombstoneJuggled {
        id: VehicleId,
        count: u32,
    },
    VehicleStranded {
        id: VehicleId,
        position: Vec2,
    },
}

/// An event stamped with the tick on which it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub tick: u32,
    pub event: SimEvent,
}
