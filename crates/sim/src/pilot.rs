use lander_shared::*;

use crate::terrain::{TerrainQuery, VehicleRegistry};
use crate::vehicle::normalize_angle;
use crate::world::World;

/// What a pilot sees of its own vehicle each tick.
#[derive(Debug, Clone, Copy)]
pub struct PilotView {
    pub tick: u32,
    pub vehicle: VehicleSnapshot,
    /// Hull bottom above the terrain directly below.
    pub altitude: f32,
}

impl PilotView {
    pub fn observe(world: &World, id: VehicleId) -> Option<Self> {
        let v = world.vehicle(id)?;
        Some(Self {
            tick: world.tick(),
            vehicle: v.snapshot(),
            altitude: v.lower_edge() - world.height_at(v.position.x),
        })
    }
}

pub trait Pilot: Send {
    fn name(&self) -> &str;
    fn fly(&mut self, view: &PilotView) -> ControlState;
}

/// Pilot that never touches the controls.
pub struct IdlePilot;

impl Pilot for IdlePilot {
    fn name(&self) -> &str {
        "idle"
    }

    fn fly(&mut self, _view: &PilotView) -> ControlState {
        ControlState::none()
    }
}

/// Replays fixed input segments, then lets go.
pub struct ScriptedPilot {
    segments: Vec<(u32, ControlState)>,
    current: usize,
    remaining: u32,
}

impl ScriptedPilot {
    /// Each segment holds its controls for the given number of ticks.
    pub fn new(segments: Vec<(u32, ControlState)>) -> Self {
        let remaining = segments.first().map_or(0, |s| s.0);
        Self {
            segments,
            current: 0,
            remaining,
        }
    }
}

impl Pilot for ScriptedPilot {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fly(&mut self, _view: &PilotView) -> ControlState {
        while self.remaining == 0 {
            self.current += 1;
            match self.segments.get(self.current) {
                Some(seg) => self.remaining = seg.0,
                None => return ControlState::none(),
            }
        }
        self.remaining -= 1;
        self.segments[self.current].1
    }
}

/// Holds an altitude (or descends gently when the target is zero), keeps the
/// nose up and optionally drifts toward a horizontal goal.
pub struct HoverPilot {
    pub target_altitude: f32,
    pub max_descent: f32,
    pub goal_x: Option<f32>,
}

impl HoverPilot {
    pub fn hold(altitude: f32) -> Self {
        Self {
            target_altitude: altitude,
            max_descent: 1.0,
            goal_x: None,
        }
    }

    /// Controlled descent slow enough for a perfect touchdown.
    pub fn descend() -> Self {
        Self::hold(0.0)
    }

    pub fn toward(mut self, x: f32) -> Self {
        self.goal_x = Some(x);
        self
    }
}

impl Pilot for HoverPilot {
    fn name(&self) -> &str {
        "hover"
    }

    fn fly(&mut self, view: &PilotView) -> ControlState {
        let v = &view.vehicle;

        // Lean toward the goal while high, level out for touchdown
        let desired_angle = match self.goal_x {
            Some(goal) if view.altitude > 40.0 => ((goal - v.x) * 0.002 - v.vx * 0.08).clamp(-0.3, 0.3),
            _ => (-v.vx * 0.05).clamp(-0.2, 0.2),
        };
        let error = normalize_angle(v.angle) - desired_angle;

        let below_target = view.altitude < self.target_altitude;
        let thrust = v.vy < -self.max_descent || (below_target && v.vy < 0.5);

        ControlState {
            thrust,
            rotate_left: error > 0.03,
            rotate_right: error < -0.03,
            ..ControlState::none()
        }
    }
}
