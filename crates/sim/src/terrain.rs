//! Capability interfaces the simulation consumes from its collaborators, plus
//! two simple terrain profiles for headless runs and tests.

use lander_shared::VehicleId;

use crate::vehicle::VehicleState;

/// Height of the ground surface at a horizontal position.
pub trait TerrainQuery {
    fn height_at(&self, x: f32) -> f32;
}

/// Read access to the vehicles of the current world snapshot.
pub trait VehicleRegistry {
    fn vehicle(&self, id: VehicleId) -> Option<&VehicleState>;
    fn vehicle_ids(&self) -> Vec<VehicleId>;
}

/// Level ground at a fixed height.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain(pub f32);

impl TerrainQuery for FlatTerrain {
    fn height_at(&self, _x: f32) -> f32 {
        self.0
    }
}

/// Piecewise-linear terrain through sorted control points. Positions outside
/// the sampled range take the height of the nearest end point.
#[derive(Debug, Clone)]
pub struct Heightfield {
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl Heightfield {
    pub fn new(points: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut points: Vec<(f32, f32)> = points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys) = points.into_iter().unzip();
        Self { xs, ys }
    }
}

impl TerrainQuery for Heightfield {
    fn height_at(&self, x: f32) -> f32 {
        let n = self.xs.len();
        if n == 0 {
            return 0.0;
        }
        if x.is_nan() || x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        // First control point strictly to the right of x
        let i = self.xs.partition_point(|&px| px <= x).clamp(1, n - 1);
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        let span = x1 - x0;
        if span <= f32::EPSILON {
            return y1;
        }
        y0 + (y1 - y0) * (x - x0) / span
    }
}

impl<T: TerrainQuery + ?Sized> TerrainQuery for Box<T> {
    fn height_at(&self, x: f32) -> f32 {
        (**self).height_at(x)
    }
}

impl VehicleRegistry for Vec<VehicleState> {
    fn vehicle(&self, id: VehicleId) -> Option<&VehicleState> {
        self.iter().find(|v| v.id == id)
    }

    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.iter().map(|v| v.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightfield_interpolates() {
        let terrain = Heightfield::new([(100.0, 50.0), (0.0, 0.0), (200.0, 50.0)]);
        assert!((terrain.height_at(50.0) - 25.0).abs() < 1e-4);
        assert!((terrain.height_at(150.0) - 50.0).abs() < 1e-4);
        assert_eq!(terrain.height_at(100.0), 50.0);
    }

    #[test]
    fn test_heightfield_clamps_outside_range() {
        let terrain = Heightfield::new([(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(terrain.height_at(-500.0), 10.0);
        assert_eq!(terrain.height_at(500.0), 20.0);
    }

    #[test]
    fn test_heightfield_survives_non_finite_x() {
        let terrain = Heightfield::new([(0.0, 10.0), (10.0, 20.0), (20.0, 5.0)]);
        assert_eq!(terrain.height_at(f32::NAN), 10.0);
        assert_eq!(terrain.height_at(f32::INFINITY), 5.0);
        assert_eq!(terrain.height_at(f32::NEG_INFINITY), 10.0);
    }

    #[test]
    fn test_empty_heightfield_is_sea_level() {
        let terrain = Heightfield::new(std::iter::empty());
        assert_eq!(terrain.height_at(3.0), 0.0);
    }
}
