pub mod bodies;
pub mod cargo;
pub mod collision;
pub mod contacts;
pub mod explosion;
pub mod flight_loop;
pub mod geometry;
pub mod landing;
pub mod lightning;
pub mod pilot;
pub mod scenario;
pub mod schedule;
pub mod terrain;
pub mod vehicle;
pub mod world;

pub use flight_loop::*;
pub use pilot::*;
pub use scenario::{build_world, wind_at};
pub use terrain::{FlatTerrain, Heightfield, TerrainQuery, VehicleRegistry};
pub use world::{TickInput, World, WorldError};
