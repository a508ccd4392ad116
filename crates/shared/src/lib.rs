pub mod config;
pub mod constants;
pub mod events;
pub mod ids;
pub mod types;

pub use config::*;
pub use constants::*;
pub use events::*;
pub use ids::*;
pub use types::*;
