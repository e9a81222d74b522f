pub mod config;
pub mod distribute;
pub mod error;
pub mod grid;
pub mod kmeans;
pub mod objects;
pub mod obstacles;
pub mod pipeline;
pub mod region;
pub mod rules;
pub mod zone;

pub use config::MapConfig;
pub use error::GenerationError;
pub use pipeline::{GeneratedMap, generate_map};
pub use rules::RulesDb;
