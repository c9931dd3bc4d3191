//! Procedural realm generation library
//!
//! Builds a biome world map with rivers, cities and a pruned road network,
//! then generates detailed, cached zone maps on demand.

pub mod biomes;
pub mod config;
pub mod error;
pub mod export;
pub mod network;
pub mod noise_map;
pub mod seeds;
pub mod settlement;
pub mod terrain_cost;
pub mod tilemap;
pub mod tiles;
pub mod world;
pub mod zone;

pub use config::GeneratorConfig;
pub use error::{GenError, GenResult};
pub use tilemap::{GridPos, Tilemap};
pub use world::{generate_world, WorldData};
