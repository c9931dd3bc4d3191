//! Zone generation system.
//!
//! A zone is the detailed local map behind one world cell. Each zone is
//! seeded from the world seed and its position, painted by the strategy
//! registered for its world biome, and cached after the first request.
//!
//! # Example
//!
//! ```ignore
//! use realm_generator::zone::{ZoneCache, ZoneGenerator};
//!
//! let generator = ZoneGenerator::new(&world, &config, &tables, &registry);
//! let mut cache = ZoneCache::new(generator);
//! let zone = cache.get_or_generate(GridPos::new(12, 7))?;
//! ```

mod background;
mod cache;
mod generation;
mod road_template;
mod terrain;
mod types;

pub use background::{blend_background, effective_biome, world_tint, zone_tint};
pub use cache::{ZoneCache, ZoneCacheStats};
pub use generation::{strategy_for, ZoneContext, ZoneGenerator, ZoneStrategy, STRATEGIES};
pub use road_template::road_template;
pub use types::{Zone, ZoneTileInfo};
