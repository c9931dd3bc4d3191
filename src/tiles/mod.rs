//! Tile appearances, the variant registry and the tile catalog.

mod appearance;
mod catalog;
mod registry;

pub use appearance::{AppearanceKey, Rgb, TileAppearance, DEFAULT_QUANTIZE_STEP};
pub use catalog::{default_tile_definitions, TileCatalog, TileDefinition, TileKind};
pub use registry::{RegistryStats, TileVariantRegistry, VariantHandle};
