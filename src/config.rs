//! Generator configuration loaded from JSON.
//!
//! Every section has defaults, so a config file only needs the values it
//! changes. `validate` turns the static tables into their checked lookup
//! forms; anything malformed is a configuration error at startup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::biomes::{default_biome_definitions, BiomeDefinition, BiomeTable};
use crate::error::{GenError, GenResult};
use crate::network::{RiverParams, RoadParams};
use crate::noise_map::NoiseParams;
use crate::settlement::SettlementParams;
use crate::tiles::{default_tile_definitions, TileCatalog, TileDefinition};

/// Smallest zone edge the strategies can work with
pub const MIN_ZONE_SIZE: usize = 8;

/// World map parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    /// Elevation noise, classified into biome bands
    pub noise: NoiseParams,
    /// Second layer that splits woodland into forest and grassland
    pub woodland_noise: NoiseParams,
    /// Woodland cells at or above this density become forest
    pub forest_density: f32,
    pub city_count: usize,
    /// Minimum Euclidean distance between cities
    pub city_spacing: f32,
    /// Placement budget for cities
    pub city_attempts: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 64,
            seed: 42,
            noise: NoiseParams::default(),
            woodland_noise: NoiseParams {
                scale: 8.0,
                octaves: 2,
                ..NoiseParams::default()
            },
            forest_density: 0.5,
            city_count: 6,
            city_spacing: 10.0,
            city_attempts: 500,
        }
    }
}

/// Zone map parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Edge length of a square zone
    pub size: usize,
    /// World-cell radius sampled for background tints
    pub blend_radius: i32,
    /// Width in tiles of the seam band along each zone edge
    pub edge_width: usize,
    /// How far the seam band moves toward the neighboring zone's tint
    pub edge_blend: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            size: 64,
            blend_radius: 2,
            edge_width: 6,
            edge_blend: 0.5,
        }
    }
}

/// Complete generator configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub world: WorldConfig,
    pub zone: ZoneConfig,
    pub roads: RoadParams,
    pub rivers: RiverParams,
    pub settlement: SettlementParams,
    pub biomes: Vec<BiomeDefinition>,
    pub tiles: Vec<TileDefinition>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            zone: ZoneConfig::default(),
            roads: RoadParams::default(),
            rivers: RiverParams::default(),
            settlement: SettlementParams::default(),
            biomes: default_biome_definitions(),
            tiles: default_tile_definitions(),
        }
    }
}

/// Lookup tables built from a validated config
#[derive(Clone, Debug)]
pub struct ValidatedTables {
    pub biomes: BiomeTable,
    pub tiles: TileCatalog,
}

impl GeneratorConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "loaded generator config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> GenResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> GenResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check sizes and build the biome and tile lookup tables.
    pub fn validate(&self) -> GenResult<ValidatedTables> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(GenError::Configuration(format!(
                "world size {}x{} is empty",
                self.world.width, self.world.height
            )));
        }
        if self.zone.size < MIN_ZONE_SIZE {
            return Err(GenError::Configuration(format!(
                "zone size {} is below the minimum of {}",
                self.zone.size, MIN_ZONE_SIZE
            )));
        }
        if !(0.0..=1.0).contains(&self.zone.edge_blend) {
            return Err(GenError::Configuration(format!(
                "zone edge blend {} is outside [0, 1]",
                self.zone.edge_blend
            )));
        }
        if self.rivers.lake_min > self.rivers.lake_max {
            return Err(GenError::Configuration(format!(
                "lake size range {}..={} is empty",
                self.rivers.lake_min, self.rivers.lake_max
            )));
        }
        self.settlement.validate()?;

        Ok(ValidatedTables {
            biomes: BiomeTable::new(self.biomes.clone())?,
            tiles: TileCatalog::from_definitions(&self.tiles)?,
        })
    }
}
