//! Biome categories and noise-band classification.
//!
//! Natural biomes are assigned from a per-cell noise value using an ordered
//! table of `[min, max)` bands. Infrastructure biomes (roads, bridges,
//! settlements) have no band: they are stamped over the natural map by the
//! network builders.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::tiles::{Rgb, TileKind};

/// Tolerance when checking that neighboring bands touch
const BAND_EPSILON: f32 = 1e-5;

/// Terrain category of one world cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    Grassland,
    /// Only exists between classification and woodland resolution
    Woodland,
    Forest,
    Hills,
    Mountains,
    River,
    Road,
    Bridge,
    Settlement,
}

impl Biome {
    pub const ALL: [Biome; 9] = [
        Biome::Grassland,
        Biome::Woodland,
        Biome::Forest,
        Biome::Hills,
        Biome::Mountains,
        Biome::River,
        Biome::Road,
        Biome::Bridge,
        Biome::Settlement,
    ];

    /// Built structures rather than natural terrain
    pub fn is_infrastructure(self) -> bool {
        matches!(self, Biome::Road | Biome::Bridge | Biome::Settlement)
    }

    /// Resolved away before the world map is finalized
    pub fn is_transient(self) -> bool {
        matches!(self, Biome::Woodland)
    }

    pub fn is_water(self) -> bool {
        matches!(self, Biome::River)
    }

    pub fn walkable(self) -> bool {
        !matches!(self, Biome::River | Biome::Mountains)
    }

    /// Base traversal weight used for actor pathing and road costs
    pub fn base_weight(self) -> f32 {
        match self {
            Biome::Road | Biome::Bridge => 0.5,
            Biome::Settlement => 0.75,
            Biome::Grassland => 1.0,
            Biome::Woodland => 1.5,
            Biome::Forest => 2.0,
            Biome::Hills => 3.0,
            Biome::Mountains => 6.0,
            Biome::River => 8.0,
        }
    }

    /// Tile drawn for this biome on the world map
    pub fn world_tile(self) -> TileKind {
        match self {
            Biome::Grassland => TileKind::Grass,
            Biome::Woodland => TileKind::Shrub,
            Biome::Forest => TileKind::Tree,
            Biome::Hills => TileKind::Hill,
            Biome::Mountains => TileKind::Mountain,
            Biome::River => TileKind::Water,
            Biome::Road => TileKind::Road,
            Biome::Bridge => TileKind::Bridge,
            Biome::Settlement => TileKind::Settlement,
        }
    }
}

/// Half-open noise interval `[min, max)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseBand {
    pub min: f32,
    pub max: f32,
}

impl NoiseBand {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }
}

/// Display color and optional classification band for one biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeDefinition {
    pub biome: Biome,
    pub name: String,
    pub color: Rgb,
    #[serde(default)]
    pub band: Option<NoiseBand>,
}

impl BiomeDefinition {
    pub fn new(biome: Biome, name: &str, color: Rgb, band: Option<NoiseBand>) -> Self {
        Self {
            biome,
            name: name.to_string(),
            color,
            band,
        }
    }
}

/// Built-in biome table
pub fn default_biome_definitions() -> Vec<BiomeDefinition> {
    vec![
        BiomeDefinition::new(Biome::Grassland, "Grassland", Rgb(88, 136, 64), Some(NoiseBand::new(0.0, 0.45))),
        BiomeDefinition::new(Biome::Woodland, "Woodland", Rgb(64, 112, 52), Some(NoiseBand::new(0.45, 0.6))),
        BiomeDefinition::new(Biome::Forest, "Forest", Rgb(40, 88, 40), Some(NoiseBand::new(0.6, 0.7))),
        BiomeDefinition::new(Biome::Hills, "Hills", Rgb(120, 120, 72), Some(NoiseBand::new(0.7, 0.82))),
        BiomeDefinition::new(Biome::Mountains, "Mountains", Rgb(120, 112, 104), Some(NoiseBand::new(0.82, 1.0))),
        BiomeDefinition::new(Biome::River, "River", Rgb(48, 88, 168), None),
        BiomeDefinition::new(Biome::Road, "Road", Rgb(152, 128, 96), None),
        BiomeDefinition::new(Biome::Bridge, "Bridge", Rgb(136, 104, 64), None),
        BiomeDefinition::new(Biome::Settlement, "Settlement", Rgb(176, 152, 112), None),
    ]
}

/// Validated, immutable biome lookup table.
#[derive(Clone, Debug)]
pub struct BiomeTable {
    definitions: Vec<BiomeDefinition>,
    /// Indices into `definitions` of banded entries, ordered by band
    banded: Vec<usize>,
}

impl BiomeTable {
    /// Validate definitions: each biome defined once, and the banded entries
    /// ordered and contiguous from 0.0 up to at least 1.0.
    pub fn new(definitions: Vec<BiomeDefinition>) -> GenResult<Self> {
        for biome in Biome::ALL {
            let count = definitions.iter().filter(|d| d.biome == biome).count();
            if count != 1 {
                return Err(GenError::Configuration(format!(
                    "biome {:?} must be defined exactly once (found {})",
                    biome, count
                )));
            }
        }

        let banded: Vec<usize> = definitions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.band.is_some())
            .map(|(i, _)| i)
            .collect();

        let bands: Vec<(Biome, NoiseBand)> = banded
            .iter()
            .filter_map(|&i| definitions[i].band.map(|b| (definitions[i].biome, b)))
            .collect();

        let (first, last) = match (bands.first(), bands.last()) {
            (Some(first), Some(last)) => (first.1, last.1),
            _ => return Err(GenError::Configuration("no biome has a noise band".into())),
        };

        if first.min.abs() > BAND_EPSILON {
            return Err(GenError::Configuration(format!(
                "noise bands start at {} instead of 0.0",
                first.min
            )));
        }
        if last.max < 1.0 - BAND_EPSILON {
            return Err(GenError::Configuration(format!(
                "noise bands end at {} and do not cover 1.0",
                last.max
            )));
        }

        for (biome, band) in &bands {
            if band.max <= band.min {
                return Err(GenError::Configuration(format!(
                    "band for {:?} is empty: [{}, {})",
                    biome, band.min, band.max
                )));
            }
        }

        for pair in bands.windows(2) {
            let (prev_biome, prev) = pair[0];
            let (next_biome, next) = pair[1];
            if (prev.max - next.min).abs() > BAND_EPSILON {
                return Err(GenError::Configuration(format!(
                    "bands for {:?} and {:?} are not contiguous ({} vs {})",
                    prev_biome, next_biome, prev.max, next.min
                )));
            }
        }

        Ok(Self { definitions, banded })
    }

    /// Biome for a noise value; first matching band wins.
    pub fn classify(&self, noise: f32) -> GenResult<Biome> {
        self.banded
            .iter()
            .map(|&i| &self.definitions[i])
            .find(|d| d.band.map_or(false, |b| b.contains(noise)))
            .map(|d| d.biome)
            .ok_or_else(|| {
                GenError::Configuration(format!("no biome band matches noise value {}", noise))
            })
    }

    pub fn definition(&self, biome: Biome) -> GenResult<&BiomeDefinition> {
        self.definitions
            .iter()
            .find(|d| d.biome == biome)
            .ok_or_else(|| GenError::Configuration(format!("biome {:?} is not defined", biome)))
    }

    pub fn color(&self, biome: Biome) -> GenResult<Rgb> {
        Ok(self.definition(biome)?.color)
    }

    pub fn definitions(&self) -> &[BiomeDefinition] {
        &self.definitions
    }
}

impl Default for BiomeTable {
    fn default() -> Self {
        let definitions = default_biome_definitions();
        // The built-in bands are listed in order.
        let banded = definitions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.band.is_some())
            .map(|(i, _)| i)
            .collect();
        Self { definitions, banded }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_validates() {
        assert!(BiomeTable::new(default_biome_definitions()).is_ok());
    }

    #[test]
    fn test_classify_is_total_over_unit_interval() {
        let table = BiomeTable::new(default_biome_definitions()).unwrap();
        for i in 0..1000 {
            let noise = i as f32 / 1000.0;
            assert!(table.classify(noise).is_ok(), "noise {} unclassified", noise);
        }
        assert_eq!(table.classify(0.0).unwrap(), Biome::Grassland);
        assert_eq!(table.classify(0.45).unwrap(), Biome::Woodland);
        assert_eq!(table.classify(0.999).unwrap(), Biome::Mountains);
    }

    #[test]
    fn test_classify_out_of_range_is_configuration_error() {
        let table = BiomeTable::default();
        assert!(matches!(table.classify(1.5), Err(GenError::Configuration(_))));
        assert!(table.classify(-0.1).is_err());
    }

    #[test]
    fn test_gap_in_bands_is_rejected() {
        let mut defs = default_biome_definitions();
        defs[2].band = Some(NoiseBand::new(0.62, 0.7));
        assert!(matches!(BiomeTable::new(defs), Err(GenError::Configuration(_))));
    }

    #[test]
    fn test_bands_not_reaching_one_are_rejected() {
        let mut defs = default_biome_definitions();
        defs[4].band = Some(NoiseBand::new(0.82, 0.95));
        assert!(BiomeTable::new(defs).is_err());
    }

    #[test]
    fn test_missing_biome_is_rejected() {
        let mut defs = default_biome_definitions();
        defs.retain(|d| d.biome != Biome::Bridge);
        assert!(BiomeTable::new(defs).is_err());
    }

    #[test]
    fn test_band_boundary_belongs_to_upper_band() {
        let table = BiomeTable::default();
        assert_eq!(table.classify(0.4499).unwrap(), Biome::Grassland);
        assert_eq!(table.classify(0.7).unwrap(), Biome::Hills);
    }

    #[test]
    fn test_out_of_order_bands_are_rejected() {
        let mut defs = default_biome_definitions();
        defs.swap(0, 1);
        assert!(BiomeTable::new(defs).is_err());
    }

    #[test]
    fn test_infrastructure_flags() {
        assert!(Biome::Road.is_infrastructure());
        assert!(Biome::Settlement.is_infrastructure());
        assert!(!Biome::Forest.is_infrastructure());
        assert!(Biome::Woodland.is_transient());
    }
}
