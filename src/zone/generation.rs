//! Zone generation: per-biome strategy dispatch with a grassland fallback.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::biomes::Biome;
use crate::config::{GeneratorConfig, ValidatedTables};
use crate::error::{GenError, GenResult};
use crate::seeds::zone_seed;
use crate::settlement::{SettlementCell, SettlementLayoutBuilder};
use crate::tilemap::GridPos;
use crate::tiles::{TileCatalog, TileVariantRegistry};
use crate::world::WorldData;

use super::background::blend_background;
use super::road_template;
use super::terrain;
use super::types::Zone;

/// Everything a strategy may read while painting a zone
pub struct ZoneContext<'a> {
    pub world: &'a WorldData,
    pub config: &'a GeneratorConfig,
    pub catalog: &'a TileCatalog,
    pub registry: &'a TileVariantRegistry,
}

/// Paints one zone. Must draw all randomness from the given rng.
pub type ZoneStrategy = fn(&mut Zone, &ZoneContext<'_>, &mut ChaCha8Rng) -> GenResult<()>;

/// Biome to strategy table. Woodland is resolved before zones exist and
/// has no entry.
pub const STRATEGIES: &[(Biome, ZoneStrategy)] = &[
    (Biome::Grassland, terrain::grassland),
    (Biome::Forest, terrain::forest),
    (Biome::Hills, terrain::hills),
    (Biome::Mountains, terrain::mountains),
    (Biome::River, terrain::river),
    (Biome::Road, road_template::road),
    (Biome::Settlement, settlement),
    (Biome::Bridge, bridge),
];

pub fn strategy_for(biome: Biome) -> GenResult<ZoneStrategy> {
    STRATEGIES
        .iter()
        .find(|(b, _)| *b == biome)
        .map(|(_, s)| *s)
        .ok_or_else(|| GenError::Configuration(format!("no zone strategy for {:?}", biome)))
}

/// Grassland background with a settlement layout on top.
pub fn settlement(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    let layout = SettlementLayoutBuilder::new(ctx.config.settlement.clone()).build(zone.width(), zone.height(), rng)?;
    terrain::grassland(zone, ctx, rng)?;
    for (pos, &cell) in layout.cells.iter() {
        if cell != SettlementCell::Grass {
            zone.place(pos, cell.tile_kind(), ctx.catalog, ctx.registry)?;
        }
    }
    Ok(())
}

/// Bridge zones have no layout yet and fail loudly.
pub fn bridge(_zone: &mut Zone, _ctx: &ZoneContext<'_>, _rng: &mut ChaCha8Rng) -> GenResult<()> {
    Err(GenError::Unimplemented(Biome::Bridge))
}

/// Generates zones for one world. Holds only shared references.
pub struct ZoneGenerator<'a> {
    world: &'a WorldData,
    config: &'a GeneratorConfig,
    tables: &'a ValidatedTables,
    registry: &'a TileVariantRegistry,
}

impl<'a> ZoneGenerator<'a> {
    pub fn new(
        world: &'a WorldData,
        config: &'a GeneratorConfig,
        tables: &'a ValidatedTables,
        registry: &'a TileVariantRegistry,
    ) -> Self {
        Self {
            world,
            config,
            tables,
            registry,
        }
    }

    pub fn world(&self) -> &'a WorldData {
        self.world
    }

    /// Generate the zone for world cell `pos`.
    ///
    /// Recoverable failures (shortfalls) fall back to grassland; bounds,
    /// configuration and unimplemented errors propagate.
    pub fn generate(&self, pos: GridPos) -> GenResult<Zone> {
        let biome = self.world.biome_at(pos)?;
        let seed = zone_seed(self.world.seed(), pos);
        let strategy = strategy_for(biome)?;
        let ctx = ZoneContext {
            world: self.world,
            config: self.config,
            catalog: &self.tables.tiles,
            registry: self.registry,
        };

        let mut zone = self.blank_zone(pos, biome, seed)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match strategy(&mut zone, &ctx, &mut rng) {
            Ok(()) => {
                debug!(%pos, ?biome, "zone generated");
                Ok(zone)
            }
            Err(err) if err.is_recoverable() => {
                warn!(%pos, ?biome, error = %err, "zone generation fell short, using grassland");
                let mut zone = self.blank_zone(pos, biome, seed)?;
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                terrain::grassland(&mut zone, &ctx, &mut rng)?;
                zone.fell_back = true;
                Ok(zone)
            }
            Err(err) => Err(err),
        }
    }

    fn blank_zone(&self, pos: GridPos, biome: Biome, seed: u64) -> GenResult<Zone> {
        let background = blend_background(self.world, &self.tables.biomes, pos, &self.config.zone)?;
        Zone::new(pos, biome, seed, background, &self.tables.tiles, self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileKind;
    use crate::world::generate_world;

    struct Fixture {
        config: GeneratorConfig,
        tables: ValidatedTables,
        registry: TileVariantRegistry,
        world: WorldData,
    }

    fn fixture(zone_size: usize) -> Fixture {
        let mut config = GeneratorConfig::default();
        config.world.width = 48;
        config.world.height = 32;
        config.world.seed = 2024;
        config.world.city_count = 3;
        config.zone.size = zone_size;
        let tables = config.validate().unwrap();
        let registry = TileVariantRegistry::new();
        let world = generate_world(&config, &tables, &registry).unwrap();
        Fixture {
            config,
            tables,
            registry,
            world,
        }
    }

    /// Fixture with the world cell at `pos` forced to `biome`
    fn fixture_at(zone_size: usize, pos: GridPos, biome: Biome) -> Fixture {
        let mut f = fixture(zone_size);
        f.world.biomes.set_at(pos, biome).unwrap();
        f
    }

    #[test]
    fn test_every_biome_but_woodland_has_a_strategy() {
        for biome in Biome::ALL {
            assert_eq!(strategy_for(biome).is_ok(), !biome.is_transient(), "{:?}", biome);
        }
    }

    #[test]
    fn test_zone_generation_is_deterministic() {
        let pos = GridPos::new(10, 10);
        let f = fixture_at(32, pos, Biome::Grassland);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        assert_eq!(generator.generate(pos).unwrap(), generator.generate(pos).unwrap());
    }

    #[test]
    fn test_settlement_zone_has_walls_and_gates() {
        let city = GridPos::new(20, 12);
        let f = fixture_at(64, city, Biome::Settlement);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        let zone = generator.generate(city).unwrap();
        assert!(!zone.fell_back);
        assert!(zone.count(TileKind::Wall) > 0);
        assert_eq!(zone.count(TileKind::Gate), 4);
        assert!(zone.count(TileKind::Door) >= 1);
    }

    #[test]
    fn test_small_settlement_zone_falls_back_to_grassland() {
        let city = GridPos::new(20, 12);
        let f = fixture_at(16, city, Biome::Settlement);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        let zone = generator.generate(city).unwrap();
        assert!(zone.fell_back);
        assert_eq!(zone.biome, Biome::Settlement);
        assert_eq!(zone.count(TileKind::Wall), 0);
        let ground = [TileKind::Grass, TileKind::TallGrass, TileKind::Flower, TileKind::Shrub];
        assert_eq!(ground.iter().map(|&k| zone.count(k)).sum::<usize>(), 16 * 16);
    }

    #[test]
    fn test_bridge_zone_is_unimplemented() {
        let f = fixture(32);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        let ctx = ZoneContext {
            world: &f.world,
            config: &f.config,
            catalog: &f.tables.tiles,
            registry: &f.registry,
        };
        let mut zone = generator.blank_zone(GridPos::new(0, 0), Biome::Bridge, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(bridge(&mut zone, &ctx, &mut rng), Err(GenError::Unimplemented(_))));
    }

    #[test]
    fn test_out_of_world_zone_is_bounds_error() {
        let f = fixture(32);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        assert!(matches!(generator.generate(GridPos::new(48, 0)), Err(GenError::Bounds { .. })));
    }

    #[test]
    fn test_bridge_cell_zone_propagates_unimplemented() {
        let pos = GridPos::new(5, 5);
        let f = fixture_at(32, pos, Biome::Bridge);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        assert!(matches!(generator.generate(pos), Err(GenError::Unimplemented(Biome::Bridge))));
    }

    #[test]
    fn test_forest_cell_dispatches_to_forest() {
        let pos = GridPos::new(6, 6);
        let f = fixture_at(32, pos, Biome::Forest);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        let zone = generator.generate(pos).unwrap();
        assert_eq!(zone.biome, Biome::Forest);
        assert!(zone.count(TileKind::Tree) > 0);
        assert_eq!(zone.count(TileKind::TallGrass), 0);
    }

    #[test]
    fn test_road_zone_stamps_junction_template() {
        let mut f = fixture(32);
        let pos = GridPos::new(10, 10);
        f.world.roads.points = [GridPos::new(9, 10), pos, GridPos::new(11, 10)].into_iter().collect();
        f.world.biomes.set_at(pos, Biome::Road).unwrap();
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        let zone = generator.generate(pos).unwrap();

        assert_eq!(zone.biome, Biome::Road);
        assert!(zone.count(TileKind::Road) >= 32 * 4);
        for x in [0, 16, 31] {
            assert_eq!(zone.kind_at(GridPos::new(x, 16)).unwrap(), TileKind::Road);
        }
        assert_ne!(zone.kind_at(GridPos::new(16, 0)).unwrap(), TileKind::Road);
    }

    #[test]
    fn test_neighboring_zones_share_seam_colors() {
        let f = fixture(32);
        let generator = ZoneGenerator::new(&f.world, &f.config, &f.tables, &f.registry);
        let west = generator.blank_zone(GridPos::new(20, 12), Biome::Grassland, 1).unwrap();
        let east = generator.blank_zone(GridPos::new(21, 12), Biome::Grassland, 1).unwrap();
        let edge = f.config.zone.edge_width as i32;
        for y in edge..32 - edge {
            assert_eq!(
                west.background_at(GridPos::new(31, y)).unwrap(),
                east.background_at(GridPos::new(0, y)).unwrap()
            );
        }
    }
}
