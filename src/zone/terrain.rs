//! Natural terrain strategies: grassland, forest, hills, mountains, river.

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::GenResult;
use crate::tilemap::GridPos;
use crate::tiles::TileKind;

use super::generation::ZoneContext;
use super::types::Zone;

/// Chance of a flower on open grass
const FLOWER_CHANCE: f64 = 0.03;
/// Chance of a shrub on open grass
const SHRUB_CHANCE: f64 = 0.02;
/// Zone cells per tall-grass cluster seed
const CELLS_PER_CLUSTER: usize = 350;
/// Chance a frontier cell joins its tall-grass cluster
const CLUSTER_GROW_CHANCE: f64 = 0.6;
const SMOOTHING_PASSES: usize = 2;

const TREE_CHANCE: f64 = 0.2;
const HILL_CHANCE: f64 = 0.06;
const HILL_ROCK_CHANCE: f64 = 0.03;
const MOUNTAIN_ROCK_CHANCE: f64 = 0.3;
const MOUNTAIN_PEAK_CHANCE: f64 = 0.08;
const WATER_CHANCE: f64 = 0.55;

/// Turn each `from` cell into `to` with probability `chance`.
fn scatter(
    zone: &mut Zone,
    ctx: &ZoneContext<'_>,
    rng: &mut ChaCha8Rng,
    from: TileKind,
    to: TileKind,
    chance: f64,
) -> GenResult<usize> {
    let mut placed = 0;
    let positions: Vec<GridPos> = zone.positions().collect();
    for pos in positions {
        if zone.kind_at(pos)? == from && rng.gen_bool(chance) {
            zone.place(pos, to, ctx.catalog, ctx.registry)?;
            placed += 1;
        }
    }
    Ok(placed)
}

/// Grass, decorative scatter, and clustered tall grass.
pub fn grassland(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    zone.fill(TileKind::Grass, ctx.catalog, ctx.registry)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Flower, FLOWER_CHANCE)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Shrub, SHRUB_CHANCE)?;
    grow_tall_grass(zone, ctx, rng)?;
    smooth_tall_grass(zone, ctx)?;
    Ok(())
}

/// Seed-and-grow clusters of tall grass over plain grass.
fn grow_tall_grass(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    let area = zone.width() * zone.height();
    let clusters = (area / CELLS_PER_CLUSTER).max(1);

    for _ in 0..clusters {
        let seed = GridPos::new(
            rng.gen_range(0..zone.width() as i32),
            rng.gen_range(0..zone.height() as i32),
        );
        if zone.kind_at(seed)? != TileKind::Grass {
            continue;
        }

        let target = rng.gen_range(12..=48);
        let mut grown = 1;
        let mut seen = BTreeSet::from([seed]);
        let mut frontier = VecDeque::from([seed]);
        zone.place(seed, TileKind::TallGrass, ctx.catalog, ctx.registry)?;

        while let Some(pos) = frontier.pop_front() {
            if grown >= target {
                break;
            }
            for n in zone.neighbors(pos, false) {
                if !seen.insert(n) || zone.kind_at(n)? != TileKind::Grass {
                    continue;
                }
                if rng.gen_bool(CLUSTER_GROW_CHANCE) {
                    zone.place(n, TileKind::TallGrass, ctx.catalog, ctx.registry)?;
                    frontier.push_back(n);
                    grown += 1;
                }
            }
        }
    }
    Ok(())
}

/// Cellular-automata smoothing: grass surrounded by tall grass fills in,
/// isolated tall grass dies back. Other tiles are left alone.
fn smooth_tall_grass(zone: &mut Zone, ctx: &ZoneContext<'_>) -> GenResult<()> {
    for _ in 0..SMOOTHING_PASSES {
        let mut changes = Vec::new();
        for pos in zone.positions() {
            let kind = zone.kind_at(pos)?;
            if kind != TileKind::Grass && kind != TileKind::TallGrass {
                continue;
            }
            let mut tall = 0;
            for n in zone.neighbors(pos, true) {
                if zone.kind_at(n)? == TileKind::TallGrass {
                    tall += 1;
                }
            }
            if kind == TileKind::Grass && tall >= 5 {
                changes.push((pos, TileKind::TallGrass));
            } else if kind == TileKind::TallGrass && tall <= 1 {
                changes.push((pos, TileKind::Grass));
            }
        }
        for (pos, kind) in changes {
            zone.place(pos, kind, ctx.catalog, ctx.registry)?;
        }
    }
    Ok(())
}

/// Grassland with the tall grass cleared and trees scattered.
pub fn forest(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    grassland(zone, ctx, rng)?;
    let positions: Vec<GridPos> = zone.positions().collect();
    for pos in positions {
        if zone.kind_at(pos)? == TileKind::TallGrass {
            zone.place(pos, TileKind::Grass, ctx.catalog, ctx.registry)?;
        }
    }
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Tree, TREE_CHANCE)?;
    Ok(())
}

/// Grassland with sparse hillocks and rocks.
pub fn hills(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    grassland(zone, ctx, rng)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Hill, HILL_CHANCE)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Rock, HILL_ROCK_CHANCE)?;
    Ok(())
}

/// Rock-strewn ground with impassable peaks.
pub fn mountains(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    zone.fill(TileKind::Grass, ctx.catalog, ctx.registry)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Rock, MOUNTAIN_ROCK_CHANCE)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Mountain, MOUNTAIN_PEAK_CHANCE)?;
    Ok(())
}

/// Water scattered over grass.
pub fn river(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    zone.fill(TileKind::Grass, ctx.catalog, ctx.registry)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Water, WATER_CHANCE)?;
    scatter(zone, ctx, rng, TileKind::Grass, TileKind::Flower, FLOWER_CHANCE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::biomes::Biome;
    use crate::config::{GeneratorConfig, ValidatedTables};
    use crate::tilemap::Tilemap;
    use crate::tiles::{Rgb, TileVariantRegistry};
    use crate::world::{generate_world, WorldData};

    const GROUND: [TileKind; 4] = [TileKind::Grass, TileKind::TallGrass, TileKind::Flower, TileKind::Shrub];

    struct Fixture {
        config: GeneratorConfig,
        tables: ValidatedTables,
        registry: TileVariantRegistry,
        world: WorldData,
    }

    impl Fixture {
        fn new() -> Self {
            let mut config = GeneratorConfig::default();
            config.world.width = 16;
            config.world.height = 12;
            config.world.city_count = 0;
            let tables = config.validate().unwrap();
            let registry = TileVariantRegistry::new();
            let world = generate_world(&config, &tables, &registry).unwrap();
            Self {
                config,
                tables,
                registry,
                world,
            }
        }

        fn ctx(&self) -> ZoneContext<'_> {
            ZoneContext {
                world: &self.world,
                config: &self.config,
                catalog: &self.tables.tiles,
                registry: &self.registry,
            }
        }

        fn zone(&self, size: usize) -> Zone {
            let background = Tilemap::new_with(size, size, Rgb(88, 136, 64));
            Zone::new(GridPos::new(0, 0), Biome::Grassland, 1, background, &self.tables.tiles, &self.registry).unwrap()
        }
    }

    fn count_of(zone: &Zone, kinds: &[TileKind]) -> usize {
        kinds.iter().map(|&k| zone.count(k)).sum()
    }

    fn place_all(zone: &mut Zone, ctx: &ZoneContext<'_>, cells: &[(i32, i32)]) {
        for &(x, y) in cells {
            zone.place(GridPos::new(x, y), TileKind::TallGrass, ctx.catalog, ctx.registry).unwrap();
        }
    }

    #[test]
    fn test_smoothing_fills_enclosed_grass_and_clears_strays() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(16);

        // Ring of eight around (10, 10)
        let ring: Vec<(i32, i32)> = (9..=11)
            .flat_map(|y| (9..=11).map(move |x| (x, y)))
            .filter(|&p| p != (10, 10))
            .collect();
        place_all(&mut zone, &ctx, &ring);
        // Stable 2x2 block, a lone cell and a pair
        place_all(&mut zone, &ctx, &[(2, 10), (3, 10), (2, 11), (3, 11)]);
        place_all(&mut zone, &ctx, &[(5, 5)]);
        place_all(&mut zone, &ctx, &[(12, 2), (13, 2)]);

        smooth_tall_grass(&mut zone, &ctx).unwrap();

        assert_eq!(zone.kind_at(GridPos::new(10, 10)).unwrap(), TileKind::TallGrass);
        assert_eq!(zone.kind_at(GridPos::new(2, 10)).unwrap(), TileKind::TallGrass);
        assert_eq!(zone.kind_at(GridPos::new(5, 5)).unwrap(), TileKind::Grass);
        assert_eq!(zone.kind_at(GridPos::new(12, 2)).unwrap(), TileKind::Grass);
        assert_eq!(zone.kind_at(GridPos::new(13, 2)).unwrap(), TileKind::Grass);
        assert_eq!(zone.count(TileKind::TallGrass), 9 + 4);
    }

    #[test]
    fn test_smoothing_leaves_other_tiles_alone() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(8);
        let ring: Vec<(i32, i32)> = (2..=4)
            .flat_map(|y| (2..=4).map(move |x| (x, y)))
            .filter(|&p| p != (3, 3))
            .collect();
        place_all(&mut zone, &ctx, &ring);
        zone.place(GridPos::new(3, 3), TileKind::Rock, ctx.catalog, ctx.registry).unwrap();

        smooth_tall_grass(&mut zone, &ctx).unwrap();
        assert_eq!(zone.kind_at(GridPos::new(3, 3)).unwrap(), TileKind::Rock);
    }

    #[test]
    fn test_tall_grass_grows_in_clusters() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(64);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        grow_tall_grass(&mut zone, &ctx, &mut rng).unwrap();

        let tall: Vec<GridPos> = zone.positions().filter(|&p| zone.kind_at(p).unwrap() == TileKind::TallGrass).collect();
        let clusters = 64 * 64 / CELLS_PER_CLUSTER;
        assert!(tall.len() > 12);
        assert!(tall.len() <= clusters * 48);

        let lonely = tall
            .iter()
            .filter(|&&p| zone.neighbors(p, false).iter().all(|&n| zone.kind_at(n).unwrap() != TileKind::TallGrass))
            .count();
        assert!(lonely * 10 <= tall.len(), "{} of {} tall grass cells are isolated", lonely, tall.len());
    }

    #[test]
    fn test_grassland_is_only_ground_cover() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(64);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        grassland(&mut zone, &ctx, &mut rng).unwrap();

        assert_eq!(count_of(&zone, &GROUND), 64 * 64);
        assert!(zone.count(TileKind::Flower) > 0);
        assert!(zone.count(TileKind::TallGrass) > 0);
    }

    #[test]
    fn test_grassland_is_deterministic() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut a = f.zone(32);
        let mut b = f.zone(32);
        grassland(&mut a, &ctx, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        grassland(&mut b, &ctx, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forest_has_trees_and_no_tall_grass() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(32);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        forest(&mut zone, &ctx, &mut rng).unwrap();

        assert!(zone.count(TileKind::Tree) > 0);
        assert_eq!(zone.count(TileKind::TallGrass), 0);
        let tree = zone.positions().find(|&p| zone.kind_at(p).unwrap() == TileKind::Tree).unwrap();
        assert!(!zone.info_at(tree).unwrap().walkable());
    }

    #[test]
    fn test_hills_add_hillocks_and_rocks() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(32);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        hills(&mut zone, &ctx, &mut rng).unwrap();

        assert!(zone.count(TileKind::Hill) > 0);
        assert!(zone.count(TileKind::Rock) > 0);
        assert_eq!(count_of(&zone, &GROUND) + count_of(&zone, &[TileKind::Hill, TileKind::Rock]), 32 * 32);
    }

    #[test]
    fn test_mountains_are_rock_and_peaks() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(32);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        mountains(&mut zone, &ctx, &mut rng).unwrap();

        assert!(zone.count(TileKind::Rock) > zone.count(TileKind::Mountain));
        assert!(zone.count(TileKind::Mountain) > 0);
        assert_eq!(count_of(&zone, &[TileKind::Grass, TileKind::Rock, TileKind::Mountain]), 32 * 32);
        let peak = zone.positions().find(|&p| zone.kind_at(p).unwrap() == TileKind::Mountain).unwrap();
        assert!(!zone.info_at(peak).unwrap().walkable());
    }

    #[test]
    fn test_river_is_mostly_water() {
        let f = Fixture::new();
        let ctx = f.ctx();
        let mut zone = f.zone(32);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        river(&mut zone, &ctx, &mut rng).unwrap();

        let water = zone.count(TileKind::Water);
        assert!(water > 32 * 32 * 2 / 5 && water < 32 * 32 * 7 / 10, "water {}", water);
        assert_eq!(count_of(&zone, &[TileKind::Grass, TileKind::Water, TileKind::Flower]), 32 * 32);
    }
}
