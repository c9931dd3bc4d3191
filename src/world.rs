//! World map generation
//!
//! Runs the world pipeline end to end and bundles the results:
//! elevation noise, biome classification, woodland resolution, a river,
//! city placement, the terrain cost field, the road network, the
//! infrastructure stamp, per-cell tile info and the world tile grid.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::biomes::{Biome, BiomeTable};
use crate::config::{GeneratorConfig, ValidatedTables, WorldConfig};
use crate::error::GenResult;
use crate::network::{RiverNetwork, RiverNetworkBuilder, RoadJunction, RoadNetwork, RoadNetworkBuilder};
use crate::noise_map::generate_noise_map;
use crate::seeds::WorldSeeds;
use crate::terrain_cost::TerrainCostField;
use crate::tilemap::{GridPos, Tilemap};
use crate::tiles::{TileAppearance, TileCatalog, TileVariantRegistry, VariantHandle};

/// Cities keep at least this far from the map edge
const CITY_BORDER_MARGIN: i32 = 2;

/// Resources a world cell offers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceFlags {
    pub timber: bool,
    pub stone: bool,
    pub fresh_water: bool,
    pub fertile: bool,
}

impl ResourceFlags {
    pub fn for_biome(biome: Biome, near_water: bool) -> Self {
        Self {
            timber: matches!(biome, Biome::Forest),
            stone: matches!(biome, Biome::Hills | Biome::Mountains),
            fresh_water: biome.is_water() || near_water,
            fertile: matches!(biome, Biome::Grassland) || (near_water && matches!(biome, Biome::Forest)),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.timber || self.stone || self.fresh_water || self.fertile)
    }
}

/// Read-only facts about one world cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTileInfo {
    biome: Biome,
    resources: ResourceFlags,
    walkable: bool,
    weight: f32,
}

impl WorldTileInfo {
    pub fn new(biome: Biome, near_water: bool) -> Self {
        Self {
            biome,
            resources: ResourceFlags::for_biome(biome, near_water),
            walkable: biome.walkable(),
            weight: biome.base_weight(),
        }
    }

    pub fn biome(&self) -> Biome {
        self.biome
    }

    pub fn resources(&self) -> ResourceFlags {
        self.resources
    }

    pub fn walkable(&self) -> bool {
        self.walkable
    }

    /// Pathing weight for actors
    pub fn weight(&self) -> f32 {
        self.weight
    }
}

/// All generated world data bundled together
#[derive(Clone, Debug)]
pub struct WorldData {
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    pub width: usize,
    pub height: usize,
    /// Normalized elevation in [0, 1)
    pub elevation: Tilemap<f32>,
    /// Final biomes, infrastructure stamped in
    pub biomes: Tilemap<Biome>,
    pub rivers: RiverNetwork,
    pub roads: RoadNetwork,
    pub cities: Vec<GridPos>,
    pub costs: TerrainCostField,
    info: Tilemap<WorldTileInfo>,
    tiles: Tilemap<VariantHandle>,
}

impl WorldData {
    /// Convenience accessor for master seed
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.biomes.contains(pos)
    }

    pub fn tile_info(&self, pos: GridPos) -> GenResult<&WorldTileInfo> {
        self.info.get_at(pos)
    }

    pub fn biome_at(&self, pos: GridPos) -> GenResult<Biome> {
        self.biomes.get_at(pos).copied()
    }

    pub fn elevation_at(&self, pos: GridPos) -> GenResult<f32> {
        self.elevation.get_at(pos).copied()
    }

    /// Road connections of a cell (empty off the network)
    pub fn road_junction(&self, pos: GridPos) -> RoadJunction {
        if self.roads.contains(pos) {
            self.roads.junction(pos)
        } else {
            RoadJunction::default()
        }
    }

    pub fn get_tile(&self, x: i32, y: i32) -> GenResult<VariantHandle> {
        self.tiles.get(x, y).copied()
    }

    pub fn set_tile(&mut self, x: i32, y: i32, handle: VariantHandle) -> GenResult<()> {
        self.tiles.set(x, y, handle)
    }

    pub fn neighbors(&self, pos: GridPos, include_diagonals: bool) -> Vec<GridPos> {
        self.tiles.neighbors(pos, include_diagonals)
    }

    pub fn tiles(&self) -> &Tilemap<VariantHandle> {
        &self.tiles
    }
}

/// Generate the world map.
pub fn generate_world(
    config: &GeneratorConfig,
    tables: &ValidatedTables,
    registry: &TileVariantRegistry,
) -> GenResult<WorldData> {
    let world = &config.world;
    let seeds = WorldSeeds::from_master(world.seed);
    let (width, height) = (world.width, world.height);
    info!(width, height, seed = world.seed, "generating world");

    let elevation = Tilemap::from_vec(width, height, generate_noise_map(width, height, seeds.elevation, &world.noise))?;
    let mut biomes = classify_biomes(&elevation, &tables.biomes)?;

    let density = Tilemap::from_vec(
        width,
        height,
        generate_noise_map(width, height, seeds.woodland, &world.woodland_noise),
    )?;
    resolve_woodland(&mut biomes, &density, world.forest_density)?;
    debug!("biomes classified");

    let mut river_rng = ChaCha8Rng::seed_from_u64(seeds.rivers);
    let rivers = RiverNetworkBuilder::new(config.rivers.clone()).build(&elevation, &mut river_rng);
    for pos in rivers.cells() {
        biomes.set_at(pos, Biome::River)?;
    }

    let mut city_rng = ChaCha8Rng::seed_from_u64(seeds.cities);
    let cities = place_cities(&biomes, world, &mut city_rng);

    let costs = TerrainCostField::from_elevation(&elevation, &biomes)?;
    let water = biomes.map(|_, b| b.is_water());
    let mut road_rng = ChaCha8Rng::seed_from_u64(seeds.roads);
    let roads = RoadNetworkBuilder::new(config.roads.clone()).build(&cities, &costs, &water, &mut road_rng)?;

    stamp_infrastructure(&mut biomes, &roads)?;

    let info = build_tile_info(&biomes);
    let tiles = build_world_tiles(&biomes, &elevation, &roads, &tables.biomes, &tables.tiles, registry)?;

    info!(
        cities = cities.len(),
        river = rivers.len(),
        roads = roads.len(),
        variants = registry.len(),
        "world generated"
    );

    Ok(WorldData {
        seeds,
        width,
        height,
        elevation,
        biomes,
        rivers,
        roads,
        cities,
        costs,
        info,
        tiles,
    })
}

fn classify_biomes(elevation: &Tilemap<f32>, table: &BiomeTable) -> GenResult<Tilemap<Biome>> {
    let classified = elevation
        .as_slice()
        .iter()
        .map(|&e| table.classify(e))
        .collect::<GenResult<Vec<_>>>()?;
    Tilemap::from_vec(elevation.width(), elevation.height(), classified)
}

/// Replace every transient woodland cell with forest or grassland.
pub fn resolve_woodland(biomes: &mut Tilemap<Biome>, density: &Tilemap<f32>, threshold: f32) -> GenResult<()> {
    let mut forest = 0usize;
    let mut grass = 0usize;
    for (pos, biome) in biomes.iter_mut() {
        if *biome != Biome::Woodland {
            continue;
        }
        if *density.get_at(pos)? >= threshold {
            *biome = Biome::Forest;
            forest += 1;
        } else {
            *biome = Biome::Grassland;
            grass += 1;
        }
    }
    debug!(forest, grass, "resolved woodland");
    Ok(())
}

/// Random walkable, non-river cells at least `city_spacing` apart.
///
/// Falls short of `city_count` when the budget runs out; that is logged,
/// not an error.
pub fn place_cities(biomes: &Tilemap<Biome>, world: &WorldConfig, rng: &mut ChaCha8Rng) -> Vec<GridPos> {
    let candidates: Vec<GridPos> = biomes
        .iter()
        .filter(|(pos, b)| b.walkable() && !b.is_infrastructure() && biomes.border_distance(*pos) >= CITY_BORDER_MARGIN)
        .map(|(pos, _)| pos)
        .collect();

    let mut cities: Vec<GridPos> = Vec::new();
    if candidates.is_empty() {
        warn!("no cell can host a city");
        return cities;
    }

    let min_dist_sq = (world.city_spacing * world.city_spacing) as i64;
    for _ in 0..world.city_attempts {
        if cities.len() >= world.city_count {
            break;
        }
        let pos = candidates[rng.gen_range(0..candidates.len())];
        if cities.iter().all(|c| c.distance_sq(pos) >= min_dist_sq) {
            cities.push(pos);
        }
    }

    if cities.len() < world.city_count {
        warn!(placed = cities.len(), wanted = world.city_count, "city placement fell short");
    }
    cities
}

fn stamp_infrastructure(biomes: &mut Tilemap<Biome>, roads: &RoadNetwork) -> GenResult<()> {
    for pos in roads.points.iter().copied() {
        let biome = if roads.is_city(pos) {
            Biome::Settlement
        } else if roads.is_bridge(pos) {
            Biome::Bridge
        } else {
            Biome::Road
        };
        biomes.set_at(pos, biome)?;
    }
    Ok(())
}

fn build_tile_info(biomes: &Tilemap<Biome>) -> Tilemap<WorldTileInfo> {
    biomes.map(|pos, &biome| {
        let near_water = biomes
            .neighbors(pos, true)
            .into_iter()
            .any(|n| biomes.get_at(n).map(|b| b.is_water()).unwrap_or(false));
        WorldTileInfo::new(biome, near_water)
    })
}

fn build_world_tiles(
    biomes: &Tilemap<Biome>,
    elevation: &Tilemap<f32>,
    roads: &RoadNetwork,
    table: &BiomeTable,
    catalog: &TileCatalog,
    registry: &TileVariantRegistry,
) -> GenResult<Tilemap<VariantHandle>> {
    let mut tiles = Tilemap::new_with(biomes.width(), biomes.height(), VariantHandle(0));

    for (pos, &biome) in biomes.iter() {
        let bg = table.color(biome)?.shade(0.85 + *elevation.get_at(pos)? * 0.3);
        let mut appearance: TileAppearance = catalog.appearance(biome.world_tile()).with_bg(bg);
        if biome == Biome::Road {
            appearance.glyph = roads.junction(pos).glyph() as u32;
        }
        tiles.set_at(pos, registry.intern(&appearance))?;
    }

    Ok(tiles)
}
