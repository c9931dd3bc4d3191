//! Road network construction between cities.
//!
//! Construction is staged, and each stage relies on the previous one:
//!
//! 1. connect every city to its nearest already-connected city with A*
//! 2. route every stray component to the largest one
//! 3. strip dead ends
//! 4. drop every road tile whose removal keeps all cities connected
//!
//! The A* step cost blends terrain cost with several shaping terms (turns,
//! road reuse, local road density, proximity to existing roads, border
//! distance, per-cell jitter). Rivers are crossed by straight bridges along
//! the dominant axis toward the target when one fits, otherwise by an
//! expensive ford.

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GenError, GenResult};
use crate::terrain_cost::TerrainCostField;
use crate::tilemap::{GridPos, Tilemap, CARDINALS};

use super::pathing::{find_path, RoutedPath, Step};

/// Cost shaping for road routing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadParams {
    /// Added when the route changes direction
    pub turn_penalty: f32,
    /// Multiplier for stepping onto an existing road
    pub reuse_factor: f32,
    /// Added for stepping off a road onto open terrain
    pub leave_road_penalty: f32,
    /// Radius of the road-density window
    pub density_radius: i32,
    /// Discount per road tile inside the density window
    pub density_discount: f32,
    /// Cap on the total density discount
    pub max_density_discount: f32,
    /// Distance over which nearby roads make a cell cheaper
    pub proximity_range: i32,
    /// Discount right next to a road, fading to zero at `proximity_range`
    pub proximity_bonus: f32,
    /// Cells closer than this to the grid edge are penalized
    pub border_margin: i32,
    /// Added per cell of intrusion into the border margin
    pub border_penalty: f32,
    /// Relative amplitude of the per-cell cost jitter
    pub jitter: f32,
    /// Longest straight bridge the router will build
    pub max_bridge_length: i32,
    /// Cost per bridge tile
    pub bridge_cost: f32,
    /// Added for entering water where no bridge fits
    pub unbridged_river_penalty: f32,
    /// Search budget is `width * height * iteration_factor`
    pub iteration_factor: usize,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            turn_penalty: 0.4,
            reuse_factor: 0.35,
            leave_road_penalty: 1.5,
            density_radius: 3,
            density_discount: 0.04,
            max_density_discount: 0.4,
            proximity_range: 6,
            proximity_bonus: 0.3,
            border_margin: 4,
            border_penalty: 2.0,
            jitter: 0.1,
            max_bridge_length: 6,
            bridge_cost: 3.0,
            unbridged_river_penalty: 40.0,
            iteration_factor: 10,
        }
    }
}

/// Which cardinal neighbors of a road tile are also road
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoadJunction {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl RoadJunction {
    pub fn count(&self) -> usize {
        [self.north, self.east, self.south, self.west]
            .iter()
            .filter(|&&b| b)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Box-drawing glyph for the world map
    pub fn glyph(&self) -> char {
        match (self.north, self.east, self.south, self.west) {
            (true, true, true, true) => '╬',
            (true, true, true, false) => '╠',
            (true, false, true, true) => '╣',
            (false, true, true, true) => '╦',
            (true, true, false, true) => '╩',
            (true, true, false, false) => '╚',
            (true, false, false, true) => '╝',
            (false, true, true, false) => '╔',
            (false, false, true, true) => '╗',
            (true, false, true, false) | (true, false, false, false) | (false, false, true, false) => '║',
            (false, true, false, true) | (false, true, false, false) | (false, false, false, true) => '═',
            (false, false, false, false) => '·',
        }
    }
}

/// A pruned road graph. `points` always includes every city.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoadNetwork {
    pub points: BTreeSet<GridPos>,
    pub cities: BTreeSet<GridPos>,
    /// Road tiles that sit on water
    pub bridges: BTreeSet<GridPos>,
}

impl RoadNetwork {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.points.contains(&pos)
    }

    pub fn is_city(&self, pos: GridPos) -> bool {
        self.cities.contains(&pos)
    }

    pub fn is_bridge(&self, pos: GridPos) -> bool {
        self.bridges.contains(&pos)
    }

    /// Road tiles that are not cities
    pub fn road_tiles(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.points.iter().copied().filter(|p| !self.cities.contains(p))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Every city reachable from every other through road/city tiles
    pub fn is_connected(&self) -> bool {
        cities_connected(&self.points, &self.cities)
    }

    /// Non-city tiles with fewer than two road neighbors
    pub fn dead_ends(&self) -> Vec<GridPos> {
        self.road_tiles()
            .filter(|&p| neighbor_count(&self.points, p) < 2)
            .collect()
    }

    pub fn junction(&self, pos: GridPos) -> RoadJunction {
        RoadJunction {
            north: self.contains(pos.offset(0, -1)),
            east: self.contains(pos.offset(1, 0)),
            south: self.contains(pos.offset(0, 1)),
            west: self.contains(pos.offset(-1, 0)),
        }
    }
}

fn neighbor_count(points: &BTreeSet<GridPos>, pos: GridPos) -> usize {
    CARDINALS
        .iter()
        .filter(|&&(dx, dy)| points.contains(&pos.offset(dx, dy)))
        .count()
}

/// Tiles reachable from `start` through `points`, 4-connected.
fn flood(points: &BTreeSet<GridPos>, start: GridPos) -> BTreeSet<GridPos> {
    let mut seen = BTreeSet::new();
    if !points.contains(&start) {
        return seen;
    }

    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(pos) = queue.pop_front() {
        for &(dx, dy) in &CARDINALS {
            let n = pos.offset(dx, dy);
            if points.contains(&n) && seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen
}

/// Whether one BFS from any city reaches all of them.
pub fn cities_connected(points: &BTreeSet<GridPos>, cities: &BTreeSet<GridPos>) -> bool {
    let Some(&first) = cities.iter().next() else {
        return true;
    };
    let reached = flood(points, first);
    cities.iter().all(|c| reached.contains(c))
}

/// Connected components, discovered in row-major order.
pub fn components(points: &BTreeSet<GridPos>) -> Vec<BTreeSet<GridPos>> {
    let mut assigned = BTreeSet::new();
    let mut result = Vec::new();
    for &p in points {
        if assigned.contains(&p) {
            continue;
        }
        let component = flood(points, p);
        assigned.extend(component.iter().copied());
        result.push(component);
    }
    result
}

/// Builds a pruned, fully connected road network over a set of cities.
#[derive(Clone, Debug, Default)]
pub struct RoadNetworkBuilder {
    params: RoadParams,
}

impl RoadNetworkBuilder {
    pub fn new(params: RoadParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RoadParams {
        &self.params
    }

    /// Connect `cities` over `costs`. `water` marks river cells.
    ///
    /// Cities outside the cost field are a [`GenError::Bounds`].
    pub fn build(
        &self,
        cities: &[GridPos],
        costs: &TerrainCostField,
        water: &Tilemap<bool>,
        rng: &mut ChaCha8Rng,
    ) -> GenResult<RoadNetwork> {
        for &city in cities {
            if !costs.contains(city) {
                return Err(GenError::Bounds {
                    x: city.x,
                    y: city.y,
                    width: costs.width(),
                    height: costs.height(),
                });
            }
        }

        let city_set: BTreeSet<GridPos> = cities.iter().copied().collect();
        if city_set.len() <= 1 {
            return Ok(RoadNetwork {
                points: city_set.clone(),
                cities: city_set,
                bridges: BTreeSet::new(),
            });
        }

        let mut state = RoadState::new(&self.params, costs, water, city_set, rng)?;

        state.connect_cities(rng)?;
        state.repair_components()?;
        state.prune_dead_ends();
        state.prune_redundant();

        let network = state.finish();
        info!(
            cities = network.cities.len(),
            tiles = network.points.len(),
            bridges = network.bridges.len(),
            "road network built"
        );
        Ok(network)
    }
}

/// Working state while the network is under construction
struct RoadState<'a> {
    params: &'a RoadParams,
    costs: &'a TerrainCostField,
    water: &'a Tilemap<bool>,
    jitter: Tilemap<f32>,
    points: BTreeSet<GridPos>,
    cities: BTreeSet<GridPos>,
    /// Road tiles inside each cell's density window
    density: Tilemap<u16>,
    /// BFS distance to the nearest road tile
    proximity: Tilemap<i32>,
    heuristic_scale: f32,
}

impl<'a> RoadState<'a> {
    fn new(
        params: &'a RoadParams,
        costs: &'a TerrainCostField,
        water: &'a Tilemap<bool>,
        cities: BTreeSet<GridPos>,
        rng: &mut ChaCha8Rng,
    ) -> GenResult<Self> {
        let width = costs.width();
        let height = costs.height();
        if water.width() != width || water.height() != height {
            return Err(GenError::Configuration(format!(
                "water mask is {}x{} but cost field is {}x{}",
                water.width(),
                water.height(),
                width,
                height
            )));
        }

        let amplitude = params.jitter.clamp(0.0, 0.9);
        let mut jitter = Tilemap::new_with(width, height, 1.0f32);
        if amplitude > 0.0 {
            for (_, value) in jitter.iter_mut() {
                *value = rng.gen_range((1.0 - amplitude)..=(1.0 + amplitude));
            }
        }

        let heuristic_scale = (costs.min_cost() * params.reuse_factor * (1.0 - amplitude)).max(0.0);

        let mut state = Self {
            params,
            costs,
            water,
            jitter,
            points: cities.clone(),
            cities,
            density: Tilemap::new(width, height),
            proximity: Tilemap::new(width, height),
            heuristic_scale,
        };
        state.refresh_fields()?;
        Ok(state)
    }

    fn width(&self) -> usize {
        self.costs.width()
    }

    fn height(&self) -> usize {
        self.costs.height()
    }

    fn is_water(&self, pos: GridPos) -> bool {
        self.water.get_at(pos).copied().unwrap_or(false)
    }

    /// Recompute density and proximity after the road set changed.
    fn refresh_fields(&mut self) -> GenResult<()> {
        let width = self.width() as i32;
        let height = self.height() as i32;

        // Density: box sum over a summed-area table of road tiles
        let w1 = width as usize + 1;
        let mut table = vec![0u32; w1 * (height as usize + 1)];
        for y in 0..height {
            for x in 0..width {
                let here = self.points.contains(&GridPos::new(x, y)) as u32;
                let (ux, uy) = (x as usize, y as usize);
                table[(uy + 1) * w1 + ux + 1] =
                    here + table[uy * w1 + ux + 1] + table[(uy + 1) * w1 + ux] - table[uy * w1 + ux];
            }
        }
        let r = self.params.density_radius.max(0);
        for y in 0..height {
            for x in 0..width {
                let x0 = (x - r).max(0) as usize;
                let y0 = (y - r).max(0) as usize;
                let x1 = ((x + r).min(width - 1) + 1) as usize;
                let y1 = ((y + r).min(height - 1) + 1) as usize;
                let sum = table[y1 * w1 + x1] + table[y0 * w1 + x0] - table[y0 * w1 + x1] - table[y1 * w1 + x0];
                self.density.set(x, y, sum.min(u16::MAX as u32) as u16)?;
            }
        }

        // Proximity: multi-source BFS from every road tile
        self.proximity.fill(i32::MAX);
        let mut queue = VecDeque::new();
        for &p in &self.points {
            self.proximity.set_at(p, 0)?;
            queue.push_back(p);
        }
        while let Some(pos) = queue.pop_front() {
            let d = *self.proximity.get_at(pos)?;
            for n in self.proximity.neighbors(pos, false) {
                if *self.proximity.get_at(n)? == i32::MAX {
                    self.proximity.set_at(n, d + 1)?;
                    queue.push_back(n);
                }
            }
        }

        Ok(())
    }

    /// Cost of moving onto `to` from `from`, arriving from `parent`.
    fn tile_cost(&self, from: GridPos, to: GridPos, parent: Option<GridPos>) -> f32 {
        let p = self.params;
        let (Ok(&terrain), Ok(&jitter)) = (self.costs.grid().get_at(to), self.jitter.get_at(to)) else {
            return f32::INFINITY;
        };

        let mut cost = terrain * jitter;

        if self.points.contains(&to) {
            cost *= p.reuse_factor;
        } else if self.points.contains(&from) {
            cost += p.leave_road_penalty;
        }

        let density = self.density.get_at(to).copied().unwrap_or(0) as f32;
        cost *= 1.0 - (density * p.density_discount).min(p.max_density_discount);

        let distance = self.proximity.get_at(to).copied().unwrap_or(i32::MAX);
        if p.proximity_range > 0 && distance < p.proximity_range {
            let closeness = 1.0 - distance as f32 / p.proximity_range as f32;
            cost *= 1.0 - p.proximity_bonus * closeness;
        }

        let border = self.proximity.border_distance(to);
        if border < p.border_margin {
            cost += (p.border_margin - border) as f32 * p.border_penalty;
        }

        if let Some(parent) = parent {
            if direction(parent, from) != direction(from, to) {
                cost += p.turn_penalty;
            }
        }

        cost
    }

    /// Straight bridge from `from` along `dir`: landing tile and the water span.
    fn scan_bridge(&self, from: GridPos, dir: (i32, i32)) -> Option<(GridPos, Vec<GridPos>)> {
        let mut span = Vec::new();
        for k in 1..=self.params.max_bridge_length + 1 {
            let p = from.offset(dir.0 * k, dir.1 * k);
            if !self.costs.contains(p) {
                return None;
            }
            if self.is_water(p) {
                span.push(p);
            } else {
                return if span.is_empty() { None } else { Some((p, span)) };
            }
        }
        None
    }

    fn successors(&self, pos: GridPos, parent: Option<GridPos>, target: GridPos) -> Vec<Step> {
        let axis = dominant_axis(pos, target);
        let mut steps = Vec::with_capacity(4);

        for &(dx, dy) in &CARDINALS {
            let n = pos.offset(dx, dy);
            if !self.costs.contains(n) {
                continue;
            }

            if self.is_water(n) && !self.points.contains(&n) {
                if axis == Some((dx, dy)) {
                    if let Some((landing, span)) = self.scan_bridge(pos, (dx, dy)) {
                        let cost = span.len() as f32 * self.params.bridge_cost
                            + self.tile_cost(pos, landing, parent);
                        steps.push(Step::with_via(landing, cost, span));
                        continue;
                    }
                }
                let cost = self.tile_cost(pos, n, parent) + self.params.unbridged_river_penalty;
                steps.push(Step::new(n, cost));
                continue;
            }

            steps.push(Step::new(n, self.tile_cost(pos, n, parent)));
        }

        steps
    }

    fn route(&self, from: GridPos, to: GridPos) -> RoutedPath {
        let max_iterations = self.width() * self.height() * self.params.iteration_factor.max(1);
        let scale = self.heuristic_scale;
        let path = find_path(
            from,
            to,
            max_iterations,
            |pos, parent| self.successors(pos, parent, to),
            |pos| pos.manhattan(to) as f32 * scale,
        );
        if !path.complete {
            warn!(%from, %to, reached = ?path.end(), "road route incomplete");
        }
        path
    }

    fn insert_path(&mut self, path: &RoutedPath) -> GenResult<()> {
        self.points.extend(path.tiles.iter().copied());
        self.refresh_fields()
    }

    /// Stage 1: grow the connected set one random city at a time.
    fn connect_cities(&mut self, rng: &mut ChaCha8Rng) -> GenResult<()> {
        let mut unconnected: Vec<GridPos> = self.cities.iter().copied().collect();
        let seed_index = rng.gen_range(0..unconnected.len());
        let mut connected = vec![unconnected.swap_remove(seed_index)];

        while !unconnected.is_empty() {
            let city = unconnected.swap_remove(rng.gen_range(0..unconnected.len()));
            let nearest = connected
                .iter()
                .copied()
                .min_by_key(|c| (c.distance_sq(city), *c))
                .unwrap_or(city);

            let path = self.route(city, nearest);
            debug!(%city, %nearest, length = path.tiles.len(), "connected city");
            self.insert_path(&path)?;
            connected.push(city);
        }
        Ok(())
    }

    /// Stage 2: route every smaller component to the largest one.
    fn repair_components(&mut self) -> GenResult<()> {
        // Each pass joins at least one component when routes complete;
        // the bound only matters if they keep falling short.
        let max_passes = self.points.len();
        for _ in 0..max_passes {
            let mut comps = components(&self.points);
            if comps.len() <= 1 {
                return Ok(());
            }

            let largest_index = comps
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let largest = comps.swap_remove(largest_index);
            debug!(components = comps.len() + 1, "repairing road components");

            for comp in &comps {
                if let Some((a, b)) = closest_pair(comp, &largest) {
                    let path = self.route(a, b);
                    self.insert_path(&path)?;
                }
            }
        }

        if components(&self.points).len() > 1 {
            warn!("road components remain disconnected after repair");
        }
        Ok(())
    }

    /// Stage 3: peel dead ends until none remain.
    fn prune_dead_ends(&mut self) {
        let max_iterations = self.width() * self.height();
        for _ in 0..max_iterations {
            let dead: Vec<GridPos> = self
                .points
                .iter()
                .copied()
                .filter(|p| !self.cities.contains(p) && neighbor_count(&self.points, *p) < 2)
                .collect();
            if dead.is_empty() {
                break;
            }
            for p in dead {
                self.points.remove(&p);
            }
        }
    }

    /// Stage 4: tentatively remove each road tile and keep the removal when
    /// the cities stay connected.
    fn prune_redundant(&mut self) {
        let queue: Vec<GridPos> = self
            .points
            .iter()
            .copied()
            .filter(|p| !self.cities.contains(p))
            .collect();

        let mut removed = 0usize;
        for p in queue {
            self.points.remove(&p);
            if cities_connected(&self.points, &self.cities) {
                removed += 1;
            } else {
                self.points.insert(p);
            }
        }
        debug!(removed, "pruned redundant road tiles");
    }

    fn finish(self) -> RoadNetwork {
        let bridges = self
            .points
            .iter()
            .copied()
            .filter(|&p| self.is_water(p))
            .collect();
        RoadNetwork {
            points: self.points,
            cities: self.cities,
            bridges,
        }
    }
}

/// Unit direction from `a` to `b`
fn direction(a: GridPos, b: GridPos) -> (i32, i32) {
    ((b.x - a.x).signum(), (b.y - a.y).signum())
}

/// Unit step along the longer axis toward `target`
fn dominant_axis(from: GridPos, target: GridPos) -> Option<(i32, i32)> {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    if dx == 0 && dy == 0 {
        None
    } else if dx.abs() >= dy.abs() {
        Some((dx.signum(), 0))
    } else {
        Some((0, dy.signum()))
    }
}

/// Closest (a, b) with a in `from` and b in `to`; ties by position.
fn closest_pair(from: &BTreeSet<GridPos>, to: &BTreeSet<GridPos>) -> Option<(GridPos, GridPos)> {
    from.iter()
        .flat_map(|&a| to.iter().map(move |&b| (a, b)))
        .min_by_key(|&(a, b)| (a.distance_sq(b), a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn build(cities: &[GridPos], costs: &TerrainCostField, water: &Tilemap<bool>, seed: u64) -> RoadNetwork {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        RoadNetworkBuilder::default()
            .build(cities, costs, water, &mut rng)
            .unwrap()
    }

    fn dry(width: usize, height: usize) -> Tilemap<bool> {
        Tilemap::new_with(width, height, false)
    }

    fn four_cities() -> Vec<GridPos> {
        vec![
            GridPos::new(8, 10),
            GridPos::new(40, 7),
            GridPos::new(12, 42),
            GridPos::new(38, 36),
        ]
    }

    #[test]
    fn test_four_cities_on_flat_grid_are_connected() {
        let costs = TerrainCostField::flat(50, 50, 1.0);
        let network = build(&four_cities(), &costs, &dry(50, 50), 7);

        assert!(network.is_connected());
        for city in four_cities() {
            assert!(network.contains(city));
        }
        // No isolated fragments: everything is one component
        assert_eq!(components(&network.points).len(), 1);
    }

    #[test]
    fn test_no_dead_ends_after_pruning() {
        let costs = TerrainCostField::flat(50, 50, 1.0);
        let network = build(&four_cities(), &costs, &dry(50, 50), 11);
        assert!(network.dead_ends().is_empty());
    }

    #[test]
    fn test_every_kept_road_tile_is_essential() {
        let costs = TerrainCostField::flat(50, 50, 1.0);
        let network = build(&four_cities(), &costs, &dry(50, 50), 3);

        for tile in network.road_tiles().collect::<Vec<_>>() {
            let mut without = network.points.clone();
            without.remove(&tile);
            assert!(
                !cities_connected(&without, &network.cities),
                "tile {} could be removed without disconnecting cities",
                tile
            );
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let costs = TerrainCostField::flat(50, 50, 1.0);
        let a = build(&four_cities(), &costs, &dry(50, 50), 1337);
        let b = build(&four_cities(), &costs, &dry(50, 50), 1337);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_and_one_city() {
        let costs = TerrainCostField::flat(10, 10, 1.0);
        let none = build(&[], &costs, &dry(10, 10), 1);
        assert!(none.is_empty());

        let city = GridPos::new(4, 4);
        let one = build(&[city], &costs, &dry(10, 10), 1);
        assert_eq!(one.points, BTreeSet::from([city]));
        assert!(one.is_connected());
    }

    #[test]
    fn test_adjacent_cities_need_no_road() {
        let costs = TerrainCostField::flat(10, 10, 1.0);
        let cities = [GridPos::new(4, 4), GridPos::new(5, 4)];
        let network = build(&cities, &costs, &dry(10, 10), 5);
        assert_eq!(network.points.len(), 2);
        assert_eq!(network.road_tiles().count(), 0);
    }

    #[test]
    fn test_city_out_of_bounds_is_error() {
        let costs = TerrainCostField::flat(10, 10, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = RoadNetworkBuilder::default().build(
            &[GridPos::new(1, 1), GridPos::new(10, 3)],
            &costs,
            &dry(10, 10),
            &mut rng,
        );
        assert!(matches!(result, Err(GenError::Bounds { x: 10, y: 3, .. })));
    }

    #[test]
    fn test_river_is_crossed_by_bridge() {
        let costs = TerrainCostField::flat(50, 50, 1.0);
        let mut water = dry(50, 50);
        for y in 0..50 {
            water.set(25, y, true).unwrap();
        }
        let cities = [GridPos::new(10, 25), GridPos::new(40, 25)];
        let network = build(&cities, &costs, &water, 21);

        assert!(network.is_connected());
        assert!(!network.bridges.is_empty());
        for bridge in &network.bridges {
            assert_eq!(bridge.x, 25);
            assert!(network.contains(*bridge));
        }
    }

    #[test]
    fn test_wide_river_still_connects() {
        // Wider than the longest bridge: the route has to ford
        let costs = TerrainCostField::flat(40, 20, 1.0);
        let mut water = dry(40, 20);
        for y in 0..20 {
            for x in 12..24 {
                water.set(x, y, true).unwrap();
            }
        }
        let cities = [GridPos::new(5, 10), GridPos::new(32, 10)];
        let network = build(&cities, &costs, &water, 2);
        assert!(network.is_connected());
        assert!(network.bridges.len() >= 12);
    }

    #[test]
    fn test_many_cities_with_terrain() {
        let mut elevation = Tilemap::new_with(40, 40, 0.2f32);
        for y in 10..30 {
            elevation.set(20, y, 0.95).unwrap();
        }
        let biomes = Tilemap::new_with(40, 40, crate::biomes::Biome::Grassland);
        let costs = TerrainCostField::from_elevation(&elevation, &biomes).unwrap();
        let cities: Vec<GridPos> = (0..7)
            .map(|i| GridPos::new(5 + (i * 5) % 30, 5 + (i * 11) % 30))
            .collect();
        let network = build(&cities, &costs, &dry(40, 40), 99);
        assert!(network.is_connected());
        assert!(network.dead_ends().is_empty());
    }

    #[test]
    fn test_junction_glyphs() {
        let mut network = RoadNetwork::empty();
        for p in [(5, 4), (4, 5), (5, 5), (6, 5), (5, 6)] {
            network.points.insert(GridPos::from(p));
        }
        let center = network.junction(GridPos::new(5, 5));
        assert_eq!(center.count(), 4);
        assert_eq!(center.glyph(), '╬');
        assert_eq!(network.junction(GridPos::new(5, 4)).glyph(), '║');
        assert_eq!(network.junction(GridPos::new(4, 5)).glyph(), '═');
        assert_eq!(RoadJunction::default().glyph(), '·');
    }

    #[test]
    fn test_components_and_closest_pair() {
        let points: BTreeSet<GridPos> = [(0, 0), (1, 0), (5, 5), (5, 6)]
            .into_iter()
            .map(GridPos::from)
            .collect();
        let comps = components(&points);
        assert_eq!(comps.len(), 2);
        let pair = closest_pair(&comps[0], &comps[1]).unwrap();
        assert_eq!(pair, (GridPos::new(1, 0), GridPos::new(5, 5)));
    }
}
