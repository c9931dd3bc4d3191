//! River tracing: highland source, greedy descent toward a far border
//! outlet, and a terminal lake grown by bounded flood fill.

use std::collections::BTreeSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::GenResult;
use crate::tilemap::{GridPos, Tilemap, CARDINALS};

/// Parameters for river tracing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// Smallest accepted river + lake size
    pub min_length: usize,
    pub max_attempts: u32,
    /// Sources must be at least this high
    pub source_threshold: f32,
    /// How many of the farthest border cells compete as outlet
    pub outlet_candidates: usize,
    /// Weight of the normalized distance-to-outlet term
    pub distance_weight: f32,
    pub lake_min: usize,
    pub lake_max: usize,
    /// Only cells below this elevation can join the lake
    pub lake_elevation_threshold: f32,
    /// Chance that an eligible cell joins the lake
    pub lake_inclusion_chance: f64,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            min_length: 12,
            max_attempts: 10,
            source_threshold: 0.75,
            outlet_candidates: 5,
            distance_weight: 4.0,
            lake_min: 10,
            lake_max: 40,
            lake_elevation_threshold: 0.5,
            lake_inclusion_chance: 0.7,
        }
    }
}

/// A traced river. Empty when no attempt met the minimum length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RiverNetwork {
    pub source: Option<GridPos>,
    pub outlet: Option<GridPos>,
    /// Course from source to terminal point, in flow order
    pub course: Vec<GridPos>,
    pub lake: BTreeSet<GridPos>,
}

impl RiverNetwork {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Course and lake cells together
    pub fn cells(&self) -> BTreeSet<GridPos> {
        self.course.iter().copied().chain(self.lake.iter().copied()).collect()
    }

    pub fn len(&self) -> usize {
        self.cells().len()
    }

    pub fn is_empty(&self) -> bool {
        self.course.is_empty() && self.lake.is_empty()
    }

    /// Terminal point of the course (where the lake starts)
    pub fn mouth(&self) -> Option<GridPos> {
        self.course.last().copied()
    }

    /// Boolean mask of river cells for a grid of the given size
    pub fn mask(&self, width: usize, height: usize) -> GenResult<Tilemap<bool>> {
        let mut mask = Tilemap::new_with(width, height, false);
        for pos in self.cells() {
            mask.set_at(pos, true)?;
        }
        Ok(mask)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RiverNetworkBuilder {
    params: RiverParams,
}

impl RiverNetworkBuilder {
    pub fn new(params: RiverParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RiverParams {
        &self.params
    }

    /// Trace a river over `elevation`, retrying up to `max_attempts` times.
    ///
    /// A field with no cell above the source threshold, or no attempt long
    /// enough, yields an empty network rather than an error.
    pub fn build(&self, elevation: &Tilemap<f32>, rng: &mut ChaCha8Rng) -> RiverNetwork {
        let p = &self.params;

        let sources: Vec<GridPos> = elevation
            .iter()
            .filter(|(_, &e)| e >= p.source_threshold)
            .map(|(pos, _)| pos)
            .collect();
        if sources.is_empty() {
            warn!(threshold = p.source_threshold, "no highland cell for a river source");
            return RiverNetwork::empty();
        }

        for attempt in 0..p.max_attempts {
            let source = sources[rng.gen_range(0..sources.len())];
            let outlet = self.pick_outlet(elevation, source, rng);
            let course = self.trace(elevation, source, outlet);
            let lake = match course.last() {
                Some(&mouth) => self.grow_lake(elevation, mouth, &course, rng),
                None => BTreeSet::new(),
            };

            let network = RiverNetwork {
                source: Some(source),
                outlet: Some(outlet),
                course,
                lake,
            };
            let size = network.len();
            if size >= p.min_length {
                info!(attempt, %source, %outlet, size, lake = network.lake.len(), "river traced");
                return network;
            }
            debug!(attempt, size, min = p.min_length, "river attempt too short");
        }

        warn!(attempts = p.max_attempts, min = p.min_length, "no river met the minimum length");
        RiverNetwork::empty()
    }

    /// One of the border cells farthest from `source`.
    fn pick_outlet(&self, elevation: &Tilemap<f32>, source: GridPos, rng: &mut ChaCha8Rng) -> GridPos {
        let mut border: Vec<GridPos> = elevation.positions().filter(|&p| elevation.is_border(p)).collect();
        border.sort_by_key(|&p| (std::cmp::Reverse(p.distance_sq(source)), p));
        border.truncate(self.params.outlet_candidates.max(1));
        if border.is_empty() {
            return source;
        }
        border[rng.gen_range(0..border.len())]
    }

    /// Greedy walk toward `outlet`. Stops on the border, at the outlet, when
    /// the best neighbor was already visited, or after `width + height` steps.
    fn trace(&self, elevation: &Tilemap<f32>, source: GridPos, outlet: GridPos) -> Vec<GridPos> {
        let width = elevation.width();
        let height = elevation.height();
        let diagonal = ((width * width + height * height) as f32).sqrt().max(1.0);

        let mut course = vec![source];
        let mut visited = BTreeSet::from([source]);
        let mut current = source;

        for _ in 0..width + height {
            if current == outlet || elevation.is_border(current) {
                break;
            }

            let next = elevation
                .neighbors(current, false)
                .into_iter()
                .filter_map(|n| {
                    let e = *elevation.get_at(n).ok()?;
                    let score = e * 2.0 + (n.distance(outlet) / diagonal) * self.params.distance_weight;
                    Some((score, n))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let Some((_, next)) = next else {
                break;
            };
            if !visited.insert(next) {
                break;
            }
            course.push(next);
            current = next;
        }

        course
    }

    /// Grow a lake outward from the mouth over low cells.
    ///
    /// Each round every frontier cell joins with `lake_inclusion_chance`;
    /// cells that miss stay on the frontier for the next round. A round where
    /// nothing joins takes the first frontier cell, so the lake reaches its
    /// random target whenever enough connected low cells exist.
    fn grow_lake(
        &self,
        elevation: &Tilemap<f32>,
        mouth: GridPos,
        course: &[GridPos],
        rng: &mut ChaCha8Rng,
    ) -> BTreeSet<GridPos> {
        let p = &self.params;
        let lo = p.lake_min.min(p.lake_max);
        let target = rng.gen_range(lo..=p.lake_max.max(lo));
        let chance = p.lake_inclusion_chance.clamp(0.0, 1.0);

        let river: BTreeSet<GridPos> = course.iter().copied().collect();
        let eligible = |n: GridPos| {
            !river.contains(&n)
                && elevation
                    .get_at(n)
                    .map(|&e| e < p.lake_elevation_threshold)
                    .unwrap_or(false)
        };

        let mut lake = BTreeSet::new();
        let mut frontier: BTreeSet<GridPos> = BTreeSet::new();
        let expand = |pos: GridPos, lake: &BTreeSet<GridPos>, frontier: &mut BTreeSet<GridPos>| {
            for &(dx, dy) in &CARDINALS {
                let n = pos.offset(dx, dy);
                if !lake.contains(&n) && eligible(n) {
                    frontier.insert(n);
                }
            }
        };
        expand(mouth, &lake, &mut frontier);

        while lake.len() < target && !frontier.is_empty() {
            let mut joined: Vec<GridPos> = frontier.iter().copied().filter(|_| rng.gen_bool(chance)).collect();
            if joined.is_empty() {
                joined.extend(frontier.first().copied());
            }
            joined.truncate(target - lake.len());

            for pos in joined {
                frontier.remove(&pos);
                lake.insert(pos);
                expand(pos, &lake, &mut frontier);
            }
        }

        if lake.len() < lo {
            debug!(%mouth, size = lake.len(), min = lo, "lake basin smaller than the minimum");
        }
        lake
    }
}
