//! Settlement layout: buildings with doors, a perimeter wall with four
//! gates, and local roads tying every door and gate to the town center.
//!
//! Placement is rejection sampling against a fixed attempt budget, so a
//! crowded or small zone simply ends up sparse. Only a zone that cannot fit
//! the town hall inside its wall is a shortfall.

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GenError, GenResult};
use crate::network::pathing::{find_path, Step};
use crate::tilemap::{GridPos, Tilemap, CARDINALS};
use crate::tiles::TileKind;

/// Road A* cost for existing road and gate tiles
const ROAD_COST: f32 = 1.0;
/// Road A* cost for everything else that is passable
const OPEN_COST: f32 = 3.0;

/// Layout cell before it becomes a tile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SettlementCell {
    #[default]
    Grass,
    Wall,
    Floor,
    Door,
    Road,
    Gate,
}

impl SettlementCell {
    pub fn tile_kind(self) -> TileKind {
        match self {
            SettlementCell::Grass => TileKind::Grass,
            SettlementCell::Wall => TileKind::Wall,
            SettlementCell::Floor => TileKind::Floor,
            SettlementCell::Door => TileKind::Door,
            SettlementCell::Road => TileKind::Road,
            SettlementCell::Gate => TileKind::Gate,
        }
    }

    /// Part of the traceable road graph
    pub fn is_road(self) -> bool {
        matches!(self, SettlementCell::Road | SettlementCell::Gate)
    }

    fn route_cost(self) -> f32 {
        match self {
            SettlementCell::Road | SettlementCell::Gate => ROAD_COST,
            SettlementCell::Wall | SettlementCell::Door => f32::INFINITY,
            SettlementCell::Grass | SettlementCell::Floor => OPEN_COST,
        }
    }
}

/// Axis-aligned rectangle, `x..x+width` by `y..y+height`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> GridPos {
        GridPos::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, p: GridPos) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x && other.right() <= self.right() && other.y >= self.y && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    pub fn expand(&self, by: i32) -> Rect {
        Rect::new(self.x - by, self.y - by, self.width + 2 * by, self.height + 2 * by)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    /// Clip to `[0, width) x [0, height)`.
    pub fn clamp_to(&self, width: i32, height: i32) -> Rect {
        let x = self.x.max(0);
        let y = self.y.max(0);
        Rect::new(x, y, self.right().min(width) - x, self.bottom().min(height) - y)
    }

    pub fn is_edge(&self, p: GridPos) -> bool {
        self.contains(p) && (p.x == self.x || p.x == self.right() - 1 || p.y == self.y || p.y == self.bottom() - 1)
    }

    /// Row-major cells of the rectangle
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| GridPos::new(x, y)))
    }
}

/// Which wall of a building its door sits in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Outward unit offset
    pub fn outward(self) -> (i32, i32) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Building {
    pub bounds: Rect,
    pub door: GridPos,
    pub door_side: Side,
    pub is_town_hall: bool,
}

impl Building {
    /// Tile just outside the door
    pub fn door_front(&self) -> GridPos {
        let (dx, dy) = self.door_side.outward();
        self.door.offset(dx, dy)
    }

    /// 3x3 area centered on the door that other buildings must leave clear
    pub fn door_zone(&self) -> Rect {
        Rect::new(self.door.x - 1, self.door.y - 1, 3, 3)
    }

    /// Whether `other` may not be placed next to this building
    fn conflicts(&self, other: &Building, spacing: i32) -> bool {
        self.bounds.expand(spacing).intersects(&other.bounds)
            || self.door_zone().intersects(&other.bounds)
            || other.door_zone().intersects(&self.bounds)
    }
}

/// Size and budget for settlement layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementParams {
    pub max_attempts: u32,
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
    pub town_hall_width: i32,
    pub town_hall_height: i32,
    /// Free tiles required between buildings
    pub spacing: i32,
    /// Distance from the building bounding box to the wall
    pub wall_padding: i32,
}

impl Default for SettlementParams {
    fn default() -> Self {
        Self {
            max_attempts: 300,
            min_width: 4,
            max_width: 10,
            min_height: 4,
            max_height: 8,
            town_hall_width: 12,
            town_hall_height: 8,
            spacing: 1,
            wall_padding: 3,
        }
    }
}

impl SettlementParams {
    /// Building sides need at least 3 tiles so a door fits off the corners.
    pub fn validate(&self) -> GenResult<()> {
        if self.min_width < 3 || self.min_height < 3 || self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(GenError::Configuration(format!(
                "building size range {}..={} x {}..={} is invalid",
                self.min_width, self.max_width, self.min_height, self.max_height
            )));
        }
        if self.town_hall_width < 3 || self.town_hall_height < 3 {
            return Err(GenError::Configuration("town hall must be at least 3x3".into()));
        }
        if self.spacing < 0 || self.wall_padding < 0 {
            return Err(GenError::Configuration(format!(
                "spacing {} and wall padding {} must not be negative",
                self.spacing, self.wall_padding
            )));
        }
        Ok(())
    }
}

/// A finished settlement on a zone-sized grid
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementLayout {
    pub cells: Tilemap<SettlementCell>,
    /// Town hall first
    pub buildings: Vec<Building>,
    pub town_center: GridPos,
    pub wall: Rect,
    /// North, east, south, west
    pub gates: [GridPos; 4],
}

impl SettlementLayout {
    pub fn town_hall(&self) -> Option<&Building> {
        self.buildings.iter().find(|b| b.is_town_hall)
    }

    pub fn cell(&self, pos: GridPos) -> GenResult<SettlementCell> {
        self.cells.get_at(pos).copied()
    }

    pub fn count(&self, kind: SettlementCell) -> usize {
        self.cells.iter().filter(|(_, &c)| c == kind).count()
    }

    /// Whether `from` reaches `to` walking only on road and gate cells.
    pub fn road_connected(&self, from: GridPos, to: GridPos) -> bool {
        let is_road = |p: GridPos| self.cells.get_at(p).map(|c| c.is_road()).unwrap_or(false);
        if !is_road(from) || !is_road(to) {
            return false;
        }

        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(pos) = queue.pop_front() {
            if pos == to {
                return true;
            }
            for &(dx, dy) in &CARDINALS {
                let n = pos.offset(dx, dy);
                if is_road(n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        false
    }
}

#[derive(Clone, Debug, Default)]
pub struct SettlementLayoutBuilder {
    params: SettlementParams,
}

impl SettlementLayoutBuilder {
    pub fn new(params: SettlementParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SettlementParams {
        &self.params
    }

    /// Lay out a settlement on a `width` x `height` grid.
    pub fn build(&self, width: usize, height: usize, rng: &mut ChaCha8Rng) -> GenResult<SettlementLayout> {
        let p = &self.params;
        p.validate()?;
        let w = width as i32;
        let h = height as i32;
        // Buildings stay this far from the grid edge so the wall and the
        // tiles outside its gates are in bounds.
        let margin = p.wall_padding + 2;

        if w < p.town_hall_width + 2 * margin || h < p.town_hall_height + 2 * margin {
            return Err(GenError::GenerationShortfall(format!(
                "{}x{} zone cannot fit a {}x{} town hall inside a wall",
                width, height, p.town_hall_width, p.town_hall_height
            )));
        }

        let mut cells = Tilemap::new_with(width, height, SettlementCell::Grass);

        let town_hall = self.place_town_hall(w, h, margin, rng);
        let town_center = town_hall.door_front();
        let mut buildings = vec![town_hall];

        for _ in 0..p.max_attempts {
            let bw = rng.gen_range(p.min_width..=p.max_width);
            let bh = rng.gen_range(p.min_height..=p.max_height);
            if w - margin - bw < margin || h - margin - bh < margin {
                continue;
            }
            let x = rng.gen_range(margin..=w - margin - bw);
            let y = rng.gen_range(margin..=h - margin - bh);
            let candidate = with_door(Rect::new(x, y, bw, bh), false, rng);

            if buildings.iter().any(|b| b.conflicts(&candidate, p.spacing)) {
                continue;
            }
            buildings.push(candidate);
        }
        debug!(buildings = buildings.len(), attempts = p.max_attempts, "placed buildings");

        for building in &buildings {
            draw_building(&mut cells, building)?;
        }

        // Perimeter goes in before any road so roads are never overwritten
        let bbox = buildings
            .iter()
            .map(|b| b.bounds.union(&b.door_zone()))
            .reduce(|a, b| a.union(&b))
            .unwrap_or(buildings[0].bounds);
        let wall = bbox.expand(p.wall_padding).clamp_to(w, h);
        if wall != bbox.expand(p.wall_padding) {
            warn!(?wall, "settlement wall clamped to zone bounds");
        }
        for pos in wall.positions().filter(|&pos| wall.is_edge(pos)) {
            cells.set_at(pos, SettlementCell::Wall)?;
        }

        let mid_x = wall.x + wall.width / 2;
        let mid_y = wall.y + wall.height / 2;
        let gates = [
            GridPos::new(mid_x, wall.y),
            GridPos::new(wall.right() - 1, mid_y),
            GridPos::new(mid_x, wall.bottom() - 1),
            GridPos::new(wall.x, mid_y),
        ];
        for &gate in &gates {
            cells.set_at(gate, SettlementCell::Gate)?;
        }

        cells.set_at(town_center, SettlementCell::Road)?;
        for building in buildings.iter().filter(|b| !b.is_town_hall) {
            carve_road(&mut cells, building.door_front(), town_center)?;
        }
        for &gate in &gates {
            carve_road(&mut cells, gate, town_center)?;
        }

        info!(
            buildings = buildings.len(),
            %town_center,
            "settlement laid out"
        );

        Ok(SettlementLayout {
            cells,
            buildings,
            town_center,
            wall,
            gates,
        })
    }

    /// Town hall near the grid center, jittered by a couple of tiles.
    fn place_town_hall(&self, w: i32, h: i32, margin: i32, rng: &mut ChaCha8Rng) -> Building {
        let p = &self.params;
        let cx = (w - p.town_hall_width) / 2 + rng.gen_range(-2..=2);
        let cy = (h - p.town_hall_height) / 2 + rng.gen_range(-2..=2);
        let x = cx.clamp(margin, w - margin - p.town_hall_width);
        let y = cy.clamp(margin, h - margin - p.town_hall_height);
        with_door(Rect::new(x, y, p.town_hall_width, p.town_hall_height), true, rng)
    }
}

/// Pick a door on a random side, away from the corners.
fn with_door(bounds: Rect, is_town_hall: bool, rng: &mut ChaCha8Rng) -> Building {
    let side = Side::ALL[rng.gen_range(0..4)];
    let along_x = rng.gen_range(bounds.x + 1..bounds.right() - 1);
    let along_y = rng.gen_range(bounds.y + 1..bounds.bottom() - 1);
    let door = match side {
        Side::North => GridPos::new(along_x, bounds.y),
        Side::South => GridPos::new(along_x, bounds.bottom() - 1),
        Side::West => GridPos::new(bounds.x, along_y),
        Side::East => GridPos::new(bounds.right() - 1, along_y),
    };
    Building {
        bounds,
        door,
        door_side: side,
        is_town_hall,
    }
}

fn draw_building(cells: &mut Tilemap<SettlementCell>, building: &Building) -> GenResult<()> {
    for pos in building.bounds.positions() {
        let cell = if building.bounds.is_edge(pos) {
            SettlementCell::Wall
        } else {
            SettlementCell::Floor
        };
        cells.set_at(pos, cell)?;
    }
    cells.set_at(building.door, SettlementCell::Door)
}

/// Route from `from` to `to` and turn every open tile on the way into road.
fn carve_road(cells: &mut Tilemap<SettlementCell>, from: GridPos, to: GridPos) -> GenResult<()> {
    let max_iterations = cells.area() * 10;
    let path = {
        let grid = &*cells;
        find_path(
            from,
            to,
            max_iterations,
            |pos, _| {
                grid.neighbors(pos, false)
                    .into_iter()
                    .filter_map(|n| grid.get_at(n).ok().map(|c| Step::new(n, c.route_cost())))
                    .collect()
            },
            |pos| pos.manhattan(to) as f32 * ROAD_COST,
        )
    };

    for &pos in &path.tiles {
        if *cells.get_at(pos)? == SettlementCell::Grass || *cells.get_at(pos)? == SettlementCell::Floor {
            cells.set_at(pos, SettlementCell::Road)?;
        }
    }

    // The partial route stays carved, but the layout is not connected
    if !path.complete {
        warn!(%from, %to, reached = ?path.end(), "settlement road did not reach the town center");
        return Err(GenError::PathNotFound { from, to });
    }
    Ok(())
}
