use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};

/// Integer grid coordinate, origin top-left.
///
/// Ordered row-major (`y` first, then `x`), which is the tie-break order used
/// by every deterministic comparator in the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn distance_sq(self, other: GridPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: GridPos) -> f32 {
        (self.distance_sq(other) as f32).sqrt()
    }
}

impl Ord for GridPos {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for GridPos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// 4-connected offsets: north, east, south, west
pub const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// 8-connected offsets, cardinals first
pub const ALL_DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// A rectangular 2D grid stored row-major in a flat vector.
///
/// Unlike a planet map this does not wrap: every access outside the bounds
/// is a [`GenError::Bounds`].
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Tilemap<T> {
    /// Build from row-major data. Length must equal `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> GenResult<Self> {
        if data.len() != width * height {
            return Err(GenError::Configuration(format!(
                "tilemap data has {} cells, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.in_bounds(pos.x, pos.y)
    }

    fn index(&self, x: i32, y: i32) -> GenResult<usize> {
        if !self.in_bounds(x, y) {
            return Err(GenError::Bounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> GenResult<&T> {
        let idx = self.index(x, y)?;
        Ok(&self.data[idx])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> GenResult<&mut T> {
        let idx = self.index(x, y)?;
        Ok(&mut self.data[idx])
    }

    pub fn set(&mut self, x: i32, y: i32, value: T) -> GenResult<()> {
        let idx = self.index(x, y)?;
        self.data[idx] = value;
        Ok(())
    }

    pub fn get_at(&self, pos: GridPos) -> GenResult<&T> {
        self.get(pos.x, pos.y)
    }

    pub fn set_at(&mut self, pos: GridPos, value: T) -> GenResult<()> {
        self.set(pos.x, pos.y, value)
    }

    /// In-bounds neighbors of `pos`, 4-connected or 8-connected.
    pub fn neighbors(&self, pos: GridPos, include_diagonals: bool) -> Vec<GridPos> {
        let offsets: &[(i32, i32)] = if include_diagonals {
            &ALL_DIRECTIONS
        } else {
            &CARDINALS
        };

        offsets
            .iter()
            .map(|&(dx, dy)| pos.offset(dx, dy))
            .filter(|p| self.contains(*p))
            .collect()
    }

    /// Distance from `pos` to the nearest grid edge (0 on the border).
    pub fn border_distance(&self, pos: GridPos) -> i32 {
        let right = self.width as i32 - 1 - pos.x;
        let bottom = self.height as i32 - 1 - pos.y;
        pos.x.min(pos.y).min(right).min(bottom)
    }

    pub fn is_border(&self, pos: GridPos) -> bool {
        self.contains(pos) && self.border_distance(pos) == 0
    }

    /// All coordinates in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let width = self.width as i32;
        (0..self.data.len() as i32).map(move |idx| GridPos::new(idx % width, idx / width))
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let pos = GridPos::new((idx % width) as i32, (idx / width) as i32);
            (pos, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GridPos, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let pos = GridPos::new((idx % width) as i32, (idx / width) as i32);
            (pos, val)
        })
    }

    /// Raw row-major cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Build a new map of the same size by mapping every cell.
    pub fn map<U>(&self, mut f: impl FnMut(GridPos, &T) -> U) -> Tilemap<U> {
        let data = self.iter().map(|(pos, v)| f(pos, v)).collect();
        Tilemap {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let mut map: Tilemap<u8> = Tilemap::new(10, 10);
        map.set(3, 4, 7).unwrap();
        assert_eq!(*map.get(3, 4).unwrap(), 7);
        assert_eq!(*map.get(4, 3).unwrap(), 0);
    }

    #[test]
    fn test_out_of_bounds_is_error() {
        let mut map: Tilemap<u8> = Tilemap::new(10, 10);
        assert!(matches!(map.get(10, 0), Err(GenError::Bounds { x: 10, y: 0, .. })));
        assert!(map.get(0, 10).is_err());
        assert!(map.get(-1, 0).is_err());
        assert!(map.set(0, -1, 1).is_err());
        assert!(map.set(9, 9, 1).is_ok());
    }

    #[test]
    fn test_neighbors_clip_at_corners() {
        let map: Tilemap<u8> = Tilemap::new(5, 5);
        let corner = map.neighbors(GridPos::new(0, 0), false);
        assert_eq!(corner.len(), 2);
        let corner_diag = map.neighbors(GridPos::new(0, 0), true);
        assert_eq!(corner_diag.len(), 3);
        let center = map.neighbors(GridPos::new(2, 2), true);
        assert_eq!(center.len(), 8);
    }

    #[test]
    fn test_border_distance() {
        let map: Tilemap<u8> = Tilemap::new(10, 6);
        assert_eq!(map.border_distance(GridPos::new(0, 3)), 0);
        assert_eq!(map.border_distance(GridPos::new(4, 2)), 2);
        assert_eq!(map.border_distance(GridPos::new(9, 5)), 0);
        assert!(map.is_border(GridPos::new(5, 5)));
        assert!(!map.is_border(GridPos::new(5, 4)));
    }

    #[test]
    fn test_grid_pos_row_major_order() {
        let mut points = vec![GridPos::new(3, 1), GridPos::new(0, 2), GridPos::new(1, 1)];
        points.sort();
        assert_eq!(points, vec![GridPos::new(1, 1), GridPos::new(3, 1), GridPos::new(0, 2)]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Tilemap::from_vec(2, 2, vec![0u8; 3]).is_err());
        let map = Tilemap::from_vec(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(*map.get(1, 1).unwrap(), 4);
    }
}
