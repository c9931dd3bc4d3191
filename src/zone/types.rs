//! Zone grids and their per-cell terrain info.

use crate::biomes::Biome;
use crate::error::GenResult;
use crate::tilemap::{GridPos, Tilemap};
use crate::tiles::{Rgb, TileCatalog, TileKind, TileVariantRegistry, VariantHandle};

/// Read-only terrain facts for one zone cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneTileInfo {
    walkable: bool,
    obstructs_view: bool,
    weight: f32,
}

impl ZoneTileInfo {
    pub fn for_kind(kind: TileKind) -> Self {
        Self {
            walkable: kind.walkable(),
            obstructs_view: kind.obstructs_view(),
            weight: kind.weight(),
        }
    }

    pub fn walkable(&self) -> bool {
        self.walkable
    }

    pub fn obstructs_view(&self) -> bool {
        self.obstructs_view
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }
}

impl Default for ZoneTileInfo {
    fn default() -> Self {
        Self::for_kind(TileKind::Grass)
    }
}

/// Ground cover drawn over the blended zone background; everything else
/// keeps the background color from its tile definition.
fn draws_on_background(kind: TileKind) -> bool {
    matches!(
        kind,
        TileKind::Grass
            | TileKind::TallGrass
            | TileKind::Flower
            | TileKind::Shrub
            | TileKind::Tree
            | TileKind::Rock
            | TileKind::Hill
            | TileKind::Mountain
    )
}

/// A generated local map for one world cell
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    /// World cell this zone details
    pub position: GridPos,
    /// World biome of that cell
    pub biome: Biome,
    pub seed: u64,
    /// True when the biome's strategy fell short and grassland was used
    pub fell_back: bool,
    background: Tilemap<Rgb>,
    kinds: Tilemap<TileKind>,
    tiles: Tilemap<VariantHandle>,
    info: Tilemap<ZoneTileInfo>,
}

impl Zone {
    /// Empty zone over a precomputed background. Every cell starts as
    /// grass; strategies paint over it.
    pub fn new(
        position: GridPos,
        biome: Biome,
        seed: u64,
        background: Tilemap<Rgb>,
        catalog: &TileCatalog,
        registry: &TileVariantRegistry,
    ) -> GenResult<Self> {
        let (width, height) = (background.width(), background.height());
        let mut zone = Self {
            position,
            biome,
            seed,
            fell_back: false,
            background,
            kinds: Tilemap::new_with(width, height, TileKind::Grass),
            tiles: Tilemap::new_with(width, height, VariantHandle(0)),
            info: Tilemap::new_with(width, height, ZoneTileInfo::default()),
        };
        zone.fill(TileKind::Grass, catalog, registry)?;
        Ok(zone)
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.tiles.contains(pos)
    }

    pub fn get_tile(&self, x: i32, y: i32) -> GenResult<VariantHandle> {
        self.tiles.get(x, y).copied()
    }

    /// Raw tile write; kind and info are left as they were.
    pub fn set_tile(&mut self, x: i32, y: i32, handle: VariantHandle) -> GenResult<()> {
        self.tiles.set(x, y, handle)
    }

    pub fn neighbors(&self, pos: GridPos, include_diagonals: bool) -> Vec<GridPos> {
        self.tiles.neighbors(pos, include_diagonals)
    }

    pub fn kind_at(&self, pos: GridPos) -> GenResult<TileKind> {
        self.kinds.get_at(pos).copied()
    }

    pub fn info_at(&self, pos: GridPos) -> GenResult<ZoneTileInfo> {
        self.info.get_at(pos).copied()
    }

    pub fn background_at(&self, pos: GridPos) -> GenResult<Rgb> {
        self.background.get_at(pos).copied()
    }

    /// Place a tile kind: updates the handle, the kind and the info record.
    pub fn place(
        &mut self,
        pos: GridPos,
        kind: TileKind,
        catalog: &TileCatalog,
        registry: &TileVariantRegistry,
    ) -> GenResult<()> {
        let handle = if draws_on_background(kind) {
            catalog.handle_on(kind, *self.background.get_at(pos)?, registry)
        } else {
            catalog.handle(kind, registry)
        };
        self.tiles.set_at(pos, handle)?;
        self.kinds.set_at(pos, kind)?;
        self.info.set_at(pos, ZoneTileInfo::for_kind(kind))
    }

    pub fn fill(&mut self, kind: TileKind, catalog: &TileCatalog, registry: &TileVariantRegistry) -> GenResult<()> {
        let positions: Vec<GridPos> = self.tiles.positions().collect();
        for pos in positions {
            self.place(pos, kind, catalog, registry)?;
        }
        Ok(())
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        self.tiles.positions()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.kinds.iter().filter(|(_, &k)| k == kind).count()
    }

    pub fn tiles(&self) -> &Tilemap<VariantHandle> {
        &self.tiles
    }

    pub fn kinds(&self) -> &Tilemap<TileKind> {
        &self.kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(size: usize) -> (Zone, TileCatalog, TileVariantRegistry) {
        let catalog = TileCatalog::default();
        let registry = TileVariantRegistry::new();
        let background = Tilemap::new_with(size, size, Rgb(60, 100, 50));
        let zone = Zone::new(GridPos::new(0, 0), Biome::Grassland, 1, background, &catalog, &registry).unwrap();
        (zone, catalog, registry)
    }

    #[test]
    fn test_new_zone_is_grass() {
        let (zone, _, registry) = zone(8);
        assert_eq!(zone.count(TileKind::Grass), 64);
        // One variant shared by every cell
        assert_eq!(registry.len(), 1);
        assert!(zone.info_at(GridPos::new(3, 3)).unwrap().walkable());
    }

    #[test]
    fn test_place_updates_info() {
        let (mut zone, catalog, registry) = zone(8);
        let pos = GridPos::new(2, 5);
        zone.place(pos, TileKind::Wall, &catalog, &registry).unwrap();
        assert_eq!(zone.kind_at(pos).unwrap(), TileKind::Wall);
        let info = zone.info_at(pos).unwrap();
        assert!(!info.walkable());
        assert!(info.obstructs_view());
        let appearance = registry.resolve(zone.get_tile(2, 5).unwrap()).unwrap();
        assert_eq!(appearance.glyph_char(), '#');
    }

    #[test]
    fn test_access_is_bounds_checked() {
        let (mut zone, catalog, registry) = zone(8);
        assert!(zone.get_tile(8, 0).is_err());
        assert!(zone.set_tile(-1, 0, VariantHandle(0)).is_err());
        assert!(zone.place(GridPos::new(0, 8), TileKind::Tree, &catalog, &registry).is_err());
        assert_eq!(zone.neighbors(GridPos::new(0, 0), true).len(), 3);
    }
}
