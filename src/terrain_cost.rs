//! Per-cell traversal cost shared by the road and river builders.

use crate::biomes::Biome;
use crate::error::GenResult;
use crate::tilemap::{GridPos, Tilemap};

/// Extra cost per unit of elevation
const ELEVATION_COST: f32 = 2.0;
/// Extra cost per unit of elevation difference to the steepest neighbor
const SLOPE_COST: f32 = 8.0;

/// Read-only traversal cost field
#[derive(Clone, Debug)]
pub struct TerrainCostField {
    costs: Tilemap<f32>,
}

impl TerrainCostField {
    /// Uniform cost field
    pub fn flat(width: usize, height: usize, cost: f32) -> Self {
        Self {
            costs: Tilemap::new_with(width, height, cost),
        }
    }

    /// Cost from biome base weight, elevation and local slope.
    pub fn from_elevation(elevation: &Tilemap<f32>, biomes: &Tilemap<Biome>) -> GenResult<Self> {
        let mut costs = Tilemap::new_with(elevation.width(), elevation.height(), 1.0f32);

        for pos in elevation.positions() {
            let here = *elevation.get_at(pos)?;
            let biome = *biomes.get_at(pos)?;

            let mut slope = 0.0f32;
            for n in elevation.neighbors(pos, false) {
                slope = slope.max((elevation.get_at(n)? - here).abs());
            }

            let cost = biome.base_weight() * (1.0 + here * ELEVATION_COST) + slope * SLOPE_COST;
            costs.set_at(pos, cost)?;
        }

        Ok(Self { costs })
    }

    pub fn width(&self) -> usize {
        self.costs.width()
    }

    pub fn height(&self) -> usize {
        self.costs.height()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.costs.contains(pos)
    }

    pub fn cost(&self, pos: GridPos) -> GenResult<f32> {
        self.costs.get_at(pos).copied()
    }

    /// Smallest cost in the field (used to scale A* heuristics)
    pub fn min_cost(&self) -> f32 {
        self.costs
            .as_slice()
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min)
    }

    pub fn grid(&self) -> &Tilemap<f32> {
        &self.costs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field() {
        let field = TerrainCostField::flat(5, 4, 2.0);
        assert_eq!(field.cost(GridPos::new(4, 3)).unwrap(), 2.0);
        assert!(field.cost(GridPos::new(5, 0)).is_err());
        assert_eq!(field.min_cost(), 2.0);
    }

    #[test]
    fn test_higher_and_steeper_cells_cost_more() {
        let mut elevation = Tilemap::new_with(5, 5, 0.1f32);
        elevation.set(2, 2, 0.9).unwrap();
        let biomes = Tilemap::new_with(5, 5, Biome::Grassland);
        let field = TerrainCostField::from_elevation(&elevation, &biomes).unwrap();

        let peak = field.cost(GridPos::new(2, 2)).unwrap();
        let flank = field.cost(GridPos::new(2, 1)).unwrap();
        let far = field.cost(GridPos::new(0, 0)).unwrap();
        assert!(peak > flank);
        assert!(flank > far);
    }

    #[test]
    fn test_biome_weight_scales_cost() {
        let elevation = Tilemap::new_with(3, 3, 0.0f32);
        let mut biomes = Tilemap::new_with(3, 3, Biome::Grassland);
        biomes.set(1, 1, Biome::Mountains).unwrap();
        let field = TerrainCostField::from_elevation(&elevation, &biomes).unwrap();
        assert!(field.cost(GridPos::new(1, 1)).unwrap() > field.cost(GridPos::new(0, 0)).unwrap());
    }
}
