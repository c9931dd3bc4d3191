//! Zone background colors blended from the surrounding world.
//!
//! A zone's base tint is the mean tint of nearby world cells that share its
//! effective biome. Infrastructure cells (roads, bridges, settlements) take
//! the dominant natural biome around them instead, so a road zone looks like
//! the land it crosses. Along each edge the background moves halfway toward
//! the neighboring zone's tint, which makes both sides of a seam meet at the
//! same color.

use std::collections::BTreeMap;

use crate::biomes::{Biome, BiomeTable};
use crate::config::ZoneConfig;
use crate::error::GenResult;
use crate::tilemap::{GridPos, Tilemap, ALL_DIRECTIONS, CARDINALS};
use crate::tiles::Rgb;
use crate::world::WorldData;

/// Biome whose colors a world cell's zone uses.
pub fn effective_biome(world: &WorldData, pos: GridPos) -> GenResult<Biome> {
    let biome = world.biome_at(pos)?;
    if !biome.is_infrastructure() {
        return Ok(biome);
    }

    let mut counts: BTreeMap<Biome, usize> = BTreeMap::new();
    for &(dx, dy) in &ALL_DIRECTIONS {
        let n = pos.offset(dx, dy);
        if let Ok(b) = world.biome_at(n) {
            if !b.is_infrastructure() {
                *counts.entry(b).or_default() += 1;
            }
        }
    }

    // Highest count wins; the BTreeMap order settles ties
    Ok(counts
        .into_iter()
        .fold(None, |best: Option<(Biome, usize)>, (b, c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((b, c)),
        })
        .map(|(b, _)| b)
        .unwrap_or(Biome::Grassland))
}

/// Tint of one world cell: effective biome color shaded by elevation.
pub fn world_tint(world: &WorldData, table: &BiomeTable, pos: GridPos) -> GenResult<Rgb> {
    let biome = effective_biome(world, pos)?;
    let elevation = world.elevation_at(pos)?;
    Ok(table.color(biome)?.shade(0.85 + elevation * 0.3))
}

/// Mean tint of same-biome world cells within `radius` of `pos`.
pub fn zone_tint(world: &WorldData, table: &BiomeTable, pos: GridPos, radius: i32) -> GenResult<Rgb> {
    let biome = effective_biome(world, pos)?;
    let mut samples = vec![world_tint(world, table, pos)?];

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let n = pos.offset(dx, dy);
            if n == pos || !world.contains(n) {
                continue;
            }
            if effective_biome(world, n)? == biome {
                samples.push(world_tint(world, table, n)?);
            }
        }
    }

    Ok(Rgb::average(samples).unwrap_or(Rgb::BLACK))
}

/// Per-cell background for the zone at `pos`.
pub fn blend_background(
    world: &WorldData,
    table: &BiomeTable,
    pos: GridPos,
    config: &ZoneConfig,
) -> GenResult<Tilemap<Rgb>> {
    let size = config.size;
    let center = zone_tint(world, table, pos, config.blend_radius)?;

    // North, east, south, west neighbor tints (None off the world)
    let mut edges = [None; 4];
    for (slot, &(dx, dy)) in edges.iter_mut().zip(CARDINALS.iter()) {
        let n = pos.offset(dx, dy);
        if world.contains(n) {
            *slot = Some(zone_tint(world, table, n, config.blend_radius)?);
        }
    }

    let mut background = Tilemap::new_with(size, size, center);
    let edge_width = config.edge_width.max(1) as i32;
    let last = size as i32 - 1;

    for (cell, color) in background.iter_mut() {
        let distances = [cell.y, last - cell.x, last - cell.y, cell.x];
        let nearest = (0..4)
            .filter(|&i| edges[i].is_some())
            .min_by_key(|&i| (distances[i], i));

        if let Some(i) = nearest {
            let d = distances[i];
            if d < edge_width {
                if let Some(neighbor) = edges[i] {
                    let t = config.edge_blend * (1.0 - d as f32 / edge_width as f32);
                    *color = center.lerp(neighbor, t);
                }
            }
        }
    }

    Ok(background)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::tiles::TileVariantRegistry;
    use crate::world::generate_world;

    fn biome_for(c: char) -> Biome {
        match c {
            'G' => Biome::Grassland,
            'F' => Biome::Forest,
            'H' => Biome::Hills,
            'W' => Biome::River,
            'R' => Biome::Road,
            'B' => Biome::Bridge,
            'S' => Biome::Settlement,
            other => panic!("unknown biome char {}", other),
        }
    }

    /// Generated world with its biomes replaced by `rows` over flat 0.5 ground
    fn world_from(rows: &[&str]) -> (WorldData, BiomeTable) {
        let (width, height) = (rows[0].len(), rows.len());
        let mut config = GeneratorConfig::default();
        config.world.width = width;
        config.world.height = height;
        config.world.city_count = 0;
        let tables = config.validate().unwrap();
        let registry = TileVariantRegistry::new();
        let mut world = generate_world(&config, &tables, &registry).unwrap();

        let cells = rows.iter().flat_map(|r| r.chars().map(biome_for)).collect();
        world.biomes = Tilemap::from_vec(width, height, cells).unwrap();
        world.elevation = Tilemap::new_with(width, height, 0.5);
        (world, tables.biomes)
    }

    #[test]
    fn test_natural_cells_keep_their_biome() {
        let (world, _) = world_from(&["FFF", "FRF", "GGH"]);
        assert_eq!(effective_biome(&world, GridPos::new(0, 2)).unwrap(), Biome::Grassland);
        assert_eq!(effective_biome(&world, GridPos::new(2, 2)).unwrap(), Biome::Hills);
    }

    #[test]
    fn test_road_takes_dominant_natural_neighbor() {
        let (world, _) = world_from(&["FFF", "FRF", "GGH"]);
        assert_eq!(effective_biome(&world, GridPos::new(1, 1)).unwrap(), Biome::Forest);
    }

    #[test]
    fn test_neighbor_ties_go_to_lower_biome_and_infrastructure_is_ignored() {
        // Three forest, three hills, two settlement around the road
        let (world, _) = world_from(&["FFH", "FRH", "SSH"]);
        assert_eq!(effective_biome(&world, GridPos::new(1, 1)).unwrap(), Biome::Forest);
        // Corner settlement: only one natural neighbor in bounds
        assert_eq!(effective_biome(&world, GridPos::new(0, 2)).unwrap(), Biome::Forest);
    }

    #[test]
    fn test_all_infrastructure_defaults_to_grassland() {
        let (world, _) = world_from(&["RRR", "RBR", "RSR"]);
        for pos in [GridPos::new(1, 1), GridPos::new(0, 0), GridPos::new(1, 2)] {
            assert_eq!(effective_biome(&world, pos).unwrap(), Biome::Grassland);
        }
    }

    #[test]
    fn test_out_of_world_is_bounds_error() {
        let (world, _) = world_from(&["GG", "GG"]);
        assert!(matches!(
            effective_biome(&world, GridPos::new(2, 0)),
            Err(crate::error::GenError::Bounds { .. })
        ));
    }

    #[test]
    fn test_zone_tint_samples_same_biome_within_radius() {
        let (mut world, table) = world_from(&["FFFFF", "FGFFF", "FFGFF", "FFFFF", "FFFFG"]);
        world.elevation.set(1, 1, 0.0).unwrap();
        world.elevation.set(4, 4, 1.0).unwrap();
        let center = GridPos::new(2, 2);
        let tint = |p: GridPos| world_tint(&world, &table, p).unwrap();

        let near = Rgb::average([tint(center), tint(GridPos::new(1, 1))]).unwrap();
        assert_eq!(zone_tint(&world, &table, center, 1).unwrap(), near);

        let wide = Rgb::average([tint(center), tint(GridPos::new(1, 1)), tint(GridPos::new(4, 4))]).unwrap();
        assert_eq!(zone_tint(&world, &table, center, 2).unwrap(), wide);

        // Forest around it never leaks into the grassland tint
        assert_ne!(near, table.color(Biome::Forest).unwrap());
        assert_eq!(zone_tint(&world, &table, center, 0).unwrap(), table.color(Biome::Grassland).unwrap());
    }

    #[test]
    fn test_road_zone_uses_surrounding_forest_tint() {
        let (world, table) = world_from(&["FFF", "FRF", "FFF"]);
        let forest = table.color(Biome::Forest).unwrap();
        assert_eq!(world_tint(&world, &table, GridPos::new(1, 1)).unwrap(), forest);
        assert_eq!(zone_tint(&world, &table, GridPos::new(1, 1), 1).unwrap(), forest);
    }
}
