//! Road zones: a junction template scaled to the zone.
//!
//! The world road tile's junction (which neighbors are also road) picks
//! the arms; each arm is a band running from the zone center to the
//! matching edge. Bridges and settlements count as road neighbors, so a
//! road zone always lines up with the zone next to it.

use rand_chacha::ChaCha8Rng;

use crate::error::GenResult;
use crate::network::RoadJunction;
use crate::settlement::Rect;
use crate::tiles::TileKind;

use super::generation::ZoneContext;
use super::terrain;
use super::types::Zone;

/// Rectangles covering the road for a junction on a `size` x `size` zone.
pub fn road_template(junction: RoadJunction, size: usize) -> Vec<Rect> {
    let size = size as i32;
    let band = (size / 8).max(3);
    let start = (size - band) / 2;
    let end = start + band;

    // Hub at the center keeps the arms joined
    let mut rects = vec![Rect::new(start, start, band, band)];
    if junction.north {
        rects.push(Rect::new(start, 0, band, end));
    }
    if junction.south {
        rects.push(Rect::new(start, start, band, size - start));
    }
    if junction.west {
        rects.push(Rect::new(0, start, end, band));
    }
    if junction.east {
        rects.push(Rect::new(start, start, size - start, band));
    }
    rects
}

/// Grassland with the junction's road stamped on top.
pub fn road(zone: &mut Zone, ctx: &ZoneContext<'_>, rng: &mut ChaCha8Rng) -> GenResult<()> {
    terrain::grassland(zone, ctx, rng)?;

    let junction = ctx.world.road_junction(zone.position);
    for rect in road_template(junction, zone.width()) {
        for pos in rect.positions() {
            if zone.contains(pos) {
                zone.place(pos, TileKind::Road, ctx.catalog, ctx.registry)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::GridPos;

    fn covers(rects: &[Rect], pos: GridPos) -> bool {
        rects.iter().any(|r| r.contains(pos))
    }

    #[test]
    fn test_straight_template_reaches_both_edges() {
        let junction = RoadJunction {
            north: true,
            south: true,
            ..RoadJunction::default()
        };
        let rects = road_template(junction, 64);
        assert!(covers(&rects, GridPos::new(32, 0)));
        assert!(covers(&rects, GridPos::new(32, 63)));
        assert!(!covers(&rects, GridPos::new(0, 32)));
        assert!(!covers(&rects, GridPos::new(63, 32)));
    }

    #[test]
    fn test_corner_template() {
        let junction = RoadJunction {
            east: true,
            south: true,
            ..RoadJunction::default()
        };
        let rects = road_template(junction, 32);
        assert!(covers(&rects, GridPos::new(31, 16)));
        assert!(covers(&rects, GridPos::new(16, 31)));
        assert!(!covers(&rects, GridPos::new(16, 0)));
        assert!(!covers(&rects, GridPos::new(0, 16)));
    }

    #[test]
    fn test_isolated_template_is_center_hub() {
        let rects = road_template(RoadJunction::default(), 64);
        assert_eq!(rects.len(), 1);
        assert!(rects[0].contains(GridPos::new(32, 32)));
        assert_eq!(rects[0].width, 8);
    }

    #[test]
    fn test_templates_stay_inside_zone() {
        let all = RoadJunction {
            north: true,
            east: true,
            south: true,
            west: true,
        };
        let zone = Rect::new(0, 0, 20, 20);
        for rect in road_template(all, 20) {
            assert!(zone.contains_rect(&rect));
        }
    }
}
