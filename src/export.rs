//! Debug export of tile grids: PNG images and ASCII dumps.

use std::path::Path;

use image::{ImageBuffer, Rgb as Pixel, RgbImage};
use tracing::info;

use crate::error::GenResult;
use crate::tilemap::Tilemap;
use crate::tiles::{TileVariantRegistry, VariantHandle};

/// Glyphs drawn as background only
fn is_plain(glyph: char) -> bool {
    matches!(glyph, ' ' | '.')
}

/// Render a tile grid: one `cell_size` square per tile in its background
/// color, with a centered foreground marker for non-plain glyphs.
pub fn render_tiles(
    tiles: &Tilemap<VariantHandle>,
    registry: &TileVariantRegistry,
    cell_size: u32,
) -> GenResult<RgbImage> {
    let cell = cell_size.max(1);
    let mut img: RgbImage = ImageBuffer::new(tiles.width() as u32 * cell, tiles.height() as u32 * cell);

    // Marker covers the middle third of the cell
    let inset = cell / 3;
    let draw_marker = cell >= 3;

    for (pos, &handle) in tiles.iter() {
        let appearance = registry.resolve(handle)?;
        let bg = Pixel(appearance.bg.to_array());
        let fg = Pixel(appearance.fg.to_array());
        let marker = draw_marker && !is_plain(appearance.glyph_char());

        let x0 = pos.x as u32 * cell;
        let y0 = pos.y as u32 * cell;
        for dy in 0..cell {
            for dx in 0..cell {
                let inner = dx >= inset && dx < cell - inset && dy >= inset && dy < cell - inset;
                let color = if marker && inner { fg } else { bg };
                img.put_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }

    Ok(img)
}

/// Write a tile grid to a PNG file.
pub fn export_tiles_png(
    tiles: &Tilemap<VariantHandle>,
    registry: &TileVariantRegistry,
    path: impl AsRef<Path>,
    cell_size: u32,
) -> GenResult<()> {
    let path = path.as_ref();
    let img = render_tiles(tiles, registry, cell_size)?;
    img.save(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "exported png");
    Ok(())
}

/// One line per row of glyphs.
pub fn render_ascii(tiles: &Tilemap<VariantHandle>, registry: &TileVariantRegistry) -> GenResult<String> {
    let mut out = String::with_capacity((tiles.width() + 1) * tiles.height());
    for y in 0..tiles.height() as i32 {
        for x in 0..tiles.width() as i32 {
            let appearance = registry.resolve(*tiles.get(x, y)?)?;
            out.push(appearance.glyph_char());
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use crate::tiles::Rgb;

    fn checker(registry: &TileVariantRegistry) -> Tilemap<VariantHandle> {
        let grass = registry.get_or_create('.', Rgb(90, 140, 70), Rgb(60, 100, 50), false);
        let tree = registry.get_or_create('♣', Rgb(30, 90, 40), Rgb(60, 100, 50), false);
        let mut tiles = Tilemap::new_with(3, 2, grass);
        tiles.set(1, 0, tree).unwrap();
        tiles
    }

    #[test]
    fn test_ascii_rows() {
        let registry = TileVariantRegistry::new();
        let tiles = checker(&registry);
        assert_eq!(render_ascii(&tiles, &registry).unwrap(), ".♣.\n...\n");
    }

    #[test]
    fn test_render_marks_glyphs() {
        let registry = TileVariantRegistry::new();
        let tiles = checker(&registry);
        let img = render_tiles(&tiles, &registry, 6).unwrap();
        assert_eq!(img.dimensions(), (18, 12));

        let tree = registry.resolve(*tiles.get(1, 0).unwrap()).unwrap();
        let grass = registry.resolve(*tiles.get(0, 0).unwrap()).unwrap();
        assert_eq!(img.get_pixel(6 + 3, 3).0, tree.fg.to_array());
        assert_eq!(img.get_pixel(6, 0).0, tree.bg.to_array());
        assert_eq!(img.get_pixel(3, 3).0, grass.bg.to_array());
    }

    #[test]
    fn test_unknown_handle_fails() {
        let registry = TileVariantRegistry::new();
        let tiles = Tilemap::new_with(2, 2, VariantHandle(7));
        assert!(matches!(render_ascii(&tiles, &registry), Err(GenError::VariantNotFound(_))));
    }
}
