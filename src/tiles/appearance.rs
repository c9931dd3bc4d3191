//! Renderable tile appearances and their quantized cache keys.

use serde::{Deserialize, Serialize};

/// Default per-channel quantization step for cache keys
pub const DEFAULT_QUANTIZE_STEP: u8 = 8;

/// An RGB color. Serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Snap every channel down to a multiple of `step`.
    pub fn quantize(self, step: u8) -> Rgb {
        if step <= 1 {
            return self;
        }
        let q = |c: u8| (c / step) * step;
        Rgb(q(self.0), q(self.1), q(self.2))
    }

    /// Linear interpolation toward `other` (t = 0 keeps self).
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    /// Multiply brightness, saturating at 255.
    pub fn shade(self, factor: f32) -> Rgb {
        let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Rgb(scale(self.0), scale(self.1), scale(self.2))
    }

    /// Average of a set of colors; `None` for an empty set.
    pub fn average<I: IntoIterator<Item = Rgb>>(colors: I) -> Option<Rgb> {
        let mut sum = [0u32; 3];
        let mut count = 0u32;
        for c in colors {
            sum[0] += c.0 as u32;
            sum[1] += c.1 as u32;
            sum[2] += c.2 as u32;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Rgb(
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
        ))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// Glyph plus colors, the unit the registry deduplicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileAppearance {
    /// Glyph code point
    pub glyph: u32,
    pub fg: Rgb,
    pub bg: Rgb,
    /// Draw horizontally mirrored
    pub mirrored: bool,
}

impl TileAppearance {
    pub fn new(glyph: char, fg: Rgb, bg: Rgb) -> Self {
        Self {
            glyph: glyph as u32,
            fg,
            bg,
            mirrored: false,
        }
    }

    pub fn with_bg(mut self, bg: Rgb) -> Self {
        self.bg = bg;
        self
    }

    pub fn with_fg(mut self, fg: Rgb) -> Self {
        self.fg = fg;
        self
    }

    pub fn mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }

    /// Glyph as a `char`, `'?'` for invalid code points.
    pub fn glyph_char(&self) -> char {
        char::from_u32(self.glyph).unwrap_or('?')
    }

    /// Canonical cache key for this appearance.
    pub fn key(&self, step: u8) -> AppearanceKey {
        AppearanceKey {
            glyph: self.glyph,
            fg: self.fg.quantize(step),
            bg: self.bg.quantize(step),
            mirrored: self.mirrored,
        }
    }
}

/// Quantized value key. Two appearances with the same key share one variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AppearanceKey {
    pub glyph: u32,
    pub fg: Rgb,
    pub bg: Rgb,
    pub mirrored: bool,
}

impl AppearanceKey {
    /// The appearance stored for this key.
    pub fn appearance(&self) -> TileAppearance {
        TileAppearance {
            glyph: self.glyph,
            fg: self.fg,
            bg: self.bg,
            mirrored: self.mirrored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_collapses_nearby_colors() {
        assert_eq!(Rgb(17, 23, 255).quantize(8), Rgb(16, 16, 248));
        assert_eq!(Rgb(16, 16, 248).quantize(8), Rgb(16, 16, 248));
        assert_eq!(Rgb(7, 7, 7).quantize(8), Rgb::BLACK);
        assert_eq!(Rgb(7, 7, 7).quantize(1), Rgb(7, 7, 7));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb(0, 100, 200);
        let b = Rgb(100, 0, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb(50, 50, 100));
    }

    #[test]
    fn test_average() {
        assert_eq!(Rgb::average(Vec::new()), None);
        assert_eq!(Rgb::average([Rgb(0, 0, 0), Rgb(10, 20, 30)]), Some(Rgb(5, 10, 15)));
    }

    #[test]
    fn test_key_ignores_sub_step_differences() {
        let a = TileAppearance::new('.', Rgb(100, 101, 102), Rgb(0, 1, 2));
        let b = TileAppearance::new('.', Rgb(103, 98, 97), Rgb(5, 6, 7));
        assert_eq!(a.key(8), b.key(8));
        assert_ne!(a.key(8), a.mirrored(true).key(8));
    }
}
