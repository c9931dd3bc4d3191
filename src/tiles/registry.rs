//! Deduplicating cache of tile variants.
//!
//! Grids never own appearances: they store a [`VariantHandle`] and resolve it
//! through the registry when something needs to draw or export the tile.
//! Appearances are keyed by their quantized value, so colors that differ by
//! less than one quantization step collapse to a single variant.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{GenError, GenResult};

use super::appearance::{AppearanceKey, Rgb, TileAppearance, DEFAULT_QUANTIZE_STEP};

/// Stable handle to a cached variant. Valid for the registry that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantHandle(pub u32);

/// Diagnostic counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Variants created
    pub created: u64,
    /// Lookups answered from the cache
    pub hits: u64,
}

#[derive(Default)]
struct RegistryInner {
    by_key: HashMap<AppearanceKey, VariantHandle>,
    variants: Vec<TileAppearance>,
    stats: RegistryStats,
}

/// Process-lifetime tile variant cache, shared by reference.
pub struct TileVariantRegistry {
    step: u8,
    inner: RwLock<RegistryInner>,
}

impl Default for TileVariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TileVariantRegistry {
    pub fn new() -> Self {
        Self::with_step(DEFAULT_QUANTIZE_STEP)
    }

    /// Registry with a custom per-channel quantization step.
    pub fn with_step(step: u8) -> Self {
        Self {
            step: step.max(1),
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    pub fn quantize_step(&self) -> u8 {
        self.step
    }

    /// Handle for the quantized appearance, creating the variant on first use.
    pub fn get_or_create(&self, glyph: char, fg: Rgb, bg: Rgb, mirrored: bool) -> VariantHandle {
        self.intern(&TileAppearance::new(glyph, fg, bg).mirrored(mirrored))
    }

    /// Same as [`get_or_create`](Self::get_or_create) for an existing appearance value.
    pub fn intern(&self, appearance: &TileAppearance) -> VariantHandle {
        let key = appearance.key(self.step);

        // Counters are bumped on hits too, so lookups take the write lock.
        let mut inner = self.inner.write();
        if let Some(&handle) = inner.by_key.get(&key) {
            inner.stats.hits += 1;
            return handle;
        }

        let handle = VariantHandle(inner.variants.len() as u32);
        inner.variants.push(key.appearance());
        inner.by_key.insert(key, handle);
        inner.stats.created += 1;
        trace!(?handle, glyph = appearance.glyph, "created tile variant");
        handle
    }

    /// Stored (quantized) appearance for a handle.
    pub fn resolve(&self, handle: VariantHandle) -> GenResult<TileAppearance> {
        self.inner
            .read()
            .variants
            .get(handle.0 as usize)
            .copied()
            .ok_or(GenError::VariantNotFound(handle))
    }

    pub fn stats(&self) -> RegistryStats {
        self.inner.read().stats
    }

    /// Number of distinct variants
    pub fn len(&self) -> usize {
        self.inner.read().variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
