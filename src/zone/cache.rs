//! Generate-once zone cache
//!
//! Zones are generated lazily on first request and kept for the life of the
//! cache, keyed by world position. There is no eviction: a cached zone is
//! never regenerated or mutated, which is safe because generation is a pure
//! function of the world seed and the zone position.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::error::GenResult;
use crate::tilemap::GridPos;

use super::generation::ZoneGenerator;
use super::types::Zone;

/// Diagnostic counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoneCacheStats {
    pub generated: u64,
    pub hits: u64,
}

pub struct ZoneCache<'a> {
    generator: ZoneGenerator<'a>,
    zones: HashMap<GridPos, Zone>,
    stats: ZoneCacheStats,
}

impl<'a> ZoneCache<'a> {
    pub fn new(generator: ZoneGenerator<'a>) -> Self {
        Self {
            generator,
            zones: HashMap::new(),
            stats: ZoneCacheStats::default(),
        }
    }

    /// Cached zone at `pos`, generating it on the first request.
    ///
    /// A failed generation caches nothing, so the error repeats on retry.
    pub fn get_or_generate(&mut self, pos: GridPos) -> GenResult<&Zone> {
        match self.zones.entry(pos) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                debug!(%pos, "zone cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let zone = self.generator.generate(pos)?;
                self.stats.generated += 1;
                debug!(%pos, cached = self.stats.generated, "zone cache miss");
                Ok(entry.insert(zone))
            }
        }
    }

    pub fn get(&self, pos: GridPos) -> Option<&Zone> {
        self.zones.get(&pos)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.zones.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn stats(&self) -> ZoneCacheStats {
        self.stats
    }
}
