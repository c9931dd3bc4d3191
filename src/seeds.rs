//! Seed management for world and zone generation
//!
//! Each generation system gets its own seed derived from a master seed, so
//! changing how one stage consumes randomness never shifts another stage.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::tilemap::GridPos;

/// Seeds for the world generation stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (also mixed into zone seeds)
    pub master: u64,
    /// Elevation noise
    pub elevation: u64,
    /// Woodland resolution noise layer
    pub woodland: u64,
    /// River tracing
    pub rivers: u64,
    /// City placement
    pub cities: u64,
    /// Road network construction
    pub roads: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            elevation: derive_seed(master, "elevation"),
            woodland: derive_seed(master, "woodland"),
            rivers: derive_seed(master, "rivers"),
            cities: derive_seed(master, "cities"),
            roads: derive_seed(master, "roads"),
        }
    }
}

/// Derive a sub-seed from a master seed and a system name.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

/// Seed for the zone at a world position: world seed mixed with the position.
pub fn zone_seed(world_seed: u64, pos: GridPos) -> u64 {
    let mut h = world_seed;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h ^= pos.x as u32 as u64;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h ^= pos.y as u32 as u64;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, elevation: {}, woodland: {}, rivers: {}, cities: {}, roads: {} }}",
            self.master, self.elevation, self.woodland, self.rivers, self.cities, self.roads,
        )
    }
}
