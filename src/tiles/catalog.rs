//! Named tile definitions loaded from configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};

use super::appearance::{Rgb, TileAppearance};
use super::registry::{TileVariantRegistry, VariantHandle};

/// Every appearance the generators place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    TallGrass,
    Flower,
    Shrub,
    Tree,
    Rock,
    Hill,
    Mountain,
    Water,
    Road,
    Bridge,
    Wall,
    Floor,
    Door,
    Gate,
    Settlement,
}

impl TileKind {
    pub const ALL: [TileKind; 16] = [
        TileKind::Grass,
        TileKind::TallGrass,
        TileKind::Flower,
        TileKind::Shrub,
        TileKind::Tree,
        TileKind::Rock,
        TileKind::Hill,
        TileKind::Mountain,
        TileKind::Water,
        TileKind::Road,
        TileKind::Bridge,
        TileKind::Wall,
        TileKind::Floor,
        TileKind::Door,
        TileKind::Gate,
        TileKind::Settlement,
    ];

    /// Whether actors can stand on this tile
    pub fn walkable(self) -> bool {
        !matches!(self, TileKind::Tree | TileKind::Mountain | TileKind::Water | TileKind::Wall)
    }

    /// Whether this tile blocks line of sight
    pub fn obstructs_view(self) -> bool {
        matches!(self, TileKind::Tree | TileKind::Mountain | TileKind::Wall | TileKind::Door)
    }

    /// Path weight for actors (walkable tiles only)
    pub fn weight(self) -> f32 {
        match self {
            TileKind::Road | TileKind::Bridge | TileKind::Gate | TileKind::Floor | TileKind::Door => 0.5,
            TileKind::Grass | TileKind::Flower | TileKind::Settlement => 1.0,
            TileKind::TallGrass | TileKind::Shrub => 1.5,
            TileKind::Rock | TileKind::Hill => 2.0,
            TileKind::Tree | TileKind::Mountain | TileKind::Water | TileKind::Wall => f32::INFINITY,
        }
    }
}

/// Glyph and colors for one tile kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub kind: TileKind,
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl TileDefinition {
    pub fn new(kind: TileKind, glyph: char, fg: Rgb, bg: Rgb) -> Self {
        Self { kind, glyph, fg, bg }
    }

    pub fn appearance(&self) -> TileAppearance {
        TileAppearance::new(self.glyph, self.fg, self.bg)
    }
}

/// Built-in tile table
pub fn default_tile_definitions() -> Vec<TileDefinition> {
    use TileKind::*;
    let ground = Rgb(58, 92, 44);
    vec![
        TileDefinition::new(Grass, '.', Rgb(96, 140, 72), ground),
        TileDefinition::new(TallGrass, '"', Rgb(120, 168, 80), ground),
        TileDefinition::new(Flower, '\'', Rgb(216, 200, 96), ground),
        TileDefinition::new(Shrub, ';', Rgb(72, 120, 56), ground),
        TileDefinition::new(Tree, '♣', Rgb(32, 96, 40), Rgb(36, 64, 30)),
        TileDefinition::new(Rock, '*', Rgb(150, 146, 138), Rgb(96, 90, 80)),
        TileDefinition::new(Hill, 'n', Rgb(136, 120, 80), Rgb(96, 104, 64)),
        TileDefinition::new(Mountain, '▲', Rgb(200, 200, 208), Rgb(104, 100, 96)),
        TileDefinition::new(Water, '~', Rgb(120, 168, 232), Rgb(40, 72, 152)),
        TileDefinition::new(Road, '=', Rgb(184, 160, 120), Rgb(120, 100, 72)),
        TileDefinition::new(Bridge, '≡', Rgb(160, 120, 72), Rgb(40, 72, 152)),
        TileDefinition::new(Wall, '#', Rgb(168, 160, 152), Rgb(88, 80, 72)),
        TileDefinition::new(Floor, '.', Rgb(160, 136, 104), Rgb(104, 84, 60)),
        TileDefinition::new(Door, '+', Rgb(200, 152, 88), Rgb(104, 84, 60)),
        TileDefinition::new(Gate, '/', Rgb(208, 184, 136), Rgb(120, 100, 72)),
        TileDefinition::new(Settlement, '⌂', Rgb(232, 208, 160), Rgb(120, 100, 72)),
    ]
}

/// Immutable lookup of tile definitions by kind.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    definitions: HashMap<TileKind, TileDefinition>,
}

impl TileCatalog {
    /// Build the catalog; every [`TileKind`] must be defined exactly once.
    pub fn from_definitions(definitions: &[TileDefinition]) -> GenResult<Self> {
        let mut map = HashMap::new();
        for def in definitions {
            if map.insert(def.kind, def.clone()).is_some() {
                return Err(GenError::Configuration(format!(
                    "tile {:?} is defined more than once",
                    def.kind
                )));
            }
        }

        if let Some(missing) = TileKind::ALL.iter().find(|k| !map.contains_key(k)) {
            return Err(GenError::Configuration(format!(
                "missing tile definition for {:?}",
                missing
            )));
        }

        Ok(Self { definitions: map })
    }

    pub fn definition(&self, kind: TileKind) -> &TileDefinition {
        // Completeness is checked at construction.
        &self.definitions[&kind]
    }

    pub fn appearance(&self, kind: TileKind) -> TileAppearance {
        self.definition(kind).appearance()
    }

    /// Handle for the kind with its configured colors.
    pub fn handle(&self, kind: TileKind, registry: &TileVariantRegistry) -> VariantHandle {
        registry.intern(&self.appearance(kind))
    }

    /// Handle for the kind drawn over a caller-chosen background.
    pub fn handle_on(&self, kind: TileKind, bg: Rgb, registry: &TileVariantRegistry) -> VariantHandle {
        registry.intern(&self.appearance(kind).with_bg(bg))
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        let definitions = default_tile_definitions()
            .into_iter()
            .map(|d| (d.kind, d))
            .collect();
        Self { definitions }
    }
}
