//! Core game types: cards, effects, resources and the hex map

pub mod card;
pub mod effects;
pub mod hex;
pub mod map;
pub mod resources;
pub mod tile;
pub mod types;

pub use card::CardDefinition;
pub use effects::{
    applicable, DevelopMode, EffectBlock, Gate, Keyword, Phase, ResourceEffect, TargetScope,
    TileEffect, TileEffectKind, ValueMode,
};
pub use hex::{parse_coord_list, CubeCoord};
pub use map::{MapStatistics, TownMap};
pub use resources::{ResourceKind, ResourceSnapshot, StartingResources, TownResources};
pub use tile::{ModifierKind, Tile, TileModifier, TileType, MAX_FIRE_LEVEL, MAX_TILE_FUEL};
pub use types::{CardCode, CardName, Role};
