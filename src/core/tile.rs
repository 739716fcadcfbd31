//! Map tiles and their timed modifiers

use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Terrain or land-use of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileType {
    Forest,
    Grassland,
    Groundland,
    Farmland,
    Building,
    WaterBody,
}

impl FromStr for TileType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forest" => Ok(TileType::Forest),
            "grassland" => Ok(TileType::Grassland),
            "groundland" => Ok(TileType::Groundland),
            "farmland" => Ok(TileType::Farmland),
            "building" => Ok(TileType::Building),
            "waterbody" | "water" => Ok(TileType::WaterBody),
            _ => Err(EngineError::InvalidCardFormat(format!(
                "Unknown tile type '{}'",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileType::Forest => "FOREST",
            TileType::Grassland => "GRASSLAND",
            TileType::Groundland => "GROUNDLAND",
            TileType::Farmland => "FARMLAND",
            TileType::Building => "BUILDING",
            TileType::WaterBody => "WATERBODY",
        };
        write!(f, "{name}")
    }
}

/// Highest fire stage
pub const MAX_FIRE_LEVEL: u8 = 2;
/// Highest fuel load a single tile can hold
pub const MAX_TILE_FUEL: u8 = 4;

/// Timed status placed on a tile by a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Tile cannot ignite
    FireImmune,
    /// Fire on this tile does not spread to neighbours
    PreventSpread,
    /// Added to the tile's ignition odds, in steps of 5%
    Spread(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileModifier {
    pub kind: ModifierKind,
    pub turns_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    pub tile_type: TileType,
    fire_level: u8,
    pub destroyed: bool,
    pub damaged: bool,
    fuel_load: u8,
    pub level: u32,
    /// Types this tile becomes on successive upgrades
    pub upgrades: Vec<TileType>,
    pub modifiers: SmallVec<[TileModifier; 2]>,
}

impl Tile {
    pub fn new(name: impl Into<String>, tile_type: TileType, fuel_load: u8) -> Self {
        Tile {
            name: name.into(),
            tile_type,
            fire_level: 0,
            destroyed: false,
            damaged: false,
            fuel_load: fuel_load.min(MAX_TILE_FUEL),
            level: 0,
            upgrades: Vec::new(),
            modifiers: SmallVec::new(),
        }
    }

    pub fn with_upgrades(mut self, upgrades: Vec<TileType>) -> Self {
        self.upgrades = upgrades;
        self
    }

    pub fn fire_level(&self) -> u8 {
        self.fire_level
    }

    pub fn fuel_load(&self) -> u8 {
        self.fuel_load
    }

    pub fn is_burning(&self) -> bool {
        self.fire_level > 0
    }

    pub fn set_fire_level(&mut self, level: i32) {
        self.fire_level = level.clamp(0, i32::from(MAX_FIRE_LEVEL)) as u8;
    }

    pub fn adjust_fire(&mut self, delta: i32) {
        self.set_fire_level(i32::from(self.fire_level) + delta);
    }

    pub fn adjust_fuel(&mut self, delta: i32) {
        let fuel = (i32::from(self.fuel_load) + delta).clamp(0, i32::from(MAX_TILE_FUEL));
        self.fuel_load = fuel as u8;
    }

    /// Advance along the upgrade path; returns false when it is exhausted
    pub fn upgrade(&mut self) -> bool {
        match self.upgrades.get(self.level as usize) {
            Some(&next) => {
                self.tile_type = next;
                self.level += 1;
                true
            }
            None => false,
        }
    }

    pub fn has_modifier(&self, pred: impl Fn(ModifierKind) -> bool) -> bool {
        self.modifiers.iter().any(|m| pred(m.kind))
    }

    pub fn is_fire_immune(&self) -> bool {
        self.has_modifier(|k| k == ModifierKind::FireImmune)
    }

    pub fn prevents_spread(&self) -> bool {
        self.has_modifier(|k| k == ModifierKind::PreventSpread)
    }

    /// Sum of active spread modifiers
    pub fn spread_bonus(&self) -> i32 {
        self.modifiers
            .iter()
            .map(|m| match m.kind {
                ModifierKind::Spread(v) => v,
                _ => 0,
            })
            .sum()
    }

    /// Attach a modifier; durations below one turn last one turn
    pub fn add_modifier(&mut self, kind: ModifierKind, duration: i32) {
        self.modifiers.push(TileModifier {
            kind,
            turns_remaining: duration.max(1) as u32,
        });
    }

    /// Count every modifier down by one turn, dropping expired ones
    pub fn tick_modifiers(&mut self) -> usize {
        for m in self.modifiers.iter_mut() {
            m.turns_remaining = m.turns_remaining.saturating_sub(1);
        }
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.turns_remaining > 0);
        before - self.modifiers.len()
    }
}
