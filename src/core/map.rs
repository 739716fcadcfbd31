//! The town's hex map
//!
//! Tiles are keyed by cube coordinate. Anything that feeds reported output
//! walks the tiles in sorted coordinate order so runs are reproducible.

use crate::core::{CubeCoord, Tile, TileType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Counts the end-of-game checks and grading read from the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapStatistics {
    pub total_cultural_sites: u32,
    pub destroyed_cultural_sites: u32,
    pub total_buildings: u32,
    /// Damaged but still standing
    pub damaged_buildings: u32,
    pub destroyed_buildings: u32,
}

struct TileTemplate {
    name: &'static str,
    tile_type: TileType,
    fuel: u8,
    upgrades: &'static [TileType],
}

const fn template(
    name: &'static str,
    tile_type: TileType,
    fuel: u8,
    upgrades: &'static [TileType],
) -> TileTemplate {
    TileTemplate {
        name,
        tile_type,
        fuel,
        upgrades,
    }
}

/// Standard layout in spiral order (centre, ring 1, ring 2)
const STANDARD_LAYOUT: [TileTemplate; 19] = [
    template("Town Center", TileType::Building, 1, &[]),
    template("River", TileType::WaterBody, 0, &[]),
    template("School", TileType::Building, 1, &[]),
    template("Grassland", TileType::Grassland, 3, &[TileType::Farmland]),
    template("Houses", TileType::Building, 2, &[]),
    template("Indigenous Land", TileType::Forest, 3, &[]),
    template("Farmland", TileType::Farmland, 2, &[TileType::Building]),
    template("Fire Station", TileType::Building, 1, &[]),
    template("Hospital", TileType::Building, 1, &[]),
    template("Forest", TileType::Forest, 4, &[]),
    template("Grassland", TileType::Grassland, 3, &[TileType::Farmland]),
    template("Indigenous Land", TileType::Forest, 3, &[]),
    template("Farmland", TileType::Farmland, 2, &[TileType::Building]),
    template("Forest", TileType::Forest, 4, &[]),
    template("Groundland", TileType::Groundland, 1, &[TileType::Building]),
    template("Houses", TileType::Building, 2, &[]),
    template("Indigenous Land", TileType::Forest, 3, &[]),
    template("Forest", TileType::Forest, 4, &[]),
    template("Grassland", TileType::Grassland, 3, &[TileType::Farmland]),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TownMap {
    #[serde(with = "sorted_tiles")]
    tiles: FxHashMap<CubeCoord, Tile>,
}

/// JSON object keys must be strings, so tiles travel as a sorted list of
/// `[coord, tile]` pairs
mod sorted_tiles {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        tiles: &FxHashMap<CubeCoord, Tile>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut entries: Vec<_> = tiles.iter().collect();
        entries.sort_unstable_by_key(|(c, _)| **c);
        serializer.collect_seq(entries)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<FxHashMap<CubeCoord, Tile>, D::Error> {
        let entries: Vec<(CubeCoord, Tile)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl TownMap {
    pub fn new() -> Self {
        TownMap {
            tiles: FxHashMap::default(),
        }
    }

    /// Build the standard town: a hex of `radius` rings filled from the
    /// fixed template order, repeating it for maps larger than radius 2
    pub fn generate_standard(radius: u32) -> Self {
        let mut map = TownMap::new();
        let coords = CubeCoord::ORIGIN.spiral(radius as i32);
        for (i, coord) in coords.into_iter().enumerate() {
            let t = &STANDARD_LAYOUT[i % STANDARD_LAYOUT.len()];
            let tile = Tile::new(t.name, t.tile_type, t.fuel).with_upgrades(t.upgrades.to_vec());
            map.insert(coord, tile);
        }
        map
    }

    pub fn insert(&mut self, coord: CubeCoord, tile: Tile) -> Option<Tile> {
        self.tiles.insert(coord, tile)
    }

    pub fn get(&self, coord: CubeCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn get_mut(&mut self, coord: CubeCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub fn contains(&self, coord: CubeCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All coordinates, sorted
    pub fn coords(&self) -> Vec<CubeCoord> {
        let mut coords: Vec<_> = self.tiles.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Tiles in sorted coordinate order
    pub fn iter_sorted(&self) -> impl Iterator<Item = (CubeCoord, &Tile)> {
        self.coords()
            .into_iter()
            .filter_map(move |c| self.tiles.get(&c).map(|t| (c, t)))
    }

    /// Coordinates of tiles with a fire level above zero, sorted
    pub fn burning(&self) -> Vec<CubeCoord> {
        let mut coords: Vec<_> = self
            .tiles
            .iter()
            .filter(|(_, t)| t.is_burning())
            .map(|(c, _)| *c)
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Mean fuel load across every tile (0.0 for an empty map)
    pub fn average_fuel_load(&self) -> f32 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let total: u32 = self.tiles.values().map(|t| u32::from(t.fuel_load())).sum();
        total as f32 / self.tiles.len() as f32
    }

    /// Cultural sites are tiles whose name matches `cultural_site_name`
    /// (trimmed, case-insensitive)
    pub fn statistics(&self, cultural_site_name: &str) -> MapStatistics {
        let wanted = cultural_site_name.trim().to_lowercase();
        let mut stats = MapStatistics::default();
        for tile in self.tiles.values() {
            if tile.name.trim().to_lowercase() == wanted {
                stats.total_cultural_sites += 1;
                if tile.destroyed {
                    stats.destroyed_cultural_sites += 1;
                }
            }
            if tile.tile_type == TileType::Building {
                stats.total_buildings += 1;
                if tile.destroyed {
                    stats.destroyed_buildings += 1;
                } else if tile.damaged {
                    stats.damaged_buildings += 1;
                }
            }
        }
        stats
    }

    /// Count every tile modifier down by one turn; returns how many expired
    pub fn tick_modifiers(&mut self) -> usize {
        self.tiles.values_mut().map(|t| t.tick_modifiers()).sum()
    }
}
