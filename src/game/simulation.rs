//! Bushfire step
//!
//! One step runs three passes over the map in sorted coordinate order:
//! ignition, spread from tiles that were already burning, and escalation of
//! those same tiles. All randomness comes from the caller's RNG so a seeded
//! run replays exactly.

use crate::config::FireConfig;
use crate::core::{CubeCoord, Tile, TileType, TownMap, MAX_TILE_FUEL};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ignition bonus per point of spread modifier
const SPREAD_BONUS_WEIGHT: f64 = 0.05;

/// What changed during one fire step; every list is sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireStepReport {
    pub ignited: Vec<CubeCoord>,
    pub spread: Vec<CubeCoord>,
    pub escalated: Vec<CubeCoord>,
    pub damaged: Vec<CubeCoord>,
    pub destroyed: Vec<CubeCoord>,
}

impl FireStepReport {
    pub fn is_quiet(&self) -> bool {
        self.ignited.is_empty()
            && self.spread.is_empty()
            && self.escalated.is_empty()
            && self.damaged.is_empty()
            && self.destroyed.is_empty()
    }

    pub fn render(&self) -> String {
        let list = |coords: &[CubeCoord]| {
            if coords.is_empty() {
                "-".to_string()
            } else {
                coords
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        };
        [
            format!("Ignited: {}", list(&self.ignited)),
            format!("Spread: {}", list(&self.spread)),
            format!("Escalated: {}", list(&self.escalated)),
            format!("Damaged: {}", list(&self.damaged)),
            format!("Destroyed: {}", list(&self.destroyed)),
        ]
        .join("\n")
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// A tile that fire can newly take hold of
fn can_ignite(tile: &Tile) -> bool {
    !tile.is_burning()
        && !tile.destroyed
        && tile.tile_type != TileType::WaterBody
        && !tile.is_fire_immune()
}

/// Chance that a tile catches fire on its own this step
pub fn ignition_chance(tile: &Tile, fire_safety_rating: i32, config: &FireConfig) -> f64 {
    let fuel = f64::from(tile.fuel_load());
    probability(
        f64::from(fire_safety_rating) / 100.0 * 2.0 * config.burn_multiplier * fuel
            + SPREAD_BONUS_WEIGHT * f64::from(tile.spread_bonus()),
    )
}

/// Chance that a burning neighbour sets this tile alight
pub fn spread_chance(tile: &Tile, config: &FireConfig) -> f64 {
    probability(config.spread_chance * f64::from(tile.fuel_load()) / f64::from(MAX_TILE_FUEL))
}

/// Run one fire step against `map`
pub fn run_fire_step<R: Rng + ?Sized>(
    map: &mut TownMap,
    fire_safety_rating: i32,
    config: &FireConfig,
    rng: &mut R,
) -> FireStepReport {
    let mut report = FireStepReport::default();
    let already_burning: Vec<(CubeCoord, u8)> = map
        .iter_sorted()
        .filter(|(_, t)| t.is_burning())
        .map(|(c, t)| (c, t.fire_level()))
        .collect();

    for coord in map.coords() {
        let Some(tile) = map.get_mut(coord) else {
            continue;
        };
        if !can_ignite(tile) {
            continue;
        }
        if rng.gen_bool(ignition_chance(tile, fire_safety_rating, config)) {
            tile.set_fire_level(1);
            report.ignited.push(coord);
        }
    }

    for &(source, _) in &already_burning {
        if map.get(source).map_or(true, Tile::prevents_spread) {
            continue;
        }
        for next in source.neighbors() {
            let Some(tile) = map.get_mut(next) else {
                continue;
            };
            if !can_ignite(tile) {
                continue;
            }
            if rng.gen_bool(spread_chance(tile, config)) {
                tile.set_fire_level(1);
                report.spread.push(next);
            }
        }
    }

    for &(coord, stage) in &already_burning {
        let Some(tile) = map.get_mut(coord) else {
            continue;
        };
        if stage == 1 {
            tile.set_fire_level(2);
            report.escalated.push(coord);
            continue;
        }
        tile.adjust_fuel(-1);
        if tile.tile_type == TileType::Building && !tile.destroyed {
            if tile.damaged {
                tile.destroyed = true;
                report.destroyed.push(coord);
            } else {
                tile.damaged = true;
                report.damaged.push(coord);
            }
        }
        if tile.fuel_load() == 0 {
            if !tile.destroyed {
                tile.destroyed = true;
                report.destroyed.push(coord);
            }
            tile.set_fire_level(0);
        }
    }

    report.spread.sort_unstable();
    report.destroyed.sort_unstable();
    report
}
