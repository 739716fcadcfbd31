//! Tile effect engine
//!
//! A play whose tile effects need player-chosen tiles becomes a
//! [`TileRequest`]. The selection is checked in full (count, duplicates,
//! unknown tiles, per-effect preconditions) before any tile is touched.

use crate::core::{
    CubeCoord, DevelopMode, ModifierKind, TargetScope, Tile, TileEffect, TileEffectKind, TileType,
    TownMap,
};
use crate::error::TileProblem;
use crate::game::validator::ValidatedPlay;
use crate::{EngineError, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Tiles a play is waiting for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRequest {
    /// Turn-line token that produced the request
    pub token: String,
    pub card_name: String,
    /// Tile-scoped effects in application order
    pub effects: Vec<TileEffect>,
    pub x: Option<i32>,
    pub demand: usize,
}

impl TileRequest {
    /// Build the request for a play, or `None` if it needs no tiles
    pub fn from_play(play: &ValidatedPlay) -> Option<Self> {
        let effects: Vec<TileEffect> = play
            .tile_effects()
            .into_iter()
            .filter(|e| e.scope == TargetScope::Tile && e.demand(play.x) > 0)
            .copied()
            .collect();
        let demand: usize = effects.iter().map(|e| e.demand(play.x)).sum();
        if demand == 0 {
            return None;
        }
        Some(TileRequest {
            token: play.play.raw.clone(),
            card_name: play.card.name.to_string(),
            effects,
            x: play.x,
            demand,
        })
    }

    /// Human-readable prompt describing what to select
    pub fn prompt(&self) -> String {
        let effects: Vec<String> = self
            .effects
            .iter()
            .map(|e| format!("{} x{}", e, e.demand(self.x)))
            .collect();
        format!(
            "{} ({}) needs {} tile(s): {}",
            self.card_name,
            self.token,
            self.demand,
            effects.join(", ")
        )
    }

    /// Pair each effect with the tiles it consumes, in selection order
    fn assign<'a>(&'a self, coords: &'a [CubeCoord]) -> impl Iterator<Item = (&'a TileEffect, CubeCoord)> + 'a {
        let mut remaining = coords.iter().copied();
        self.effects.iter().flat_map(move |effect| {
            let n = effect.demand(self.x);
            remaining
                .by_ref()
                .take(n)
                .collect::<Vec<_>>()
                .into_iter()
                .map(move |c| (effect, c))
        })
    }
}

/// Check an effect's positional precondition against a tile
pub fn check_precondition(effect: &TileEffect, tile: &Tile) -> std::result::Result<(), String> {
    let kind = effect.kind;
    if tile.destroyed && kind != TileEffectKind::BuildingDevelop {
        return Err(match kind {
            TileEffectKind::FuelDelta => "Cannot change fuel on destroyed tiles.".to_string(),
            _ => format!("{kind} cannot target destroyed tiles."),
        });
    }

    match kind {
        TileEffectKind::FuelDelta | TileEffectKind::SpreadModifier => {
            if tile.tile_type == TileType::WaterBody {
                return Err(match kind {
                    TileEffectKind::FuelDelta => {
                        "Cannot change fuel on WATERBODY tiles.".to_string()
                    }
                    _ => format!("{kind} cannot target WATERBODY tiles."),
                });
            }
        }
        TileEffectKind::FireReduce => {
            if !tile.is_burning() {
                return Err("FireReduce requires a tile that is currently on fire.".to_string());
            }
            if effect.stage != 0 && i32::from(tile.fire_level()) != effect.stage {
                return Err(format!(
                    "FireReduce(s={0}) requires fire stage {0}.",
                    effect.stage
                ));
            }
        }
        TileEffectKind::FireImmune => {
            if tile.is_burning() {
                return Err("FireImmune requires tile NOT currently on fire.".to_string());
            }
        }
        TileEffectKind::PreventSpread => {
            if !tile.is_burning() {
                return Err("PreventSpread requires tile currently on fire.".to_string());
            }
        }
        TileEffectKind::BuildingDevelop => {
            if tile.tile_type != TileType::Building {
                return Err("BuildingDevelop requires BUILDING tiles.".to_string());
            }
            match DevelopMode::from_value(effect.value) {
                Some(DevelopMode::Build) if !tile.destroyed => {
                    return Err("BuildingDevelop(1) Build requires destroyed==true.".to_string())
                }
                Some(DevelopMode::Repair) if !tile.damaged => {
                    return Err("BuildingDevelop(2) Repair requires damaged==true.".to_string())
                }
                Some(DevelopMode::Upgrade) if tile.destroyed => {
                    return Err(
                        "BuildingDevelop(3) Upgrade cannot target destroyed buildings.".to_string(),
                    )
                }
                Some(_) => {}
                None => {
                    return Err(format!(
                        "BuildingDevelop mode {} is not 1 (build), 2 (repair) or 3 (upgrade).",
                        effect.value
                    ))
                }
            }
        }
    }
    Ok(())
}

/// Mutate a tile; the precondition must already hold
pub fn apply_effect(effect: &TileEffect, tile: &mut Tile) {
    match effect.kind {
        TileEffectKind::FuelDelta => tile.adjust_fuel(effect.value),
        TileEffectKind::FireReduce => {
            if effect.stage == 0 || i32::from(tile.fire_level()) == effect.stage {
                tile.adjust_fire(effect.value);
            }
        }
        TileEffectKind::SpreadModifier => {
            tile.add_modifier(ModifierKind::Spread(effect.value), effect.duration)
        }
        TileEffectKind::FireImmune => tile.add_modifier(ModifierKind::FireImmune, effect.duration),
        TileEffectKind::PreventSpread => {
            tile.add_modifier(ModifierKind::PreventSpread, effect.duration)
        }
        TileEffectKind::BuildingDevelop => match DevelopMode::from_value(effect.value) {
            Some(DevelopMode::Build) => tile.destroyed = false,
            Some(DevelopMode::Repair) => tile.damaged = false,
            Some(DevelopMode::Upgrade) => {
                tile.upgrade();
            }
            None => {}
        },
    }
}

/// Check that some selection on `map` could satisfy `request`
///
/// The demand must fit on the map, and every effect needs at least as many
/// tiles passing its precondition as it consumes.
pub fn check_feasible(request: &TileRequest, map: &TownMap) -> std::result::Result<(), String> {
    if request.demand > map.len() {
        return Err(format!(
            "Card needs {} tile(s) but the map has only {}.",
            request.demand,
            map.len()
        ));
    }
    for effect in &request.effects {
        let needed = effect.demand(request.x);
        let eligible = map
            .iter_sorted()
            .filter(|(_, tile)| check_precondition(effect, tile).is_ok())
            .count();
        if eligible < needed {
            return Err(format!(
                "{} needs {needed} tile(s) but only {eligible} tile(s) qualify.",
                effect.kind
            ));
        }
    }
    Ok(())
}

/// Reject plays whose tile requests could never be answered on `map`
pub fn check_tile_demand(
    plays: &[ValidatedPlay],
    map: &TownMap,
) -> std::result::Result<(), Vec<EngineError>> {
    let errors: Vec<EngineError> = plays
        .iter()
        .filter_map(|play| {
            let request = TileRequest::from_play(play)?;
            let reason = check_feasible(&request, map).err()?;
            Some(EngineError::SelectorMismatch {
                index: play.play.index,
                token: play.play.raw.clone(),
                reason,
            })
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a selection for `request` without mutating anything
///
/// Checks run in order: count, then duplicates and unknown tiles, then each
/// effect's precondition. The first failure is returned.
pub fn validate_selection(
    request: &TileRequest,
    map: &TownMap,
    coords: &[CubeCoord],
) -> Result<()> {
    if coords.len() != request.demand {
        return Err(EngineError::TileDemandMismatch {
            expected: request.demand,
            got: coords.len(),
        });
    }

    let mut seen = FxHashSet::default();
    for &coord in coords {
        if !seen.insert(coord) {
            return Err(EngineError::DuplicateOrUnknownTile {
                coord,
                problem: TileProblem::Duplicate,
            });
        }
        if !map.contains(coord) {
            return Err(EngineError::DuplicateOrUnknownTile {
                coord,
                problem: TileProblem::Unknown,
            });
        }
    }

    for (effect, coord) in request.assign(coords) {
        let tile = map.get(coord).ok_or(EngineError::DuplicateOrUnknownTile {
            coord,
            problem: TileProblem::Unknown,
        })?;
        check_precondition(effect, tile)
            .map_err(|reason| EngineError::TilePrecondition { coord, reason })?;
    }
    Ok(())
}

/// Validate then apply a selection; on error the map is untouched
pub fn resolve_selection(
    request: &TileRequest,
    map: &mut TownMap,
    coords: &[CubeCoord],
) -> Result<Vec<(TileEffect, CubeCoord)>> {
    validate_selection(request, map, coords)?;
    let mut applied = Vec::with_capacity(coords.len());
    for (effect, coord) in request.assign(coords) {
        if let Some(tile) = map.get_mut(coord) {
            apply_effect(effect, tile);
            applied.push((*effect, coord));
        }
    }
    Ok(applied)
}

/// Apply a class or global effect to every qualifying tile, skipping tiles
/// whose precondition fails; returns the tiles touched
pub fn apply_scoped(effect: &TileEffect, map: &mut TownMap) -> Vec<CubeCoord> {
    let targets: Vec<CubeCoord> = map
        .iter_sorted()
        .filter(|(_, tile)| match effect.scope {
            TargetScope::Tile => false,
            TargetScope::Class(t) => tile.tile_type == t,
            TargetScope::Global => true,
        })
        .filter(|(_, tile)| check_precondition(effect, tile).is_ok())
        .map(|(c, _)| c)
        .collect();

    for &coord in &targets {
        if let Some(tile) = map.get_mut(coord) {
            apply_effect(effect, tile);
        }
    }
    targets
}
