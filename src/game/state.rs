//! Game state handle
//!
//! `GameState` owns everything a running game mutates: town resources, the
//! map, the turn log, pending tile requests, the fire RNG and the logger. It
//! is passed explicitly to whoever drives the game; nothing here is global.

use crate::config::EngineConfig;
use crate::core::{
    CardCode, CubeCoord, MapStatistics, ResourceKind, ResourceSnapshot, TargetScope, TileEffect,
    TownMap, TownResources,
};
use crate::game::fire_chain::{longest_fire_chain, FireChain};
use crate::game::grading::{self, EndConditions, GradeReport, PlayStatistics};
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::game::resolver::{apply_resource_effects, ResourceChange};
use crate::game::simulation::{self, FireStepReport};
use crate::game::tile_engine::{apply_scoped, check_tile_demand, resolve_selection, TileRequest};
use crate::game::token::parse_turn_line;
use crate::game::turn_log::TurnLog;
use crate::game::validator::{validate_turn, ValidatedPlay};
use crate::loader::CardCatalog;
use crate::{EngineError, Result, TurnRejection};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Per-tile detail that costs a `format!` per tile; compiled out without
/// the verbose-logging feature
macro_rules! log_tile_detail {
    ($logger:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            if $logger.enabled(VerbosityLevel::Verbose) {
                $logger.log(VerbosityLevel::Verbose, Some("tile_fx"), &format!($($arg)*));
            }
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}

/// What one accepted play did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub token: String,
    pub code: CardCode,
    pub name: String,
    pub changes: Vec<ResourceChange>,
    /// Tiles hit by class-wide or map-wide tile effects
    pub scoped_tiles: Vec<CubeCoord>,
    /// Tiles the player still has to choose for this play
    pub tile_demand: usize,
}

/// Result of an accepted turn line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub turn: u32,
    pub plays: Vec<PlaySummary>,
    pub before: ResourceSnapshot,
    pub after: ResourceSnapshot,
    pub pending_tile_requests: usize,
}

impl TurnSummary {
    /// Net applied delta per resource across every play
    pub fn total_delta(&self, resource: ResourceKind) -> i32 {
        self.plays
            .iter()
            .flat_map(|p| &p.changes)
            .filter(|c| c.resource == resource)
            .map(|c| c.applied)
            .sum()
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Turn {} accepted: {} play(s)",
            self.turn,
            self.plays.len()
        )];
        for play in &self.plays {
            let deltas: Vec<String> = play
                .changes
                .iter()
                .map(|c| format!("{} {:+}", c.resource, c.applied))
                .collect();
            let mut line = format!("  {} {}", play.token, play.name);
            if !deltas.is_empty() {
                line.push_str(&format!(": {}", deltas.join(", ")));
            }
            if !play.scoped_tiles.is_empty() {
                line.push_str(&format!(" [{} tile(s) affected]", play.scoped_tiles.len()));
            }
            if play.tile_demand > 0 {
                line.push_str(&format!(" [needs {} tile(s)]", play.tile_demand));
            }
            lines.push(line);
        }
        lines.push(ResourceSnapshot::summary(&self.before, &self.after));
        if self.pending_tile_requests > 0 {
            lines.push(format!(
                "Pending tile requests: {}",
                self.pending_tile_requests
            ));
        }
        lines.join("\n")
    }
}

/// Result of a tile selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileResolution {
    pub token: String,
    pub card_name: String,
    /// Effects in application order with the tile each one hit
    pub applied: Vec<(TileEffect, CubeCoord)>,
    pub remaining_requests: usize,
    pub before: ResourceSnapshot,
    pub after: ResourceSnapshot,
}

impl TileResolution {
    pub fn render(&self) -> String {
        let mut lines = vec![format!("{} ({}) resolved:", self.card_name, self.token)];
        lines.extend(
            self.applied
                .iter()
                .map(|(effect, coord)| format!("  {effect} -> {coord}")),
        );
        if self.before != self.after {
            lines.push(ResourceSnapshot::summary(&self.before, &self.after));
        }
        lines.push(format!("Pending tile requests: {}", self.remaining_requests));
        lines.join("\n")
    }
}

/// Serializable view used by the `state` command
#[derive(Debug, Serialize)]
pub struct StateView<'a> {
    pub turn: u32,
    pub town: &'a TownResources,
    pub map: &'a TownMap,
    pub pending: Vec<&'a TileRequest>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    config: EngineConfig,
    catalog: Arc<CardCatalog>,
    town: TownResources,
    map: TownMap,
    turn_log: TurnLog,
    /// Current turn, starting at 1
    turn: u32,
    pending: VecDeque<TileRequest>,
    /// Drives the fire step; reseed with [`GameState::seed_rng`]
    rng: ChaCha12Rng,
    pub logger: GameLogger,
}

impl GameState {
    /// Fresh game with the standard map and the configured starting values
    pub fn new(catalog: Arc<CardCatalog>, config: EngineConfig) -> Self {
        GameState {
            town: TownResources::new(&config.resources),
            map: TownMap::generate_standard(config.map_radius),
            turn_log: TurnLog::new(),
            turn: 1,
            pending: VecDeque::new(),
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            logger: GameLogger::with_verbosity(config.verbosity),
            catalog,
            config,
        }
    }

    /// Replace the generated map
    pub fn with_map(mut self, map: TownMap) -> Self {
        self.map = map;
        self
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn town(&self) -> &TownResources {
        &self.town
    }

    pub fn map(&self) -> &TownMap {
        &self.map
    }

    pub fn turn_log(&self) -> &TurnLog {
        &self.turn_log
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The tile request the next `submit_tiles` call answers
    pub fn current_tile_request(&self) -> Option<&TileRequest> {
        self.pending.front()
    }

    pub fn pending_tile_requests(&self) -> usize {
        self.pending.len()
    }

    fn ensure_no_pending(&self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(EngineError::TilesPending {
                remaining: self.pending.len(),
            })
        }
    }

    /// Pull average fuel from the map and recompute the fire-safety rating
    fn refresh_derived(&mut self) {
        self.town.set_average_fuel_load(self.map.average_fuel_load());
        self.town.recalculate_fire_safety();
    }

    /// Parse, validate and apply one turn line
    ///
    /// Validation runs over the whole line first. If any token fails, every
    /// error is returned and nothing changes. A play is also rejected when
    /// its tile demand could not be met on the map as it stands before the
    /// line applies. Accepted plays apply their
    /// resource effects in order, class-wide and map-wide tile effects hit
    /// every qualifying tile, and tile-targeted effects are queued as tile
    /// requests.
    pub fn submit_turn(&mut self, line: &str) -> std::result::Result<TurnSummary, TurnRejection> {
        self.ensure_no_pending().map_err(TurnRejection::single)?;
        let plays = validate_turn(parse_turn_line(line), &self.catalog)
            .and_then(|plays| check_tile_demand(&plays, &self.map).map(|()| plays))
            .map_err(|errors| {
                self.logger.log(
                    VerbosityLevel::Normal,
                    Some("turn"),
                    &format!("Turn {} rejected with {} error(s)", self.turn, errors.len()),
                );
                TurnRejection::new(errors)
            })?;

        let before = self.town.snapshot();
        let summaries: Vec<PlaySummary> = plays.iter().map(|play| self.apply_play(play)).collect();
        self.turn_log
            .record(self.turn, plays.iter().map(|p| p.play.raw.clone()));
        self.refresh_derived();
        let after = self.town.snapshot();

        let summary = TurnSummary {
            turn: self.turn,
            plays: summaries,
            before,
            after,
            pending_tile_requests: self.pending.len(),
        };
        self.logger.log(
            VerbosityLevel::Normal,
            Some("turn"),
            &format!(
                "Turn {}: {}",
                self.turn,
                plays
                    .iter()
                    .map(|p| p.play.raw.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
        for line in ResourceSnapshot::summary(&before, &after).lines() {
            self.logger.log(VerbosityLevel::Normal, Some("turn"), line);
        }
        Ok(summary)
    }

    fn apply_play(&mut self, play: &ValidatedPlay) -> PlaySummary {
        let changes = apply_resource_effects(play, &mut self.town);
        for change in &changes {
            self.logger.log(
                VerbosityLevel::Verbose,
                Some("turn"),
                &format!(
                    "{}: {} {:+} (requested {:+})",
                    play.play.raw, change.resource, change.applied, change.requested
                ),
            );
        }

        let mut scoped_tiles = Vec::new();
        for effect in play.tile_effects() {
            if effect.scope == TargetScope::Tile {
                continue;
            }
            let touched = apply_scoped(effect, &mut self.map);
            for coord in &touched {
                log_tile_detail!(self.logger, "{}: {} -> {}", play.play.raw, effect, coord);
            }
            scoped_tiles.extend(touched);
        }

        let request = TileRequest::from_play(play);
        let tile_demand = request.as_ref().map_or(0, |r| r.demand);
        if let Some(request) = request {
            self.logger
                .log(VerbosityLevel::Normal, Some("tile_fx"), &request.prompt());
            self.pending.push_back(request);
        }

        PlaySummary {
            token: play.play.raw.clone(),
            code: play.card.code.clone(),
            name: play.card.name.to_string(),
            changes,
            scoped_tiles,
            tile_demand,
        }
    }

    /// Answer the current tile request
    ///
    /// The selection is validated in full first; on any error the map and
    /// the request queue are unchanged.
    pub fn submit_tiles(&mut self, coords: &[CubeCoord]) -> Result<TileResolution> {
        let Some(request) = self.pending.front() else {
            return Err(EngineError::NoPendingTiles);
        };
        let before = self.town.snapshot();
        let applied = resolve_selection(request, &mut self.map, coords)?;
        for (effect, coord) in &applied {
            log_tile_detail!(self.logger, "{}: {} -> {}", request.token, effect, coord);
        }
        let token = request.token.clone();
        let card_name = request.card_name.clone();
        self.pending.pop_front();
        self.refresh_derived();

        self.logger.log(
            VerbosityLevel::Normal,
            Some("tile_fx"),
            &format!("{card_name} ({token}) applied to {} tile(s)", applied.len()),
        );
        Ok(TileResolution {
            token,
            card_name,
            applied,
            remaining_requests: self.pending.len(),
            before,
            after: self.town.snapshot(),
        })
    }

    /// Drop the current tile request without touching the map
    ///
    /// The play's resource effects and scoped tile effects were committed
    /// with its turn line and stay applied; only the targeted tile effects
    /// are forfeited.
    pub fn cancel_tiles(&mut self) -> Result<TileRequest> {
        let request = self.pending.pop_front().ok_or(EngineError::NoPendingTiles)?;
        self.logger.log(
            VerbosityLevel::Normal,
            Some("tile_fx"),
            &format!(
                "{} ({}) skipped, {} tile(s) forfeited",
                request.card_name, request.token, request.demand
            ),
        );
        Ok(request)
    }

    /// Close the current turn; timed tile modifiers count down by one
    pub fn advance_turn(&mut self) -> Result<u32> {
        self.ensure_no_pending()?;
        let expired = self.map.tick_modifiers();
        self.turn += 1;
        self.logger.log(
            VerbosityLevel::Normal,
            Some("turn"),
            &format!("Turn {} begins ({expired} modifier(s) expired)", self.turn),
        );
        Ok(self.turn)
    }

    /// Roll ignition, spread and escalation once
    pub fn run_fire_step(&mut self) -> Result<FireStepReport> {
        self.ensure_no_pending()?;
        let report = simulation::run_fire_step(
            &mut self.map,
            self.town.fire_safety_rating(),
            &self.config.fire,
            &mut self.rng,
        );
        self.refresh_derived();
        for line in report.render().lines() {
            self.logger.log(VerbosityLevel::Normal, Some("fire"), line);
        }
        Ok(report)
    }

    pub fn fire_chain(&self) -> FireChain {
        longest_fire_chain(&self.map)
    }

    pub fn map_statistics(&self) -> MapStatistics {
        self.map.statistics(&self.config.grading.cultural_site_name)
    }

    /// Closed turns, plus the current one once it has a play
    pub fn turns_played(&self) -> u32 {
        if self.turn_log.tokens(self.turn).is_empty() {
            self.turn - 1
        } else {
            self.turn
        }
    }

    pub fn play_statistics(&self) -> PlayStatistics {
        PlayStatistics::from_turn_log(&self.turn_log, &self.catalog, self.turns_played())
    }

    pub fn end_conditions(&self) -> EndConditions {
        EndConditions::evaluate(
            &self.map_statistics(),
            &self.fire_chain(),
            &self.config.end_conditions,
        )
    }

    pub fn grade_report(&self) -> GradeReport {
        let report = grading::evaluate(
            &self.town,
            &self.play_statistics(),
            &self.map_statistics(),
            &self.fire_chain(),
            &self.config.grading,
            &self.config.end_conditions,
        );
        self.logger.log(
            VerbosityLevel::Minimal,
            Some("grade"),
            &format!("Final score {:.1} ({})", report.final_score, report.letter),
        );
        report
    }

    pub fn view(&self) -> StateView<'_> {
        StateView {
            turn: self.turn,
            town: &self.town,
            map: &self.map,
            pending: self.pending.iter().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.view())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Tile, TileType};

    const CARDS: &str = "\
ID:F10
Name:Equipment Drive
AP:1
Effects:Happiness:+1 | (P) Provisions:+2 | (B) FirefightingEquipment:-X

ID:B02
Name:Hazard Reduction
AP:2
Keywords:Preparation
TileEffects:FuelDelta(-2,0,1,2)

ID:C03
Name:Firebreaks
AP:1
TileEffects:FuelDelta(-1,0,0,0)@Grassland

ID:B05
Name:Knockdown
AP:2
Effects:Happiness:+1
TileEffects:FireReduce(-1,0,-1,0)
";

    fn game() -> GameState {
        let catalog = Arc::new(CardCatalog::from_text(CARDS).unwrap());
        let mut game = GameState::new(catalog, EngineConfig::default());
        game.logger.enable_capture();
        game
    }

    #[test]
    fn test_rejected_turn_changes_nothing() {
        let mut game = game();
        let before = game.town().clone();
        let rejection = game.submit_turn("F10(P), Z99, F10").unwrap_err();
        assert_eq!(rejection.len(), 2);
        assert_eq!(game.town(), &before);
        assert!(game.turn_log().is_empty());
    }

    #[test]
    fn test_turn_applies_resources_and_logs_tokens() {
        let mut game = game();
        let summary = game.submit_turn("#F10(B)(3), F10(P)").unwrap();
        assert_eq!(summary.total_delta(ResourceKind::FirefightingEquipment), -2);
        assert_eq!(summary.plays[0].changes[1].requested, -3);
        assert_eq!(game.town().happiness(), 17);
        assert_eq!(game.town().provisions(), 14);
        assert_eq!(game.turn_log().tokens(1), ["#F10(B)(3)", "F10(P)"]);
        assert!(summary.render().contains("Turn 1 accepted: 2 play(s)"));
    }

    #[test]
    fn test_tile_request_flow() {
        let mut game = game();
        let summary = game.submit_turn("B02").unwrap();
        assert_eq!(summary.pending_tile_requests, 1);
        assert!(matches!(
            game.submit_turn("F10(P)"),
            Err(ref r) if matches!(r.errors[0], EngineError::TilesPending { remaining: 1 })
        ));
        assert!(matches!(
            game.advance_turn(),
            Err(EngineError::TilesPending { .. })
        ));

        let forest = CubeCoord::from_axial(0, 0);
        let map = game.map().clone();
        let err = game.submit_tiles(&[forest, CubeCoord::from_axial(1, 0)]).unwrap_err();
        assert!(matches!(err, EngineError::TileDemandMismatch { expected: 1, got: 2 }));
        assert_eq!(game.map(), &map);
        assert_eq!(game.pending_tile_requests(), 1);

        let resolution = game.submit_tiles(&[forest]).unwrap();
        assert_eq!(resolution.remaining_requests, 0);
        assert_eq!(game.map().get(forest).unwrap().fuel_load(), 0);
        assert!(matches!(game.submit_tiles(&[forest]), Err(EngineError::NoPendingTiles)));
        assert_eq!(game.advance_turn().unwrap(), 2);
    }

    #[test]
    fn test_unanswerable_tile_demand_is_rejected() {
        let mut game = game();
        let before = game.town().clone();

        let rejection = game.submit_turn("F10(P), B05(X=25)").unwrap_err();
        assert!(matches!(
            rejection.errors[..],
            [EngineError::SelectorMismatch { index: 2, .. }]
        ));
        assert!(rejection.to_string().contains("map has only 19"));

        // Nothing is burning on a fresh map
        let rejection = game.submit_turn("B05(1)").unwrap_err();
        assert!(rejection.to_string().contains("only 0 tile(s) qualify"));

        assert_eq!(game.town(), &before);
        assert_eq!(game.pending_tile_requests(), 0);
        assert!(game.turn_log().is_empty());
        assert_eq!(game.advance_turn().unwrap(), 2);
    }

    #[test]
    fn test_cancel_tiles_keeps_resource_effects() {
        let mut game = game();
        let fire = CubeCoord::from_axial(1, 0);
        game.map.get_mut(fire).unwrap().set_fire_level(1);
        game.submit_turn("B05(1), B02").unwrap();
        assert_eq!(game.pending_tile_requests(), 2);

        // Another play put the fire out first
        game.map.get_mut(fire).unwrap().set_fire_level(0);
        let map = game.map().clone();
        assert!(matches!(
            game.submit_tiles(&[fire]),
            Err(EngineError::TilePrecondition { .. })
        ));

        let skipped = game.cancel_tiles().unwrap();
        assert_eq!(skipped.token, "B05(1)");
        assert_eq!(game.map(), &map);
        assert_eq!(game.town().happiness(), 16);
        assert_eq!(game.pending_tile_requests(), 1);
        assert_eq!(game.current_tile_request().unwrap().token, "B02");

        game.cancel_tiles().unwrap();
        assert!(matches!(game.cancel_tiles(), Err(EngineError::NoPendingTiles)));
        assert!(game.run_fire_step().is_ok());
        assert_eq!(game.advance_turn().unwrap(), 2);
    }

    #[test]
    fn test_turns_played_counts_idle_turns() {
        let mut game = game();
        assert_eq!(game.turns_played(), 0);
        game.submit_turn("F10(P)").unwrap();
        assert_eq!(game.turns_played(), 1);
        for _ in 0..3 {
            game.advance_turn().unwrap();
        }
        assert_eq!(game.turns_played(), 3);
        assert_eq!(game.play_statistics().total_turns, 3);
    }

    #[test]
    fn test_class_scoped_effect_hits_every_grassland() {
        let mut game = game();
        let grass: Vec<CubeCoord> = game
            .map()
            .iter_sorted()
            .filter(|(_, t)| t.tile_type == TileType::Grassland)
            .map(|(c, _)| c)
            .collect();
        let summary = game.submit_turn("C03").unwrap();
        assert_eq!(summary.plays[0].scoped_tiles, grass);
        assert_eq!(summary.pending_tile_requests, 0);
        for c in grass {
            assert_eq!(game.map().get(c).unwrap().fuel_load(), 2);
        }
    }

    #[test]
    fn test_fire_safety_follows_map_fuel() {
        let mut map = TownMap::new();
        for c in CubeCoord::ORIGIN.spiral(1) {
            map.insert(c, Tile::new("Forest", TileType::Forest, 4));
        }
        let catalog = Arc::new(CardCatalog::from_text(CARDS).unwrap());
        let mut game = GameState::new(catalog, EngineConfig::default()).with_map(map);
        game.submit_turn("F10(P)").unwrap();
        assert_eq!(game.town().average_fuel_load(), 4.0);
        // 20 + 40 + 8 - 4 - 4
        assert_eq!(game.town().fire_safety_rating(), 60);
    }

    #[test]
    fn test_state_json_round_trips_through_serde() {
        let game = game();
        let json = game.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["turn"], 1);
        assert_eq!(value["map"]["tiles"].as_array().unwrap().len(), 19);
    }
}
