//! Card effect types
//!
//! Effects are grouped into blocks; each block carries a gate saying when it
//! applies (always, in one phase, or on one outcome roll).

use crate::core::{ResourceKind, TileType};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Turn context a card is played in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Preparation,
    Bushfire,
}

impl Phase {
    /// Parse the single-letter selector used in turn tokens and card text
    pub fn from_letter(s: &str) -> Option<Phase> {
        match s {
            "P" | "p" => Some(Phase::Preparation),
            "B" | "b" => Some(Phase::Bushfire),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Phase::Preparation => 'P',
            Phase::Bushfire => 'B',
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Preparation => write!(f, "Preparation"),
            Phase::Bushfire => write!(f, "Bushfire"),
        }
    }
}

/// Card category used by grading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keyword {
    Preparation,
    Bushfire,
    Action,
    Operation,
    Cultural,
    Outreach,
}

impl Keyword {
    pub const ALL: [Keyword; 6] = [
        Keyword::Preparation,
        Keyword::Bushfire,
        Keyword::Action,
        Keyword::Operation,
        Keyword::Cultural,
        Keyword::Outreach,
    ];
}

impl FromStr for Keyword {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preparation" => Ok(Keyword::Preparation),
            "bushfire" => Ok(Keyword::Bushfire),
            "action" => Ok(Keyword::Action),
            "operation" => Ok(Keyword::Operation),
            "cultural" => Ok(Keyword::Cultural),
            "outreach" => Ok(Keyword::Outreach),
            _ => Err(EngineError::InvalidCardFormat(format!(
                "Unknown keyword '{}'",
                s.trim()
            ))),
        }
    }
}

/// How a resource effect's amount is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueMode {
    /// A literal signed amount
    Fixed(i32),
    /// The player's X input times this multiplier
    UseInput(i32),
}

/// A single resource change carried by a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEffect {
    pub resource: ResourceKind,
    pub mode: ValueMode,
}

impl ResourceEffect {
    pub fn fixed(resource: ResourceKind, amount: i32) -> Self {
        ResourceEffect {
            resource,
            mode: ValueMode::Fixed(amount),
        }
    }

    pub fn per_input(resource: ResourceKind, multiplier: i32) -> Self {
        ResourceEffect {
            resource,
            mode: ValueMode::UseInput(multiplier),
        }
    }

    pub fn uses_input(&self) -> bool {
        matches!(self.mode, ValueMode::UseInput(_))
    }

    /// Signed delta for the given X (absent X counts as 0)
    pub fn resolve(&self, x: Option<i32>) -> i32 {
        match self.mode {
            ValueMode::Fixed(amount) => amount,
            ValueMode::UseInput(multiplier) => x.unwrap_or(0).saturating_mul(multiplier),
        }
    }
}

/// Tile effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileEffectKind {
    FuelDelta,
    FireReduce,
    SpreadModifier,
    FireImmune,
    PreventSpread,
    BuildingDevelop,
}

impl FromStr for TileEffectKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fueldelta" => Ok(TileEffectKind::FuelDelta),
            "firereduce" => Ok(TileEffectKind::FireReduce),
            "spreadmodifier" | "ignite" => Ok(TileEffectKind::SpreadModifier),
            "fireimmune" | "fireimmunetile" => Ok(TileEffectKind::FireImmune),
            "preventspread" | "preventspreadtile" => Ok(TileEffectKind::PreventSpread),
            "buildingdevelop" => Ok(TileEffectKind::BuildingDevelop),
            _ => Err(EngineError::InvalidCardFormat(format!(
                "Unknown tile effect '{}'",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for TileEffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TileEffectKind::FuelDelta => "FuelDelta",
            TileEffectKind::FireReduce => "FireReduce",
            TileEffectKind::SpreadModifier => "SpreadModifier",
            TileEffectKind::FireImmune => "FireImmune",
            TileEffectKind::PreventSpread => "PreventSpread",
            TileEffectKind::BuildingDevelop => "BuildingDevelop",
        };
        write!(f, "{name}")
    }
}

/// Sub-mode of a `BuildingDevelop` effect, taken from its `v` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevelopMode {
    Build,
    Repair,
    Upgrade,
}

impl DevelopMode {
    pub fn from_value(v: i32) -> Option<DevelopMode> {
        match v {
            1 => Some(DevelopMode::Build),
            2 => Some(DevelopMode::Repair),
            3 => Some(DevelopMode::Upgrade),
            _ => None,
        }
    }
}

/// Which tiles a tile effect reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetScope {
    /// Player-selected tiles (`t` of them)
    #[default]
    Tile,
    /// Every tile of one type
    Class(TileType),
    /// Every tile on the map
    Global,
}

/// A tile-targeted effect with its `[v, s, t, d]` arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEffect {
    pub kind: TileEffectKind,
    /// Magnitude (or sub-mode for `BuildingDevelop`)
    pub value: i32,
    /// Fire-stage filter; 0 matches any stage
    pub stage: i32,
    /// Tile count; 0 skips the effect, -1 uses X
    pub count: i32,
    /// Duration in turns for timed modifiers
    pub duration: i32,
    pub scope: TargetScope,
}

impl TileEffect {
    pub fn new(kind: TileEffectKind, value: i32, stage: i32, count: i32, duration: i32) -> Self {
        TileEffect {
            kind,
            value,
            stage,
            count,
            duration,
            scope: TargetScope::Tile,
        }
    }

    pub fn with_scope(mut self, scope: TargetScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn uses_input(&self) -> bool {
        self.scope == TargetScope::Tile && self.count == -1
    }

    /// Number of player-selected tiles this effect needs
    pub fn demand(&self, x: Option<i32>) -> usize {
        if self.scope != TargetScope::Tile {
            return 0;
        }
        let count = if self.count == -1 {
            x.unwrap_or(0)
        } else {
            self.count
        };
        count.max(0) as usize
    }
}

impl fmt::Display for TileEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{},{},{})",
            self.kind, self.value, self.stage, self.count, self.duration
        )
    }
}

/// When an effect block applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    Base,
    Phase(Phase),
    Outcome(u8),
}

impl Gate {
    /// Resolution order tier: base, then phase, then outcome
    fn tier(self) -> u8 {
        match self {
            Gate::Base => 0,
            Gate::Phase(_) => 1,
            Gate::Outcome(_) => 2,
        }
    }

    pub fn applies(self, phase: Option<Phase>, outcome: Option<i32>) -> bool {
        match self {
            Gate::Base => true,
            Gate::Phase(p) => phase == Some(p),
            Gate::Outcome(n) => outcome == Some(i32::from(n)),
        }
    }
}

/// Effects sharing one gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectBlock<E> {
    pub gate: Gate,
    pub effects: Vec<E>,
}

impl<E> EffectBlock<E> {
    pub fn new(gate: Gate, effects: Vec<E>) -> Self {
        EffectBlock { gate, effects }
    }
}

/// Effects from `blocks` that apply, ordered base, phase, outcome
pub fn applicable<E>(
    blocks: &[EffectBlock<E>],
    phase: Option<Phase>,
    outcome: Option<i32>,
) -> Vec<&E> {
    let mut out = Vec::new();
    for tier in 0..3 {
        for block in blocks
            .iter()
            .filter(|b| b.gate.tier() == tier && b.gate.applies(phase, outcome))
        {
            out.extend(block.effects.iter());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_modes() {
        let fixed = ResourceEffect::fixed(ResourceKind::Happiness, 2);
        assert_eq!(fixed.resolve(Some(9)), 2);

        let input = ResourceEffect::per_input(ResourceKind::FirefightingEquipment, -1);
        assert_eq!(input.resolve(Some(3)), -3);
        assert_eq!(input.resolve(None), 0);
    }

    #[test]
    fn test_applicable_orders_base_phase_outcome() {
        let blocks = vec![
            EffectBlock::new(Gate::Outcome(2), vec!["o2"]),
            EffectBlock::new(Gate::Phase(Phase::Bushfire), vec!["b"]),
            EffectBlock::new(Gate::Base, vec!["base"]),
            EffectBlock::new(Gate::Phase(Phase::Preparation), vec!["p"]),
        ];
        let got: Vec<_> = applicable(&blocks, Some(Phase::Bushfire), Some(2))
            .into_iter()
            .copied()
            .collect();
        assert_eq!(got, vec!["base", "b", "o2"]);

        let got: Vec<_> = applicable(&blocks, None, None).into_iter().copied().collect();
        assert_eq!(got, vec!["base"]);
    }

    #[test]
    fn test_tile_demand() {
        let fx = TileEffect::new(TileEffectKind::FuelDelta, -1, 0, -1, 0);
        assert!(fx.uses_input());
        assert_eq!(fx.demand(Some(3)), 3);
        assert_eq!(fx.demand(None), 0);

        let global = fx.with_scope(TargetScope::Global);
        assert_eq!(global.demand(Some(3)), 0);
        assert!(!global.uses_input());
    }
}
