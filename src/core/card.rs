//! Card definitions
//!
//! A definition is immutable once loaded; the catalog hands out shared
//! references to it.

use crate::core::{
    applicable, CardCode, CardName, EffectBlock, Gate, Keyword, Phase, ResourceEffect, TileEffect,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub code: CardCode,
    pub name: CardName,
    pub description: String,
    /// Action points spent to play the card
    pub action_points: u32,
    /// Secondary (money) cost
    pub money_cost: u32,
    pub keywords: SmallVec<[Keyword; 2]>,
    pub resource_blocks: Vec<EffectBlock<ResourceEffect>>,
    pub tile_blocks: Vec<EffectBlock<TileEffect>>,
}

impl CardDefinition {
    pub fn new(code: CardCode, name: impl Into<CardName>) -> Self {
        CardDefinition {
            code,
            name: name.into(),
            description: String::new(),
            action_points: 0,
            money_cost: 0,
            keywords: SmallVec::new(),
            resource_blocks: Vec::new(),
            tile_blocks: Vec::new(),
        }
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    fn any_gate(&self, pred: impl Fn(Gate) -> bool) -> bool {
        self.resource_blocks.iter().any(|b| pred(b.gate))
            || self.tile_blocks.iter().any(|b| pred(b.gate))
    }

    /// True when some resource or tile block is gated on a phase
    pub fn uses_phases(&self) -> bool {
        self.any_gate(|g| matches!(g, Gate::Phase(_)))
    }

    /// True when some resource or tile block is gated on an outcome
    pub fn uses_outcomes(&self) -> bool {
        self.any_gate(|g| matches!(g, Gate::Outcome(_)))
    }

    pub fn resource_effects(&self, phase: Option<Phase>, outcome: Option<i32>) -> Vec<&ResourceEffect> {
        applicable(&self.resource_blocks, phase, outcome)
    }

    pub fn tile_effects(&self, phase: Option<Phase>, outcome: Option<i32>) -> Vec<&TileEffect> {
        applicable(&self.tile_blocks, phase, outcome)
    }

    /// Whether any effect that applies under these selectors reads X
    pub fn needs_input(&self, phase: Option<Phase>, outcome: Option<i32>) -> bool {
        self.resource_effects(phase, outcome)
            .iter()
            .any(|e| e.uses_input())
            || self.tile_effects(phase, outcome).iter().any(|e| e.uses_input())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ResourceKind, TileEffectKind};

    fn backburn() -> CardDefinition {
        let mut card = CardDefinition::new(CardCode::parse("F10").unwrap(), "Backburn");
        card.resource_blocks.push(EffectBlock::new(
            Gate::Base,
            vec![ResourceEffect::fixed(ResourceKind::Happiness, 1)],
        ));
        card.resource_blocks.push(EffectBlock::new(
            Gate::Phase(Phase::Bushfire),
            vec![ResourceEffect::per_input(ResourceKind::FirefightingEquipment, -1)],
        ));
        card.tile_blocks.push(EffectBlock::new(
            Gate::Outcome(2),
            vec![TileEffect::new(TileEffectKind::FuelDelta, -1, 0, 1, 0)],
        ));
        card
    }

    #[test]
    fn test_gate_detection() {
        let card = backburn();
        assert!(card.uses_phases());
        assert!(card.uses_outcomes());
        assert!(!CardDefinition::new(CardCode::parse("A01").unwrap(), "Plain").uses_phases());
    }

    #[test]
    fn test_needs_input_only_for_selected_block() {
        let card = backburn();
        assert!(card.needs_input(Some(Phase::Bushfire), None));
        assert!(!card.needs_input(Some(Phase::Preparation), Some(2)));
        assert_eq!(card.tile_effects(None, Some(2)).len(), 1);
    }
}
