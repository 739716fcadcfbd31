//! Resource effect resolution
//!
//! Turns a validated play's applicable resource effects into concrete deltas
//! and pushes them through the town's clamped adjustments. Derived values
//! (fuel average, fire-safety rating) are refreshed by the caller once per
//! turn, not here.

use crate::core::{ResourceKind, TownResources};
use crate::game::validator::ValidatedPlay;
use serde::{Deserialize, Serialize};

/// One resolved resource change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub resource: ResourceKind,
    /// Delta the card asked for
    pub requested: i32,
    /// Delta left after clamping
    pub applied: i32,
}

/// Deltas the play would apply, in resolution order, without applying them
pub fn resolve_deltas(play: &ValidatedPlay) -> Vec<(ResourceKind, i32)> {
    play.resource_effects()
        .into_iter()
        .map(|effect| (effect.resource, effect.resolve(play.x)))
        .collect()
}

/// Apply the play's resource effects to `town`
pub fn apply_resource_effects(play: &ValidatedPlay, town: &mut TownResources) -> Vec<ResourceChange> {
    resolve_deltas(play)
        .into_iter()
        .map(|(resource, requested)| ResourceChange {
            resource,
            requested,
            applied: town.adjust(resource, requested),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::token::parse_turn_line;
    use crate::game::validator::validate_turn;
    use crate::loader::CardCatalog;

    const CARDS: &str = "\
ID:F10
Name:Equipment Drive
Effects:Happiness:+1 | (P) Provisions:+2 | (B) FirefightingEquipment:-X | (B) Education:+1

ID:A02
Name:Harvest
Effects:(1) Provisions:+30 | (2) Provisions:-1
";

    fn plays(line: &str) -> Vec<ValidatedPlay> {
        let catalog = CardCatalog::from_text(CARDS).unwrap();
        validate_turn(parse_turn_line(line), &catalog).unwrap()
    }

    #[test]
    fn test_base_then_phase_order() {
        let deltas = resolve_deltas(&plays("#F10(B)(3)")[0]);
        assert_eq!(
            deltas,
            vec![
                (ResourceKind::Happiness, 1),
                (ResourceKind::FirefightingEquipment, -3),
                (ResourceKind::Education, 1),
            ]
        );
    }

    #[test]
    fn test_applied_delta_reports_clamping() {
        let mut town = TownResources::default();
        let changes = apply_resource_effects(&plays("F10(B)(3)")[0], &mut town);
        let equipment = changes
            .iter()
            .find(|c| c.resource == ResourceKind::FirefightingEquipment)
            .unwrap();
        assert_eq!(equipment.requested, -3);
        assert_eq!(equipment.applied, -2);
        assert_eq!(town.firefighting_equipment(), 0);

        let changes = apply_resource_effects(&plays("A02(1)")[0], &mut town);
        assert_eq!(changes[0].applied, 13);
        assert_eq!(town.provisions(), 25);
    }
}
