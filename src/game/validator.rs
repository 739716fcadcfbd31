//! Play validation
//!
//! Checks parsed plays against their card definitions before anything is
//! applied. Validation is pure: it reads the catalog and never touches state.

use crate::core::{CardDefinition, Phase, ResourceEffect, TileEffect};
use crate::game::token::{CardPlay, ParsedTurn};
use crate::loader::CardCatalog;
use crate::EngineError;
use std::sync::Arc;

/// Valid outcome rolls
pub const OUTCOME_RANGE: std::ops::RangeInclusive<i32> = 1..=6;

/// A play whose selectors have been resolved against its card
#[derive(Debug, Clone)]
pub struct ValidatedPlay {
    pub play: CardPlay,
    pub card: Arc<CardDefinition>,
    pub phase: Option<Phase>,
    pub outcome: Option<i32>,
    pub x: Option<i32>,
}

impl ValidatedPlay {
    pub fn resource_effects(&self) -> Vec<&ResourceEffect> {
        self.card.resource_effects(self.phase, self.outcome)
    }

    pub fn tile_effects(&self) -> Vec<&TileEffect> {
        self.card.tile_effects(self.phase, self.outcome)
    }

    /// Total player-selected tiles the play needs
    pub fn tile_demand(&self) -> usize {
        self.tile_effects().iter().map(|e| e.demand(self.x)).sum()
    }
}

/// Decide what a lone bare integer means for this card
///
/// Cards with outcome blocks read it as the outcome; all others read it as X.
fn resolve_selectors(play: &CardPlay, card: &CardDefinition) -> (Option<i32>, Option<i32>) {
    let (mut outcome, mut x) = (play.outcome, play.x);
    if let Some(n) = play.unresolved {
        if card.uses_outcomes() && outcome.is_none() {
            outcome = Some(n);
        } else if x.is_none() {
            x = Some(n);
        } else {
            outcome = Some(n);
        }
    }
    (outcome, x)
}

/// Validate one play, returning every problem found with it
pub fn validate_play(
    play: &CardPlay,
    catalog: &CardCatalog,
) -> Result<ValidatedPlay, Vec<EngineError>> {
    let Some(card) = catalog.get(&play.code) else {
        return Err(vec![EngineError::LookupFailure {
            index: play.index,
            token: play.raw.clone(),
            code: play.code.to_string(),
        }]);
    };

    let (outcome, x) = resolve_selectors(play, card);
    let mut reasons = Vec::new();

    if card.uses_phases() && play.phase.is_none() {
        reasons.push("Card requires a phase selector: add (P) or (B).".to_string());
    }
    if card.uses_outcomes() {
        match outcome {
            None => reasons.push("Card requires an outcome: add (1)..(6).".to_string()),
            Some(o) if !OUTCOME_RANGE.contains(&o) => {
                reasons.push(format!("Outcome must be between 1 and 6, got {o}."))
            }
            Some(_) => {}
        }
    }
    if card.needs_input(play.phase, outcome) && x.is_none() {
        reasons.push("Card requires an X value: add (X=n) or a second number.".to_string());
    }
    if let Some(v) = x {
        if v < 0 {
            reasons.push(format!("X must be >= 0, got {v}."));
        }
    }

    if !reasons.is_empty() {
        return Err(reasons
            .into_iter()
            .map(|reason| EngineError::SelectorMismatch {
                index: play.index,
                token: play.raw.clone(),
                reason,
            })
            .collect());
    }

    Ok(ValidatedPlay {
        play: play.clone(),
        card: Arc::clone(card),
        phase: play.phase,
        outcome,
        x,
    })
}

/// Validate a parsed line; any parse or validation error rejects all of it
pub fn validate_turn(
    parsed: ParsedTurn,
    catalog: &CardCatalog,
) -> Result<Vec<ValidatedPlay>, Vec<EngineError>> {
    let mut errors: Vec<(usize, EngineError)> = parsed
        .errors
        .into_iter()
        .map(|e| (error_index(&e), e))
        .collect();

    let mut plays = Vec::with_capacity(parsed.plays.len());
    for play in &parsed.plays {
        match validate_play(play, catalog) {
            Ok(v) => plays.push(v),
            Err(errs) => errors.extend(errs.into_iter().map(|e| (play.index, e))),
        }
    }

    if errors.is_empty() {
        Ok(plays)
    } else {
        errors.sort_by_key(|(i, _)| *i);
        Err(errors.into_iter().map(|(_, e)| e).collect())
    }
}

fn error_index(err: &EngineError) -> usize {
    match err {
        EngineError::Syntax { index, .. }
        | EngineError::LookupFailure { index, .. }
        | EngineError::SelectorMismatch { index, .. } => *index,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::token::parse_turn_line;

    const CARDS: &str = "\
ID:F10
Name:Equipment Drive
Effects:(P) Happiness:+1 | (B) FirefightingEquipment:-X

ID:A01
Name:Dice Roll
Effects:(1) Provisions:+1 | (2) Provisions:+2 | (3) Education:+X

ID:C02
Name:Sandbags
Effects:Provisions:-X

ID:E05
Name:Town Meeting
Effects:Happiness:+2
";

    fn catalog() -> CardCatalog {
        CardCatalog::from_text(CARDS).unwrap()
    }

    fn check(line: &str) -> Result<Vec<ValidatedPlay>, Vec<EngineError>> {
        validate_turn(parse_turn_line(line), &catalog())
    }

    #[test]
    fn test_lone_integer_is_x_without_outcome_blocks() {
        let plays = check("#F10(B)(3)").unwrap();
        assert_eq!(plays[0].x, Some(3));
        assert_eq!(plays[0].outcome, None);
        assert_eq!(plays[0].resource_effects()[0].resolve(plays[0].x), -3);
    }

    #[test]
    fn test_lone_integer_is_outcome_with_outcome_blocks() {
        let plays = check("A01(2)").unwrap();
        assert_eq!(plays[0].outcome, Some(2));
        assert_eq!(plays[0].x, None);
    }

    #[test]
    fn test_outcome_needing_x_requires_both() {
        let errs = check("A01(3)").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].to_string().contains("requires an X value"));

        let plays = check("A01(3)(4)").unwrap();
        assert_eq!(plays[0].outcome, Some(3));
        assert_eq!(plays[0].x, Some(4));
    }

    #[test]
    fn test_missing_phase_and_range() {
        let errs = check("F10").unwrap_err();
        assert!(errs[0].to_string().contains("phase selector"));

        let errs = check("A01(9)").unwrap_err();
        assert!(errs[0].to_string().contains("between 1 and 6"));

        let errs = check("A01").unwrap_err();
        assert!(errs[0].to_string().contains("requires an outcome"));
    }

    #[test]
    fn test_x_required_by_base_effect() {
        assert!(check("C02").is_err());
        assert_eq!(check("C02(5)").unwrap()[0].x, Some(5));
        assert_eq!(check("C02(X=5)").unwrap()[0].x, Some(5));
    }

    #[test]
    fn test_errors_accumulate_in_token_order() {
        let errs = check("Z99, F10, ??, E05").unwrap_err();
        assert_eq!(errs.len(), 3);
        assert!(matches!(errs[0], EngineError::LookupFailure { index: 1, .. }));
        assert!(matches!(errs[1], EngineError::SelectorMismatch { index: 2, .. }));
        assert!(matches!(errs[2], EngineError::Syntax { index: 3, .. }));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let line = "F10(P), A01(1), E05";
        let cat = catalog();
        let a = validate_turn(parse_turn_line(line), &cat).unwrap();
        let b = validate_turn(parse_turn_line(line), &cat).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.play, y.play);
            assert_eq!((x.phase, x.outcome, x.x), (y.phase, y.outcome, y.x));
        }
    }
}
