//! Turn-line token parser
//!
//! A turn line is a comma-separated list of card plays. Each token is a card
//! code followed by up to three parenthesised selector groups:
//!
//! ```text
//! F10          plain play
//! #F10(B)(3)   Bushfire phase, one integer
//! A04(P)(2)(5) Preparation phase, outcome 2, X = 5
//! C07(X=4)     explicit X
//! C07(O=2)     explicit outcome
//! ```
//!
//! Whitespace inside a token is ignored. Every token is checked and every
//! problem is reported, each tagged with the token's 1-based position.

use crate::core::{CardCode, Phase};
use crate::EngineError;
use nom::{
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::{char, satisfy},
    combinator::{all_consuming, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Most selector groups a token may carry
pub const MAX_GROUPS: usize = 3;

const SYNTAX_HINT: &str = "Bad syntax. Expected e.g. #A10, #A10(P), #A10(B)(3), #A10(2)(5)";

/// One parsed card play request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPlay {
    /// 1-based position in the turn line
    pub index: usize,
    /// The token with whitespace removed
    pub raw: String,
    pub code: CardCode,
    pub phase: Option<Phase>,
    pub outcome: Option<i32>,
    pub x: Option<i32>,
    /// A lone bare integer; the card decides whether it is an outcome or X
    pub unresolved: Option<i32>,
}

/// Everything the parser found in one line
#[derive(Debug, Default)]
pub struct ParsedTurn {
    pub plays: Vec<CardPlay>,
    pub errors: Vec<EngineError>,
}

impl ParsedTurn {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Phase(Phase),
    Number(i32),
    X(i32),
    Outcome(i32),
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('#')),
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while_m_n(2, 2, |c: char| c.is_ascii_digit()),
    )))(input)
}

fn group(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_while1(|c| c != '(' && c != ')'), char(')'))(input)
}

fn token_shape(input: &str) -> IResult<&str, (&str, Vec<&str>)> {
    all_consuming(pair(ident, many0(group)))(input)
}

fn parse_number(text: &str) -> Option<i32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn classify(content: &str) -> Result<Group, String> {
    if let Some(phase) = Phase::from_letter(content) {
        return Ok(Group::Phase(phase));
    }
    if let Some(n) = parse_number(content) {
        return Ok(Group::Number(n));
    }
    if let Some((marker, value)) = content.split_once('=') {
        let n = parse_number(value)
            .ok_or_else(|| format!("'{value}' is not a non-negative integer"))?;
        return match marker {
            "X" | "x" => Ok(Group::X(n)),
            "O" | "o" => Ok(Group::Outcome(n)),
            _ => Err(format!("Unknown parentheses group '({content})'")),
        };
    }
    Err(format!("Unknown parentheses group '({content})'"))
}

/// Parse a single whitespace-free token
pub fn parse_token(index: usize, token: &str) -> Result<CardPlay, EngineError> {
    let syntax = |reason: String| EngineError::Syntax {
        index,
        token: token.to_string(),
        reason,
    };

    let (_, (id, groups)) = token_shape(token).map_err(|_| syntax(SYNTAX_HINT.to_string()))?;
    if groups.len() > MAX_GROUPS {
        return Err(syntax(format!(
            "At most {MAX_GROUPS} groups are allowed, got {}",
            groups.len()
        )));
    }
    let code = CardCode::parse(id).ok_or_else(|| syntax(SYNTAX_HINT.to_string()))?;

    let mut phase = None;
    let mut outcome = None;
    let mut x = None;
    let mut bare: SmallVec<[i32; 2]> = SmallVec::new();
    let mut numbers = 0;

    for content in groups {
        match classify(content).map_err(&syntax)? {
            Group::Phase(p) => {
                if phase.replace(p).is_some() {
                    return Err(syntax("Only one phase group (P) or (B) is allowed".into()));
                }
            }
            Group::Number(n) => {
                numbers += 1;
                bare.push(n);
            }
            Group::X(n) => {
                numbers += 1;
                if x.replace(n).is_some() {
                    return Err(syntax("X is given more than once".into()));
                }
            }
            Group::Outcome(n) => {
                numbers += 1;
                if outcome.replace(n).is_some() {
                    return Err(syntax("Outcome is given more than once".into()));
                }
            }
        }
    }
    if numbers > 2 {
        return Err(syntax("At most two integers (outcome, X) are allowed".into()));
    }

    // Bare integers fill whichever slots the explicit markers left open:
    // two of them read as outcome then X.
    let unresolved = match (bare.as_slice(), outcome, x) {
        ([n], None, None) => Some(*n),
        ([n], Some(_), _) => {
            x = Some(*n);
            None
        }
        ([n], None, Some(_)) => {
            outcome = Some(*n);
            None
        }
        ([o, v], _, _) => {
            outcome = Some(*o);
            x = Some(*v);
            None
        }
        _ => None,
    };

    Ok(CardPlay {
        index,
        raw: token.to_string(),
        code,
        phase,
        outcome,
        x,
        unresolved,
    })
}

/// Split a turn line into `(position, token)` pairs with whitespace removed
///
/// Positions are 1-based over the raw comma-separated entries, so an empty
/// entry is skipped but still takes up a position.
pub fn split_tokens(line: &str) -> Vec<(usize, String)> {
    line.split(',')
        .enumerate()
        .map(|(i, t)| (i + 1, t.chars().filter(|c| !c.is_whitespace()).collect::<String>()))
        .filter(|(_, t)| !t.is_empty())
        .collect()
}

/// Parse a full turn line, collecting every play and every error
pub fn parse_turn_line(line: &str) -> ParsedTurn {
    let tokens = split_tokens(line);
    let mut parsed = ParsedTurn::default();
    if tokens.is_empty() {
        parsed.errors.push(EngineError::EmptyTurn);
        return parsed;
    }

    for (index, token) in &tokens {
        match parse_token(*index, token) {
            Ok(play) => parsed.plays.push(play),
            Err(e) => parsed.errors.push(e),
        }
    }
    parsed
}

/// Whether the first entry of `line` has the shape of a card token
pub fn starts_with_card_token(line: &str) -> bool {
    split_tokens(line)
        .first()
        .is_some_and(|(_, token)| token_shape(token).is_ok())
}

/// Card code at the front of a logged token, if it has one
pub fn code_of(token: &str) -> Option<CardCode> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    ident(&compact).ok().and_then(|(_, id)| CardCode::parse(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(token: &str) -> CardPlay {
        parse_token(1, token).unwrap()
    }

    #[test]
    fn test_plain_and_marked_codes() {
        let p = play("#F10");
        assert_eq!(p.code.as_str(), "F10");
        assert_eq!(p.phase, None);
        assert_eq!(p.unresolved, None);
        assert_eq!(play("a01").code.as_str(), "A01");
    }

    #[test]
    fn test_phase_and_numbers() {
        let p = play("#F10(B)(3)");
        assert_eq!(p.phase, Some(Phase::Bushfire));
        assert_eq!(p.unresolved, Some(3));
        assert_eq!(p.outcome, None);
        assert_eq!(p.x, None);

        let p = play("A04(p)(2)(5)");
        assert_eq!(p.phase, Some(Phase::Preparation));
        assert_eq!(p.outcome, Some(2));
        assert_eq!(p.x, Some(5));
        assert_eq!(p.unresolved, None);
    }

    #[test]
    fn test_explicit_markers() {
        let p = play("C07(X=4)");
        assert_eq!(p.x, Some(4));
        assert_eq!(p.unresolved, None);

        let p = play("C07(O=2)(9)");
        assert_eq!(p.outcome, Some(2));
        assert_eq!(p.x, Some(9));

        let p = play("C07(X=1)(3)");
        assert_eq!(p.outcome, Some(3));
        assert_eq!(p.x, Some(1));
    }

    #[test]
    fn test_syntax_errors() {
        for bad in [
            "F1", "F100", "10F", "F10(", "F10()", "F10(Q)", "F10(-1)", "F10(P)(B)",
            "F10(1)(2)(3)", "F10(P)(1)(2)(3)", "F10(X=1)(X=2)", "F10(X=a)", "F10x",
        ] {
            assert!(
                matches!(parse_token(4, bad), Err(EngineError::Syntax { index: 4, .. })),
                "{bad} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_unknown_group_message() {
        let err = parse_token(2, "F10(Z)").unwrap_err();
        assert_eq!(err.to_string(), "Token 2 'F10(Z)': Unknown parentheses group '(Z)'");
    }

    #[test]
    fn test_line_collects_all_errors() {
        let parsed = parse_turn_line(" #F10 (B) (3) , Q, A01, ,B2");
        assert_eq!(parsed.plays.len(), 2);
        assert_eq!(parsed.plays[0].raw, "#F10(B)(3)");
        assert_eq!(parsed.plays[1].index, 3);
        assert_eq!(parsed.errors.len(), 2);
        assert!(matches!(parsed.errors[0], EngineError::Syntax { index: 2, .. }));
        assert!(matches!(parsed.errors[1], EngineError::Syntax { index: 5, .. }));
    }

    #[test]
    fn test_empty_entries_keep_their_position() {
        let parsed = parse_turn_line("A01, , Q");
        assert_eq!(parsed.plays[0].index, 1);
        assert!(matches!(parsed.errors[..], [EngineError::Syntax { index: 3, .. }]));
        assert!(parsed.errors[0].to_string().starts_with("Token 3 'Q'"));

        let tokens = split_tokens(",F10 (B), ,D03");
        assert_eq!(tokens, vec![(2, "F10(B)".to_string()), (4, "D03".to_string())]);
    }

    #[test]
    fn test_empty_line() {
        let parsed = parse_turn_line("  , ,");
        assert!(parsed.plays.is_empty());
        assert!(matches!(parsed.errors[..], [EngineError::EmptyTurn]));
    }

    #[test]
    fn test_card_token_shape() {
        assert!(starts_with_card_token("# F10 (B)(3), A01"));
        assert!(starts_with_card_token("D03"));
        assert!(!starts_with_card_token("# F10 is the drive card"));
        assert!(!starts_with_card_token("# A hot, windy season"));
        assert!(!starts_with_card_token(""));
    }

    #[test]
    fn test_code_of_logged_token() {
        assert_eq!(code_of("#D03(P)").unwrap().as_str(), "D03");
        assert!(code_of("???").is_none());
    }
}
