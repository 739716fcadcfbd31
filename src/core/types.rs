//! Strongly-typed wrappers for game concepts
//!
//! Card codes, card names and player roles get their own types so a code can
//! never be confused with a display name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short card code such as `F10`
///
/// Always stored without the optional `#` marker and with an upper-case role
/// letter, so `#f10`, `F10` and `f10` name the same card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardCode(String);

impl CardCode {
    /// Normalize a code, returning `None` unless it is one letter and two digits
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        let bytes = s.as_bytes();
        if bytes.len() != 3
            || !bytes[0].is_ascii_alphabetic()
            || !bytes[1].is_ascii_digit()
            || !bytes[2].is_ascii_digit()
        {
            return None;
        }
        Some(CardCode(s.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Role letter (`A`..`F`, or `X` for generic cards)
    pub fn prefix(&self) -> char {
        self.0.chars().next().unwrap_or('X')
    }

    /// The role that owns this card, if any
    pub fn role(&self) -> Option<Role> {
        Role::from_prefix(self.prefix())
    }
}

impl fmt::Display for CardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CardName {
    fn from(s: String) -> Self {
        CardName(s)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

/// Community role a player holds; each role owns the cards with its letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Civilian,
    Firefighter,
    Farmer,
    IndigenousLeader,
    Mayor,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Civilian,
        Role::Firefighter,
        Role::Farmer,
        Role::IndigenousLeader,
        Role::Mayor,
        Role::Teacher,
    ];

    /// Map a card code letter to its role; `X` and unknown letters are generic
    pub fn from_prefix(c: char) -> Option<Role> {
        match c.to_ascii_uppercase() {
            'A' => Some(Role::Civilian),
            'B' => Some(Role::Firefighter),
            'C' => Some(Role::Farmer),
            'D' => Some(Role::IndigenousLeader),
            'E' => Some(Role::Mayor),
            'F' => Some(Role::Teacher),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Civilian => "Civilian",
            Role::Firefighter => "Firefighter",
            Role::Farmer => "Farmer",
            Role::IndigenousLeader => "Indigenous Leader",
            Role::Mayor => "Mayor",
            Role::Teacher => "Teacher",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_code_normalization() {
        let a = CardCode::parse("#f10").unwrap();
        let b = CardCode::parse("F10").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "F10");
        assert_eq!(a.role(), Some(Role::Teacher));
    }

    #[test]
    fn test_card_code_rejects_bad_shapes() {
        assert!(CardCode::parse("F1").is_none());
        assert!(CardCode::parse("F100").is_none());
        assert!(CardCode::parse("10F").is_none());
        assert!(CardCode::parse("").is_none());
    }

    #[test]
    fn test_generic_cards_have_no_role() {
        let x = CardCode::parse("X01").unwrap();
        assert_eq!(x.role(), None);
        assert_eq!(Role::IndigenousLeader.letter(), 'D');
    }
}
