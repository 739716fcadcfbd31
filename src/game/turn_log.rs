//! Append-only record of accepted turn tokens

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLog {
    turns: BTreeMap<u32, Vec<String>>,
}

impl TurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append accepted tokens under `turn`
    pub fn record(&mut self, turn: u32, tokens: impl IntoIterator<Item = String>) {
        self.turns.entry(turn).or_default().extend(tokens);
    }

    pub fn tokens(&self, turn: u32) -> &[String] {
        self.turns.get(&turn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Turns in ascending order with their tokens
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.turns.iter().map(|(t, v)| (*t, v.as_slice()))
    }

    /// Every token in play order
    pub fn all_tokens(&self) -> impl Iterator<Item = &str> {
        self.turns.values().flatten().map(String::as_str)
    }

    /// Number of turns with at least one recorded entry
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// `Turn N: tok, tok` lines
    pub fn render(&self) -> String {
        self.iter()
            .map(|(turn, tokens)| format!("Turn {turn}: {}", tokens.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
