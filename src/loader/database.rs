//! Card catalog for looking up card definitions
//!
//! Provides lookup of card definitions by code. Definitions are shared via
//! `Arc` so validated plays can hold on to the card they name.

use crate::core::{CardCode, CardDefinition, Keyword};
use crate::loader::card::CardLoader;
use crate::{EngineError, Result};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only collection of card definitions keyed by code
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardCode, Arc<CardDefinition>>,
}

impl CardCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        CardCatalog {
            cards: FxHashMap::default(),
        }
    }

    /// Load a catalog from a card file (blank-line separated cards) or a
    /// directory of `.txt` files, one card each
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EngineError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Card catalog not found: {path:?}"),
            )));
        }

        let mut catalog = CardCatalog::new();
        if path.is_dir() {
            catalog.load_directory(path)?;
        } else {
            let content = std::fs::read_to_string(path)?;
            for card in CardLoader::parse_many(&content)? {
                catalog.add_card(card)?;
            }
        }
        Ok(catalog)
    }

    /// Build a catalog from card text held in memory
    pub fn from_text(content: &str) -> Result<Self> {
        let mut catalog = CardCatalog::new();
        for card in CardLoader::parse_many(content)? {
            catalog.add_card(card)?;
        }
        Ok(catalog)
    }

    /// Recursively load `.txt` cards, visiting entries in name order
    fn load_directory(&mut self, dir: &Path) -> Result<()> {
        let mut entries = std::fs::read_dir(dir)?
            .map(|e| e.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.load_directory(&path)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                let card = CardLoader::load_from_file(&path).map_err(|e| {
                    EngineError::InvalidCardFormat(format!("{}: {e}", path.display()))
                })?;
                self.add_card(card)?;
            }
        }
        Ok(())
    }

    /// Add a card; a second card with the same code is an error
    pub fn add_card(&mut self, card: CardDefinition) -> Result<()> {
        if self.cards.contains_key(&card.code) {
            return Err(EngineError::InvalidCardFormat(format!(
                "Duplicate card code {}",
                card.code
            )));
        }
        self.cards.insert(card.code.clone(), Arc::new(card));
        Ok(())
    }

    /// Look up a card by code (`#` marker and letter case are ignored)
    pub fn get_card(&self, code: &str) -> Option<&Arc<CardDefinition>> {
        let code = CardCode::parse(code)?;
        self.cards.get(&code)
    }

    pub fn get(&self, code: &CardCode) -> Option<&Arc<CardDefinition>> {
        self.cards.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get_card(code).is_some()
    }

    /// Total number of cards in the catalog
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards sorted by code
    pub fn cards(&self) -> Vec<&Arc<CardDefinition>> {
        let mut cards: Vec<_> = self.cards.values().collect();
        cards.sort_by(|a, b| a.code.cmp(&b.code));
        cards
    }

    /// Number of cards carrying `keyword`
    pub fn count_with_keyword(&self, keyword: Keyword) -> usize {
        self.cards.values().filter(|c| c.has_keyword(keyword)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = "\
ID:D01
Name:Cultural Burning
Keywords:Cultural,Preparation
Effects:Happiness:+2

ID:#b02
Name:Water Bombing
Keywords:Bushfire
TileEffects:FireReduce(-1,0,1,0)
";

    #[test]
    fn test_empty_catalog() {
        let catalog = CardCatalog::new();
        assert_eq!(catalog.len(), 0);
        assert!(catalog.is_empty());
        assert!(catalog.get_card("F10").is_none());
    }

    #[test]
    fn test_from_text_and_lookup() {
        let catalog = CardCatalog::from_text(CARDS).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("#B02"));
        assert!(catalog.contains("b02"));
        assert_eq!(catalog.get_card("D01").unwrap().name.as_str(), "Cultural Burning");
        assert_eq!(catalog.count_with_keyword(Keyword::Cultural), 1);
        assert_eq!(catalog.count_with_keyword(Keyword::Outreach), 0);
        let codes: Vec<_> = catalog.cards().iter().map(|c| c.code.to_string()).collect();
        assert_eq!(codes, vec!["B02", "D01"]);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let text = format!("{CARDS}\nID:D01\nName:Again\n");
        assert!(CardCatalog::from_text(&text).is_err());
    }

    #[test]
    fn test_missing_path() {
        let result = CardCatalog::load_from_path(Path::new("no/such/catalog.txt"));
        assert!(matches!(result, Err(EngineError::IoError(_))));
    }
}
