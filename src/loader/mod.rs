//! Card catalog loaders
//!
//! Parsers for the card text format (.txt) and the catalog built from it

pub mod card;
pub mod database;

pub use card::CardLoader;
pub use database::CardCatalog;
