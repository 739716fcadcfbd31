//! Bushfire card engine
//!
//! Resolves per-turn card plays for a community bushfire-preparedness game:
//! a compact turn grammar is parsed into card plays, conditional resource and
//! tile effects are applied to the town, burning tiles are analysed for
//! runaway fire, and the end of the game is graded.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod loader;

pub use error::{EngineError, Result, TurnRejection};
