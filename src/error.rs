//! Error types for the bushfire engine

use crate::core::CubeCoord;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Token {index} '{token}': {reason}")]
    Syntax {
        index: usize,
        token: String,
        reason: String,
    },

    #[error("Token {index} '{token}': card not found: {code}")]
    LookupFailure {
        index: usize,
        token: String,
        code: String,
    },

    #[error("Token {index} '{token}': {reason}")]
    SelectorMismatch {
        index: usize,
        token: String,
        reason: String,
    },

    #[error("Wrong number of tiles. Expected {expected}, got {got}.")]
    TileDemandMismatch { expected: usize, got: usize },

    #[error("Tile {coord}: {reason}")]
    TilePrecondition { coord: CubeCoord, reason: String },

    #[error("Tile {coord}: {problem}")]
    DuplicateOrUnknownTile { coord: CubeCoord, problem: TileProblem },

    #[error("Turn input is empty")]
    EmptyTurn,

    #[error("No tile selection is pending")]
    NoPendingTiles,

    #[error("{remaining} tile selection(s) still pending")]
    TilesPending { remaining: usize },

    #[error("Invalid cube coordinate ({x},{y},{z}): components must sum to zero")]
    InvalidCoordinate { x: i32, y: i32, z: i32 },

    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    TurnRejected(TurnRejection),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationError(err.to_string())
    }
}

/// Why a tile selection entry was refused before any precondition ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileProblem {
    Duplicate,
    Unknown,
}

impl fmt::Display for TileProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileProblem::Duplicate => write!(f, "duplicate tile selected"),
            TileProblem::Unknown => write!(f, "tile not found on the map"),
        }
    }
}

/// Every error found while validating one turn line
///
/// A rejected line never mutates game state; callers get the complete list so
/// all problems can be fixed in one edit.
#[derive(Debug)]
pub struct TurnRejection {
    pub errors: Vec<EngineError>,
}

impl TurnRejection {
    pub fn new(errors: Vec<EngineError>) -> Self {
        TurnRejection { errors }
    }

    pub fn single(error: EngineError) -> Self {
        TurnRejection {
            errors: vec![error],
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for TurnRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Turn rejected:")?;
        for err in &self.errors {
            writeln!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TurnRejection {}

impl From<TurnRejection> for EngineError {
    fn from(rejection: TurnRejection) -> Self {
        EngineError::TurnRejected(rejection)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
