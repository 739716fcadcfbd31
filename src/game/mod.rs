//! Turn processing, tile effects, fire analysis and grading

pub mod command;
pub mod fire_chain;
pub mod grading;
pub mod logger;
pub mod resolver;
pub mod simulation;
pub mod state;
pub mod tile_engine;
pub mod token;
pub mod turn_log;
pub mod validator;

pub use command::Command;
pub use fire_chain::{largest_component, longest_fire_chain, FireChain};
pub use grading::{EndConditions, GradeReport, GradeScores, LetterGrade, PlayStatistics};
pub use logger::{GameLogger, LogEntry, OutputMode, VerbosityLevel};
pub use resolver::ResourceChange;
pub use simulation::FireStepReport;
pub use state::{GameState, PlaySummary, StateView, TileResolution, TurnSummary};
pub use tile_engine::TileRequest;
pub use token::{parse_turn_line, CardPlay, ParsedTurn};
pub use turn_log::TurnLog;
pub use validator::{validate_turn, ValidatedPlay};
