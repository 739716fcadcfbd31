//! Line-oriented command language
//!
//! Drives a [`GameState`] from text, one command per line:
//!
//! ```text
//! # comment
//! #F10(B)(3), A02(P)      any other line is a turn line
//! tiles (0,0,0), (1,-1,0)
//! skip                    drop the current tile request
//! end
//! fire
//! state | log | chain | grade
//! ```
//!
//! A line is a comment when `#` is followed by whitespace or nothing.
//! `#F10` is always a card token, and so is `# F10(B)` when the text after
//! the `#` starts with a well-formed token; `# F10 is the drive card` is a
//! comment.

use crate::core::{parse_coord_list, CubeCoord};
use crate::game::state::GameState;
use crate::game::token::starts_with_card_token;
use crate::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Turn(String),
    Tiles(Vec<CubeCoord>),
    Skip,
    End,
    Fire,
    State,
    Log,
    Chain,
    Grade,
}

fn is_comment(line: &str) -> bool {
    let mut chars = line.chars();
    chars.next() == Some('#')
        && chars.next().map_or(true, char::is_whitespace)
        && !starts_with_card_token(line)
}

impl Command {
    /// Parse one line; blank lines and comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || is_comment(line) {
            return Ok(None);
        }
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(h, r)| (h, r.trim()));
        let keyword = head.to_ascii_lowercase();

        let command = match (keyword.as_str(), rest.is_empty()) {
            ("tiles", _) => Command::Tiles(parse_coord_list(rest)?),
            ("skip", true) => Command::Skip,
            ("end", true) => Command::End,
            ("fire", true) => Command::Fire,
            ("state", true) => Command::State,
            ("log", true) => Command::Log,
            ("chain", true) => Command::Chain,
            ("grade", true) => Command::Grade,
            _ => Command::Turn(line.to_string()),
        };
        Ok(Some(command))
    }
}

impl GameState {
    /// Run one command and return its printable output
    pub fn execute(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Turn(line) => Ok(self.submit_turn(&line)?.render()),
            Command::Tiles(coords) => Ok(self.submit_tiles(&coords)?.render()),
            Command::Skip => {
                let request = self.cancel_tiles()?;
                Ok(format!(
                    "Skipped {} ({}); {} tile request(s) remain",
                    request.card_name,
                    request.token,
                    self.pending_tile_requests()
                ))
            }
            Command::End => {
                let turn = self.advance_turn()?;
                Ok(format!("Turn {turn} begins"))
            }
            Command::Fire => Ok(self.run_fire_step()?.render()),
            Command::State => self.to_json(),
            Command::Log => {
                if self.turn_log().is_empty() {
                    Ok("(no turns played)".to_string())
                } else {
                    Ok(self.turn_log().render())
                }
            }
            Command::Chain => {
                let chain = self.fire_chain();
                let tiles: Vec<String> = chain.tiles.iter().map(ToString::to_string).collect();
                Ok(format!(
                    "Longest fire chain: {} {}",
                    chain.length,
                    tiles.join(" ")
                )
                .trim_end()
                .to_string())
            }
            Command::Grade => Ok(self.grade_report().render()),
        }
    }

    /// Parse and run one line; `Ok(None)` for blanks and comments
    pub fn execute_line(&mut self, line: &str) -> Result<Option<String>> {
        match Command::parse(line)? {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    /// Run every line of a script, collecting a transcript
    ///
    /// Errors do not stop the script; they are written into the transcript
    /// and the next line runs against the unchanged state.
    pub fn run_script(&mut self, script: &str) -> String {
        let mut transcript = Vec::new();
        for line in script.lines() {
            let result = self.execute_line(line);
            if matches!(result, Ok(None)) {
                continue;
            }
            transcript.push(format!("> {}", line.trim()));
            match result {
                Ok(Some(output)) => transcript.push(output),
                Ok(None) => {}
                Err(EngineError::TurnRejected(rejection)) => {
                    transcript.push(rejection.to_string().trim_end().to_string())
                }
                Err(e) => transcript.push(format!("Error: {e}")),
            }
        }
        transcript.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::loader::CardCatalog;
    use std::sync::Arc;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  ").unwrap(), None);
        assert_eq!(Command::parse("# setup").unwrap(), None);
        assert_eq!(Command::parse("#").unwrap(), None);
        assert_eq!(Command::parse("# F10 is the drive card").unwrap(), None);
        assert_eq!(
            Command::parse("# F10(P), A01").unwrap(),
            Some(Command::Turn("# F10(P), A01".to_string()))
        );
        assert_eq!(
            Command::parse("#F10(B)(3)").unwrap(),
            Some(Command::Turn("#F10(B)(3)".to_string()))
        );
        assert_eq!(Command::parse("END").unwrap(), Some(Command::End));
        assert_eq!(Command::parse("skip").unwrap(), Some(Command::Skip));
        assert_eq!(
            Command::parse("tiles (0,0,0), (1,-1,0)").unwrap(),
            Some(Command::Tiles(vec![
                CubeCoord::ORIGIN,
                CubeCoord::from_axial(1, 0)
            ]))
        );
        assert!(Command::parse("tiles (1,1,1)").is_err());
    }

    #[test]
    fn test_script_keeps_going_after_errors() {
        let catalog = CardCatalog::from_text("ID:A01\nName:Meeting\nEffects:Happiness:+1\n").unwrap();
        let mut game = GameState::new(Arc::new(catalog), EngineConfig::default());
        game.logger.enable_capture();
        let transcript = game.run_script("# opening\nZ99\nA01\nend\ntiles (0,0,0)\nlog\n");

        assert!(transcript.contains("> Z99\nTurn rejected:\n- Token 1 'Z99'"));
        assert!(transcript.contains("> end\nTurn 2 begins"));
        assert!(transcript.contains("> tiles (0,0,0)\nError: "));
        assert!(transcript.ends_with("> log\nTurn 1: A01"));
        assert!(!transcript.contains("opening"));
        assert_eq!(game.town().happiness(), 16);
    }
}
