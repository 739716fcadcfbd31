//! Bushfire engine - command-line driver
//!
//! Plays a game from stdin or a script file against a card catalog.

use anyhow::{Context, Result};
use bushfire_engine::{
    config::EngineConfig,
    game::{GameState, VerbosityLevel},
    loader::CardCatalog,
    EngineError,
};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "bushfire")]
#[command(about = "Bushfire card engine - turn resolution and fire-risk grading", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every game-running subcommand
#[derive(Args)]
struct GameArgs {
    /// Card file or directory of card files (.txt)
    #[arg(long, value_name = "PATH")]
    cards: PathBuf,

    /// Engine configuration (JSON); missing fields use the defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Set random seed for the fire step
    #[arg(long)]
    seed: Option<u64>,

    /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, short = 'v')]
    verbosity: Option<VerbosityArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin, one per line
    Play {
        #[command(flatten)]
        game: GameArgs,
    },

    /// Execute a script file and print the transcript and final grade
    Run {
        #[command(flatten)]
        game: GameArgs,

        /// Command script to execute
        #[arg(long, value_name = "PATH")]
        script: PathBuf,
    },

    /// Load the catalog and list its cards
    Cards {
        /// Card file or directory of card files (.txt)
        #[arg(long, value_name = "PATH")]
        cards: PathBuf,
    },
}

fn load_catalog(path: &Path) -> Result<CardCatalog> {
    CardCatalog::load_from_path(path)
        .with_context(|| format!("failed to load cards from {}", path.display()))
}

fn build_game(args: &GameArgs) -> Result<GameState> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(verbosity) = args.verbosity {
        config.verbosity = verbosity.into();
    }
    config.validate()?;

    let catalog = load_catalog(&args.cards)?;
    Ok(GameState::new(Arc::new(catalog), config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { game } => run_play(&game),
        Commands::Run { game, script } => run_script(&game, &script),
        Commands::Cards { cards } => run_cards(&cards),
    }
}

fn run_play(args: &GameArgs) -> Result<()> {
    let mut game = build_game(args)?;
    println!(
        "Bushfire engine: {} cards loaded. Turn {}.",
        game.catalog().len(),
        game.turn()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        match game.current_tile_request() {
            Some(request) => print!("{}\ntiles (or skip)> ", request.prompt()),
            None => print!("turn {}> ", game.turn()),
        }
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }
        match game.execute_line(line) {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(EngineError::TurnRejected(rejection)) => print!("{rejection}"),
            Err(e) => println!("Error: {e}"),
        }
    }

    println!("{}", game.grade_report().render());
    Ok(())
}

fn run_script(args: &GameArgs, script: &Path) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let mut game = build_game(args)?;
    println!("{}", game.run_script(&text));
    println!();
    println!("{}", game.grade_report().render());
    Ok(())
}

fn run_cards(path: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;
    for card in catalog.cards() {
        let keywords: Vec<String> = card.keywords.iter().map(|k| format!("{k:?}")).collect();
        println!(
            "{:<4} {:<32} AP {:>2}  Money {:>2}  {}",
            card.code.as_str(),
            card.name.as_str(),
            card.action_points,
            card.money_cost,
            keywords.join(",")
        );
    }
    println!("{} card(s)", catalog.len());
    Ok(())
}
