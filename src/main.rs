//! Circle Puzzle
//!
//! Circular twisty puzzles: pieces sit on overlapping rotation circles and are
//! moved by turning a circle in steps of its symmetry order. Ships three
//! built-in levels, a headless replay mode and an interactive 3D viewer.

mod visualization;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use circlet::catalog::format_level;
use circlet::persistence::{JsonFileStore, ProgressStore, DEFAULT_PROGRESS_FILE};
use circlet::surface::NullView;
use circlet::{Catalog, Level, LevelId, LevelRegistry, Session};

/// Plays and checks circular twisty puzzles.
#[derive(Parser)]
#[command(name = "circlet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Progress file holding solved levels.
    #[arg(long, global = true, default_value = DEFAULT_PROGRESS_FILE)]
    store: PathBuf,

    /// Seed for scrambling; random when omitted.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log gesture and scramble details.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play a level in an interactive 3D viewer.
    Play {
        #[arg(short, long, default_value_t = 1)]
        level: LevelId,
    },
    /// Print the circles and piece groups of a level.
    Describe {
        #[arg(short, long, default_value_t = 1)]
        level: LevelId,
    },
    /// Check every built-in level for a consistent solved state.
    Verify,
    /// Scramble a level, apply turns, and report whether it ends solved.
    Replay {
        #[arg(short, long, default_value_t = 1)]
        level: LevelId,
        /// Comma separated turns, e.g. `0+1,1-2` (circle, sign, steps).
        #[arg(short, long, value_delimiter = ',', value_parser = parse_turn)]
        moves: Vec<Turn>,
        /// Start from the solved state instead of a scramble.
        #[arg(long)]
        solved: bool,
    },
    /// List solved levels.
    Progress,
    /// Check wins outside play mode too.
    ForceCheck { state: Switch },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

/// A programmatic turn: `steps` symmetry steps of `circle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Turn {
    circle: usize,
    steps: i32,
}

fn parse_turn(text: &str) -> Result<Turn, String> {
    let text = text.trim();
    let split = text
        .find(['+', '-'])
        .ok_or_else(|| format!("turn `{text}` needs a sign, e.g. 0+1"))?;
    let circle = text[..split]
        .parse()
        .map_err(|e| format!("bad circle in `{text}`: {e}"))?;
    let steps = text[split..]
        .parse()
        .map_err(|e| format!("bad step count in `{text}`: {e}"))?;
    Ok(Turn { circle, steps })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(Command::Play { level }) => run_play(&cli.store, cli.seed, level),
        Some(Command::Describe { level }) => run_describe(level),
        Some(Command::Verify) => run_verify(),
        Some(Command::Replay {
            level,
            moves,
            solved,
        }) => run_replay(&cli.store, cli.seed, level, &moves, solved),
        Some(Command::Progress) => run_progress(&cli.store),
        Some(Command::ForceCheck { state }) => run_force_check(&cli.store, state),
        None => {
            // default: play the first level
            println!("Controls: Up/Down select circle, Left/Right turn, R reset");
            run_play(&cli.store, cli.seed, 1)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(path: &Path) -> circlet::Result<Box<dyn ProgressStore>> {
    Ok(Box::new(JsonFileStore::open(path)?))
}

fn load(level: LevelId) -> circlet::Result<Level> {
    Catalog.load(level).ok_or(circlet::Error::UnknownLevel(level))
}

/// Opens the viewer on a level.
fn run_play(store: &Path, seed: Option<u64>, level: LevelId) -> circlet::Result<()> {
    visualization::play(level, open_store(store)?, seed)
}

/// Prints the layout table of a level.
fn run_describe(level: LevelId) -> circlet::Result<()> {
    print!("{}", format_level(&load(level)?));
    Ok(())
}

/// Checks that a full turn of every circle returns every piece home.
fn full_turn_restores(level: &Level) -> circlet::Result<bool> {
    let mut turned = level.clone();
    for (index, circle) in level.circles().iter().enumerate() {
        for _ in 0..circle.steps() {
            turned.begin_rotation();
            turned.rotate_zone(index, circle.step_angle())?;
        }
        let home = turned
            .pieces()
            .iter()
            .zip(level.pieces())
            .all(|(after, before)| after.pose().approx_eq(&before.pose(), 1e-6));
        if !home {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Verifies every built-in level.
fn run_verify() -> circlet::Result<()> {
    let mut failures = 0;
    for id in Catalog.ids() {
        let level = load(id)?;
        let solved = level.is_solved();
        let restores = full_turn_restores(&level)?;
        let status = if solved && restores { "ok" } else { "FAILED" };
        println!(
            "level {id}: {status} (solved state {}, full turns {})",
            if solved { "valid" } else { "invalid" },
            if restores { "restore" } else { "drift" }
        );
        if !(solved && restores) {
            failures += 1;
        }
    }
    if failures > 0 {
        return Err(circlet::Error::InvalidLevel(format!(
            "{failures} level(s) failed verification"
        )));
    }
    Ok(())
}

/// Applies turns headless and reports the outcome.
fn run_replay(
    store: &Path,
    seed: Option<u64>,
    level: LevelId,
    moves: &[Turn],
    solved: bool,
) -> circlet::Result<()> {
    let mut session = Session::new(NullView, open_store(store)?, seed);
    session.load_level(&Catalog, level)?;
    if solved {
        session.reset_to_solved()?;
    }
    let mut won = false;
    for turn in moves {
        won = session.turn(turn.circle, turn.steps)?;
    }
    let pieces = session.level().map_or(0, |l| l.pieces().len());
    let passing = session.level().map_or(0, |l| {
        l.pieces().iter().filter(|p| l.piece_passes(p)).count()
    });
    println!("Applied {} turns to level {level}", moves.len());
    println!("{passing}/{pieces} pieces in place");
    if won {
        println!("Congratulations!");
    }
    Ok(())
}

/// Prints solved levels.
fn run_progress(store: &Path) -> circlet::Result<()> {
    let store = open_store(store)?;
    let solved = store.solved_levels();
    if solved.is_empty() {
        println!("No levels solved yet");
    } else {
        let list: Vec<_> = solved.iter().map(ToString::to_string).collect();
        println!("Solved levels: {}", list.join(", "));
    }
    Ok(())
}

/// Sets the win-check override.
fn run_force_check(store: &Path, state: Switch) -> circlet::Result<()> {
    let mut store = open_store(store)?;
    let enabled = matches!(state, Switch::On);
    store.set_force_win_check(enabled)?;
    println!("Win check outside play mode {}", if enabled { "on" } else { "off" });
    Ok(())
}
