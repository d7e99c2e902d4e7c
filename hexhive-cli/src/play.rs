//! Play command - drive a level interactively in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_level(), play_session()
//! - Level 3: apply_token(), settle(), print_board()
//! - Level 4: translate_token(), formatting utilities

use std::cell::Cell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;

use hexhive_core::{Input, Level, LevelData, Sound};

use crate::ascii;

/// Nominal window the animations run in; the ASCII board never reads pixel
/// positions, so any size works
const WINDOW_WIDTH: f32 = 640.0;
const WINDOW_HEIGHT: f32 = 480.0;

/// Fixed simulation tick between prompts, in milliseconds
const TICK_MILLIS: f32 = 50.0;

/// Longest animation is well under a second; 200 ticks of headroom
const MAX_SETTLE_TICKS: usize = 200;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Level JSON file
    #[arg(value_name = "FILE")]
    pub level: PathBuf,

    /// Suppress sound cue lines
    #[arg(long)]
    pub quiet: bool,
}

/// What one input token asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Simulation(Input),
    Help,
    Quit,
    Unknown,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Load the level
/// 2. Hook the completion callback
/// 3. Loop over input lines until quit, EOF or boredom
pub fn run(args: PlayArgs) -> Result<()> {
    let data = load_level(&args.level)?;
    let mut level = Level::new(&data, WINDOW_WIDTH, WINDOW_HEIGHT);

    let completed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&completed);
    level.set_completion_callback(move || flag.set(true));

    println!("HEXHIVE - {}", args.level.display());
    print_help();
    print_board(&level);

    play_session(&mut level, &completed, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load and validate the level file
fn load_level(path: &Path) -> Result<LevelData> {
    LevelData::from_path(path)
        .with_context(|| format!("Failed to load level: {}", path.display()))
}

/// Prompt, read and apply input lines until the player quits
fn play_session(level: &mut Level, completed: &Rc<Cell<bool>>, args: &PlayArgs) -> Result<()> {
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF
            println!();
            return Ok(());
        }

        let mut board_dirty = false;
        for token in line.split_whitespace() {
            match translate_token(token) {
                Token::Simulation(input) => {
                    apply_token(level, input, args.quiet);
                    board_dirty = true;
                }
                Token::Help => print_help(),
                Token::Quit => return Ok(()),
                Token::Unknown => println!("unknown input '{token}' (h for help)"),
            }
        }

        if board_dirty {
            print_board(level);
        }

        if completed.take() {
            println!();
            println!("*** All spots covered in {} steps! ***", level.step_count());
            println!("(z rewinds, q quits)");
        }
    }
}

// ============================================================================
// LEVEL 3 - INPUT AND BOARD
// ============================================================================

/// Feed one input and run the clock until the animations finish
fn apply_token(level: &mut Level, input: Input, quiet: bool) {
    level.handle_input(input);
    settle(level);

    let sounds = level.take_sounds();
    if !quiet {
        for sound in sounds {
            println!("  {}", sound_cue(sound));
        }
    }
}

/// Advance the simulation in fixed ticks until everything is idle
fn settle(level: &mut Level) {
    for _ in 0..MAX_SETTLE_TICKS {
        if level.is_settled() {
            return;
        }
        level.update(TICK_MILLIS);
    }

    tracing::warn!("level did not settle within {MAX_SETTLE_TICKS} ticks");
}

fn print_board(level: &Level) {
    println!();
    println!("{}", ascii::render(level));
    println!();

    let player = &level.entities()[level.player()];
    println!(
        "steps: {}   facing: {}   undo: {}   redo: {}",
        level.step_count(),
        ascii::facing_label(player.orientation()),
        if level.can_undo() { "yes" } else { "no" },
        if level.can_redo() { "yes" } else { "no" },
    );
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Map one whitespace-separated token to a command
///
/// Accepts WASD, single letters and full words; several tokens on one line
/// run in order.
fn translate_token(token: &str) -> Token {
    match token.to_ascii_lowercase().as_str() {
        "w" | "f" | "forward" => Token::Simulation(Input::Forward),
        "s" | "b" | "back" | "backward" => Token::Simulation(Input::Backward),
        "a" | "l" | "left" => Token::Simulation(Input::Left),
        "d" | "r" | "right" => Token::Simulation(Input::Right),
        "z" | "u" | "undo" => Token::Simulation(Input::Undo),
        "x" | "y" | "redo" => Token::Simulation(Input::Redo),
        "h" | "?" | "help" => Token::Help,
        "q" | "quit" | "exit" => Token::Quit,
        _ => Token::Unknown,
    }
}

fn sound_cue(sound: Sound) -> &'static str {
    match sound {
        Sound::Move => "(buzz)",
        Sound::Push => "(scrape)",
        Sound::Turn => "(flit)",
        Sound::Hit => "(thud)",
        Sound::Win => "(fanfare)",
    }
}

fn print_help() {
    println!("  w/f forward   s/b backward   a left   d right");
    println!("  z undo   x redo   h help   q quit");
    println!("  {}", ascii::LEGEND);
}

// ============================================================================
// TESTS
// ============================================================================
