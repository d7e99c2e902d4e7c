//! Show command - level summary and ASCII map
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_level(), report()
//! - Level 3: take_census(), print_text_report(), print_json_report()

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use hexhive_core::{EntityKind, Level, LevelData, TileType};

use crate::ascii;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct ShowArgs {
    /// Level JSON file
    #[arg(value_name = "FILE")]
    pub level: PathBuf,

    /// Window width the grid is fitted into
    #[arg(long, default_value = "640")]
    pub width: f32,

    /// Window height the grid is fitted into
    #[arg(long, default_value = "480")]
    pub height: f32,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Per-type tallies of a level's tiles and entities
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Census {
    cells: usize,
    spots: usize,
    slabs: usize,
    holes: usize,
    players: usize,
    blocks: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run show command
///
/// This function reads like a table of contents:
/// 1. Load the level
/// 2. Build it at the requested window size
/// 3. Report the census and the map
pub fn run(args: ShowArgs) -> Result<()> {
    let data = load_level(&args.level)?;
    let level = Level::new(&data, args.width, args.height);

    report(&level, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load and validate the level file
fn load_level(path: &Path) -> Result<LevelData> {
    LevelData::from_path(path)
        .with_context(|| format!("Failed to load level: {}", path.display()))
}

fn report(level: &Level, args: &ShowArgs) {
    let census = take_census(level);

    if args.json {
        print_json_report(level, &census, args);
    } else {
        print_text_report(level, &census, args);
    }
}

// ============================================================================
// LEVEL 3 - CENSUS AND REPORTS
// ============================================================================

fn take_census(level: &Level) -> Census {
    let mut census = Census::default();

    for tile_type in level.tile_types() {
        match tile_type {
            TileType::Cell => census.cells += 1,
            TileType::Spot => census.spots += 1,
            TileType::Slab => census.slabs += 1,
            TileType::Empty => census.holes += 1,
        }
    }

    for entity in level.entities() {
        match entity.kind() {
            EntityKind::Player => census.players += 1,
            EntityKind::Block => census.blocks += 1,
        }
    }

    census
}

/// Print the report as text
fn print_text_report(level: &Level, census: &Census, args: &ShowArgs) {
    let metrics = level.metrics();

    println!("level: {}", args.level.display());
    println!(
        "grid: {} columns x {} rows ({} tiles)",
        level.columns(),
        level.rows(),
        level.tile_count()
    );
    println!(
        "tiles: {} cells, {} spots, {} slabs, {} holes",
        census.cells, census.spots, census.slabs, census.holes
    );
    println!(
        "entities: {} player, {} blocks",
        census.players, census.blocks
    );
    println!(
        "metrics: tile radius {:.1}px, grid {:.0}x{:.0} in a {:.0}x{:.0} window",
        metrics.tile_radius, metrics.grid.width, metrics.grid.height, args.width, args.height
    );
    println!(
        "solved at load: {}",
        if level.is_solved() { "yes" } else { "no" }
    );
    println!();
    println!("{}", ascii::render(level));
    println!();
    println!("{}", ascii::LEGEND);
}

/// Print the report as JSON
fn print_json_report(level: &Level, census: &Census, args: &ShowArgs) {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        file: String,
        columns: u8,
        rows: u8,
        tile_count: usize,
        cells: usize,
        spots: usize,
        slabs: usize,
        holes: usize,
        players: usize,
        blocks: usize,
        tile_radius: f32,
        solved: bool,
        map: Vec<String>,
    }

    let output = JsonOutput {
        file: args.level.display().to_string(),
        columns: level.columns(),
        rows: level.rows(),
        tile_count: level.tile_count(),
        cells: census.cells,
        spots: census.spots,
        slabs: census.slabs,
        holes: census.holes,
        players: census.players,
        blocks: census.blocks,
        tile_radius: level.metrics().tile_radius,
        solved: level.is_solved(),
        map: ascii::render(level).lines().map(str::to_string).collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

// ============================================================================
// TESTS
// ============================================================================
