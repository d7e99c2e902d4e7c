//! ASCII rendering of a level
//!
//! Tiles are laid out in the same staggered pattern as the pixel grid: one
//! glyph per tile, two text rows per grid row, with odd columns dropped half
//! a tile so the honeycomb adjacency stays readable.

use rustc_hash::FxHashMap;

use hexhive_core::{EntityId, EntityKind, Level, Orientation, TileIndex, TileType};

/// One-line glyph legend for help screens
pub const LEGEND: &str = "@ player   # block   * block on spot   o spot   . cell   = slab";

/// Render the level as staggered text rows
pub fn render(level: &Level) -> String {
    let columns = usize::from(level.columns());
    let rows = usize::from(level.rows());

    // Tile -> occupant, built once instead of scanning entities per tile
    let mut occupancy: FxHashMap<TileIndex, EntityId> = FxHashMap::default();
    for (id, entity) in level.entities().iter().enumerate() {
        occupancy.insert(entity.tile(), id);
    }

    let width = (columns - 1) * 2 + 1;
    let mut canvas = vec![vec![' '; width]; rows * 2];

    for row in 0..rows {
        for column in 0..columns {
            let index = (row * columns + column) as TileIndex;
            let tile_type = level.tile_types()[usize::from(index)];

            let glyph = match occupancy.get(&index) {
                Some(&id) => entity_glyph(level.entities()[id].kind(), tile_type),
                None => tile_glyph(tile_type),
            };

            canvas[row * 2 + column % 2][column * 2] = glyph;
        }
    }

    let mut lines: Vec<String> = canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect();

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    lines.join("\n")
}

/// Human-readable name for the player's facing
pub fn facing_label(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::UpperRight => "upper-right",
        Orientation::UpperMiddle => "up",
        Orientation::UpperLeft => "upper-left",
        Orientation::LowerLeft => "lower-left",
        Orientation::LowerMiddle => "down",
        Orientation::LowerRight => "lower-right",
    }
}

fn tile_glyph(tile_type: TileType) -> char {
    match tile_type {
        TileType::Empty => ' ',
        TileType::Cell => '.',
        TileType::Spot => 'o',
        TileType::Slab => '=',
    }
}

fn entity_glyph(kind: EntityKind, tile_type: TileType) -> char {
    match kind {
        EntityKind::Player => '@',
        EntityKind::Block if tile_type == TileType::Spot => '*',
        EntityKind::Block => '#',
    }
}

// ============================================================================
// TESTS
// ============================================================================
