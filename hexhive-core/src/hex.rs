//! Hex grid addressing over an odd-q offset layout
//!
//! Tiles are flat-top hexagons stored row-major in a flat array. Odd columns
//! sit half a tile lower than even columns, so stepping diagonally adjusts
//! the row depending on the parity of the column being left. Two kinds of
//! adjacency live here:
//! - [`Orientation`]: the six facings an entity can move along
//! - [`HexNeighbor`]: the six surrounding tiles, used for grid decoration

/// Index into a level's flat tile array (`row * columns + column`)
pub type TileIndex = u16;

// ============================================================================
// ORIENTATION
// ============================================================================

/// Facing of an entity, named by the hexagon edge it points at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    UpperRight,
    UpperMiddle,
    UpperLeft,
    LowerLeft,
    LowerMiddle,
    LowerRight,
}

/// All orientations in turn-left order
pub const ORIENTATIONS: [Orientation; 6] = [
    Orientation::UpperRight,
    Orientation::UpperMiddle,
    Orientation::UpperLeft,
    Orientation::LowerLeft,
    Orientation::LowerMiddle,
    Orientation::LowerRight,
];

impl Orientation {
    /// Facing angle in radians, counterclockwise from the positive x axis
    pub fn angle(self) -> f32 {
        (self as usize as f32 * 2.0 + 1.0) * std::f32::consts::PI / 6.0
    }

    pub fn turn_left(self) -> Orientation {
        ORIENTATIONS[(self as usize + 1) % 6]
    }

    pub fn turn_right(self) -> Orientation {
        ORIENTATIONS[(self as usize + 5) % 6]
    }

    pub fn reverse(self) -> Orientation {
        ORIENTATIONS[(self as usize + 3) % 6]
    }

    pub fn from_code(code: u8) -> Option<Orientation> {
        ORIENTATIONS.get(code as usize).copied()
    }

    /// Step one tile along this facing
    ///
    /// Horizontal facings change the row depending on the parity of the
    /// column being left: leaving an even column the upper diagonals climb a
    /// row, leaving an odd column the lower diagonals descend one. Returns
    /// `None` when the step leaves the grid.
    pub fn advance(self, index: TileIndex, columns: u8, rows: u8) -> Option<TileIndex> {
        if columns == 0 || index >= columns as TileIndex * rows as TileIndex {
            return None;
        }

        let column = (index % columns as TileIndex) as i16;
        let row = (index / columns as TileIndex) as i16;
        let odd_column = column & 1 == 1;

        let mut next_column = column;
        let mut next_row = row;

        match self {
            Orientation::UpperRight => {
                next_column += 1;
                if !odd_column {
                    next_row -= 1;
                }
            }
            Orientation::UpperMiddle => {
                next_row -= 1;
            }
            Orientation::UpperLeft => {
                next_column -= 1;
                if !odd_column {
                    next_row -= 1;
                }
            }
            Orientation::LowerLeft => {
                next_column -= 1;
                if odd_column {
                    next_row += 1;
                }
            }
            Orientation::LowerMiddle => {
                next_row += 1;
            }
            Orientation::LowerRight => {
                next_column += 1;
                if odd_column {
                    next_row += 1;
                }
            }
        }

        if next_column < 0 || next_row < 0 || next_column >= columns as i16 || next_row >= rows as i16
        {
            return None;
        }

        Some((next_row * columns as i16 + next_column) as TileIndex)
    }
}

// ============================================================================
// NEIGHBOR LOOKUP
// ============================================================================

/// The six tiles surrounding a hexagon
///
/// Decoration-only adjacency: movement goes through [`Orientation::advance`],
/// this enum feeds the skirt masking when the grid mesh is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HexNeighbor {
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

pub const HEX_NEIGHBORS: [HexNeighbor; 6] = [
    HexNeighbor::Top,
    HexNeighbor::Bottom,
    HexNeighbor::TopLeft,
    HexNeighbor::TopRight,
    HexNeighbor::BottomLeft,
    HexNeighbor::BottomRight,
];

/// Neighbor offsets (column, row) when the home column is even
const EVEN_NEIGHBOR_OFFSETS: [(i8, i8); 6] = [
    (0, -1), // Top
    (0, 1),  // Bottom
    (-1, -1), // TopLeft
    (1, -1), // TopRight
    (-1, 0), // BottomLeft
    (1, 0),  // BottomRight
];

/// Neighbor offsets (column, row) when the home column is odd
const ODD_NEIGHBOR_OFFSETS: [(i8, i8); 6] = [
    (0, -1), // Top
    (0, 1),  // Bottom
    (-1, 0), // TopLeft
    (1, 0),  // TopRight
    (-1, 1), // BottomLeft
    (1, 1),  // BottomRight
];

impl HexNeighbor {
    /// Coordinates of this neighbor of `(column, row)`, or `None` off-grid
    pub fn locate(self, column: u8, row: u8, columns: u8, rows: u8) -> Option<(u8, u8)> {
        let offsets = if column & 1 == 1 {
            &ODD_NEIGHBOR_OFFSETS
        } else {
            &EVEN_NEIGHBOR_OFFSETS
        };

        let (column_offset, row_offset) = offsets[self as usize];
        let neighbor_column = column as i16 + column_offset as i16;
        let neighbor_row = row as i16 + row_offset as i16;

        if neighbor_column < 0
            || neighbor_row < 0
            || neighbor_column >= columns as i16
            || neighbor_row >= rows as i16
        {
            return None;
        }

        Some((neighbor_column as u8, neighbor_row as u8))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_are_mutual_inverses() {
        for orientation in ORIENTATIONS {
            assert_eq!(orientation.turn_left().turn_right(), orientation);
            assert_eq!(orientation.turn_right().turn_left(), orientation);
        }
    }

    #[test]
    fn test_six_turns_are_identity() {
        for orientation in ORIENTATIONS {
            let mut turned = orientation;
            for _ in 0..6 {
                turned = turned.turn_left();
            }
            assert_eq!(turned, orientation);
        }
    }

    #[test]
    fn test_reverse_is_involution() {
        for orientation in ORIENTATIONS {
            assert_ne!(orientation.reverse(), orientation);
            assert_eq!(orientation.reverse().reverse(), orientation);
        }
    }

    #[test]
    fn test_angles_cover_the_circle() {
        for (index, orientation) in ORIENTATIONS.iter().enumerate() {
            let expected = (index as f32 * 2.0 + 1.0) * std::f32::consts::PI / 6.0;
            assert!((orientation.angle() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_advance_even_column_parity() {
        // 3x3 grid, start at center of column 0 (even): index 3
        let columns = 3;
        let rows = 3;

        assert_eq!(Orientation::UpperRight.advance(3, columns, rows), Some(1));
        assert_eq!(Orientation::UpperMiddle.advance(3, columns, rows), Some(0));
        assert_eq!(Orientation::LowerMiddle.advance(3, columns, rows), Some(6));
        assert_eq!(Orientation::LowerRight.advance(3, columns, rows), Some(4));

        // Left steps fall off column -1
        assert_eq!(Orientation::UpperLeft.advance(3, columns, rows), None);
        assert_eq!(Orientation::LowerLeft.advance(3, columns, rows), None);
    }

    #[test]
    fn test_advance_odd_column_parity() {
        // Start at center tile of a 3x3 grid: column 1 (odd), row 1, index 4
        let columns = 3;
        let rows = 3;

        // Upper diagonals stay on the same row leaving an odd column
        assert_eq!(Orientation::UpperRight.advance(4, columns, rows), Some(5));
        assert_eq!(Orientation::UpperLeft.advance(4, columns, rows), Some(3));

        // Lower diagonals descend a row
        assert_eq!(Orientation::LowerRight.advance(4, columns, rows), Some(8));
        assert_eq!(Orientation::LowerLeft.advance(4, columns, rows), Some(6));

        assert_eq!(Orientation::UpperMiddle.advance(4, columns, rows), Some(1));
        assert_eq!(Orientation::LowerMiddle.advance(4, columns, rows), Some(7));
    }

    #[test]
    fn test_advance_rejects_grid_edges() {
        assert_eq!(Orientation::UpperMiddle.advance(0, 3, 3), None);
        assert_eq!(Orientation::LowerMiddle.advance(6, 3, 3), None);
        assert_eq!(Orientation::UpperLeft.advance(0, 3, 3), None);
        assert_eq!(Orientation::LowerRight.advance(8, 3, 3), None);
    }

    #[test]
    fn test_advance_then_reverse_round_trips() {
        let columns = 5;
        let rows = 4;

        for index in 0..(columns as TileIndex * rows as TileIndex) {
            for orientation in ORIENTATIONS {
                if let Some(next) = orientation.advance(index, columns, rows) {
                    assert_eq!(
                        orientation.reverse().advance(next, columns, rows),
                        Some(index),
                        "round trip failed from {index} via {orientation:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbor_parity_tables() {
        // Even home column
        assert_eq!(HexNeighbor::TopRight.locate(2, 2, 5, 5), Some((3, 1)));
        assert_eq!(HexNeighbor::BottomRight.locate(2, 2, 5, 5), Some((3, 2)));

        // Odd home column
        assert_eq!(HexNeighbor::TopRight.locate(1, 2, 5, 5), Some((2, 2)));
        assert_eq!(HexNeighbor::BottomRight.locate(1, 2, 5, 5), Some((2, 3)));

        // Vertical neighbors ignore parity
        assert_eq!(HexNeighbor::Top.locate(1, 2, 5, 5), Some((1, 1)));
        assert_eq!(HexNeighbor::Bottom.locate(2, 2, 5, 5), Some((2, 3)));
    }

    #[test]
    fn test_neighbor_bounds() {
        assert_eq!(HexNeighbor::Top.locate(0, 0, 3, 3), None);
        assert_eq!(HexNeighbor::BottomLeft.locate(0, 2, 3, 3), None);
        assert_eq!(HexNeighbor::BottomRight.locate(2, 2, 3, 3), None);
        assert_eq!(HexNeighbor::Bottom.locate(1, 2, 3, 3), None);
    }
}
