//! Pixel-space placement of a hex grid inside a bounding box
//!
//! [`GridMetrics`] turns a bounding box into tile radius, column/row counts
//! and a centered grid origin. Three derivations cover the layouts the game
//! needs:
//! - [`GridMetrics::from_radius`]: fixed tile size, fit as many tiles as the
//!   box holds (decorative backgrounds)
//! - [`GridMetrics::from_size`]: fixed tile counts, grow the radius to fill
//!   the box (level grids)
//! - [`GridMetrics::scrolling`]: fixed tile size and total count, extend the
//!   box along one axis (scrolling pickers)

use crate::hex::TileIndex;

/// 2D pixel position
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Scroll axis for [`GridMetrics::scrolling`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAxis {
    Horizontal,
    Vertical,
}

/// Placement of a flat-top hex grid: tile size, counts and centered origin
///
/// `distance_x` is the horizontal spacing between column centers (1.5 radii),
/// `distance_y` the vertical spacing between row centers (the hexagon
/// height). Odd columns render half a row lower than even ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    pub columns: usize,
    pub rows: usize,
    pub tile_count: usize,
    pub tile_radius: f32,
    pub distance_x: f32,
    pub distance_y: f32,
    /// Box the grid was fitted into
    pub bounds: Bounds,
    /// Extent of the grid itself, centered inside `bounds`
    pub grid: Bounds,
}

impl GridMetrics {
    /// Fixed tile radius; fit as many whole columns and rows as possible
    pub fn from_radius(bounds: Bounds, tile_radius: f32) -> Self {
        let distance_x = tile_radius * 1.5;
        let distance_y = tile_radius * 3.0f32.sqrt();

        let columns = (((bounds.width - tile_radius * 0.5) / distance_x) as usize).max(1);
        let rows = ((bounds.height / distance_y) as usize).max(1);

        Self::positioned(bounds, tile_radius, columns, rows, 0.0)
    }

    /// Fixed tile counts; largest radius whose grid still fits the box
    pub fn from_size(bounds: Bounds, columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);

        let radius_from_width = bounds.width / (1.5 * columns as f32 + 0.5);
        let radius_from_height = bounds.height / (3.0f32.sqrt() * (rows as f32 + 0.5));
        let tile_radius = radius_from_width.min(radius_from_height);

        // The odd-column half-row offset needs headroom once there is more
        // than one column
        let distance_y = tile_radius * 3.0f32.sqrt();
        let height_extension = if columns > 1 { distance_y / 2.0 } else { 0.0 };

        Self::positioned(bounds, tile_radius, columns, rows, height_extension)
    }

    /// Fixed tile radius and total count; the box is extended along the
    /// scroll axis until every tile fits
    pub fn scrolling(bounds: Bounds, tile_radius: f32, tile_count: usize, axis: GridAxis) -> Self {
        let distance_x = tile_radius * 1.5;
        let distance_y = tile_radius * 3.0f32.sqrt();
        let tile_count = tile_count.max(1);

        let mut bounds = bounds;
        let (columns, rows) = match axis {
            GridAxis::Vertical => {
                let columns =
                    (((bounds.width - tile_radius * 0.5) / distance_x) as usize).max(1);
                let rows = tile_count.div_ceil(columns);
                bounds.height = distance_y * rows as f32;
                (columns, rows)
            }
            GridAxis::Horizontal => {
                let rows = ((bounds.height / distance_y) as usize).max(1);
                let columns = tile_count.div_ceil(rows);
                bounds.width = distance_x * (columns - 1) as f32 + tile_radius * 2.0;
                (columns, rows)
            }
        };

        let mut metrics = Self::positioned(bounds, tile_radius, columns, rows, 0.0);
        metrics.tile_count = tile_count;
        metrics
    }

    fn positioned(
        bounds: Bounds,
        tile_radius: f32,
        columns: usize,
        rows: usize,
        height_extension: f32,
    ) -> Self {
        let distance_x = tile_radius * 1.5;
        let distance_y = tile_radius * 3.0f32.sqrt();

        let grid_width = distance_x * (columns - 1) as f32 + tile_radius * 2.0;
        let grid_height = distance_y * rows as f32 + height_extension;

        let grid = Bounds {
            x: bounds.x + (bounds.width - grid_width) / 2.0,
            y: bounds.y + (bounds.height - grid_height) / 2.0,
            width: grid_width,
            height: grid_height,
        };

        Self {
            columns,
            rows,
            tile_count: columns * rows,
            tile_radius,
            distance_x,
            distance_y,
            bounds,
            grid,
        }
    }

    /// Pixel center of the tile at `(column, row)`
    pub fn tile_position(&self, column: usize, row: usize) -> Point {
        let odd_column_offset = if column & 1 == 1 {
            self.distance_y / 2.0
        } else {
            0.0
        };

        Point {
            x: self.grid.x + self.tile_radius + column as f32 * self.distance_x,
            y: self.grid.y + self.distance_y / 2.0 + row as f32 * self.distance_y + odd_column_offset,
        }
    }

    /// Pixel center of the tile at a flat index
    pub fn tile_position_at(&self, index: TileIndex) -> Point {
        let column = index as usize % self.columns;
        let row = index as usize / self.columns;
        self.tile_position(column, row)
    }
}

// ============================================================================
// TESTS
// ============================================================================
