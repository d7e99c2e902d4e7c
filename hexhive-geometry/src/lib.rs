//! HEXHIVE Geometry - triangle-mesh tessellation
//!
//! This crate builds the vertex/index buffers that back every visible
//! element of the game: grid tiles, tile skirts (the extruded lower edges
//! that make tiles read as solid), blocks, and the player. It knows nothing
//! about the simulation; callers feed it positions and radii and hand the
//! finished buffers to whatever renderer they drive.
//!
//! Buffers are interleaved `Vertex { position, color }` plus a `u16` index
//! list, the layout expected by `RenderGeometry`-style 2D APIs and by GPU
//! vertex buffers alike.

use bytemuck::{Pod, Zeroable};

/// Vertices in one hexagon fan
pub const HEXAGON_VERTEX_COUNT: usize = 6;
/// Indices in one hexagon fan (4 triangles)
pub const HEXAGON_INDEX_COUNT: usize = 12;

/// Target edge length in pixels when subdividing curved outlines
const SEGMENT_LENGTH: f32 = 4.0;

// ============================================================================
// SKIRT SIDE MASKS
// ============================================================================

/// Lower-left edge of the hexagon
pub const SKIRT_LEFT: u8 = 1 << 0;
/// Bottom edge of the hexagon
pub const SKIRT_BOTTOM: u8 = 1 << 1;
/// Lower-right edge of the hexagon
pub const SKIRT_RIGHT: u8 = 1 << 2;

pub const SKIRT_NONE: u8 = 0;
pub const SKIRT_ALL: u8 = SKIRT_LEFT | SKIRT_BOTTOM | SKIRT_RIGHT;

// ============================================================================
// VERTEX
// ============================================================================

/// Interleaved 2D vertex: position plus straight-alpha RGBA color
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [u8; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [u8; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Rotate `point` around `origin` by `angle` radians
pub fn rotate_point(point: [f32; 2], origin: [f32; 2], angle: f32) -> [f32; 2] {
    let (sin, cos) = angle.sin_cos();
    let dx = point[0] - origin[0];
    let dy = point[1] - origin[1];
    [
        origin[0] + dx * cos - dy * sin,
        origin[1] + dx * sin + dy * cos,
    ]
}

/// Color palette shared by the tile grid and the entity meshes
pub mod colors {
    pub const BLACK: [u8; 4] = [0, 0, 0, 255];
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const YELLOW: [u8; 4] = [240, 170, 35, 255];
    pub const LIGHT_YELLOW: [u8; 4] = [255, 220, 120, 255];
    pub const GOLD: [u8; 4] = [190, 140, 35, 255];
    pub const BROWN: [u8; 4] = [50, 35, 15, 255];
    pub const DARK_BROWN: [u8; 4] = [35, 20, 0, 255];

    /// Straight-alpha variant of a palette color
    pub const fn with_alpha(color: [u8; 4], alpha: u8) -> [u8; 4] {
        [color[0], color[1], color[2], alpha]
    }
}

// ============================================================================
// GEOMETRY BUFFERS
// ============================================================================

/// Growable vertex/index buffers with a current draw color
///
/// Writers append triangles using the color set by [`Geometry::set_color`].
/// `clear` keeps the allocations, so a buffer rebuilt every resize (or every
/// frame) settles at its high-water capacity instead of reallocating.
#[derive(Clone, Debug)]
pub struct Geometry {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    color: [u8; 4],
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            color: [255, 255, 255, 255],
        }
    }

    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
            color: [255, 255, 255, 255],
        }
    }

    /// Drop all shapes but keep the allocations
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Color applied to every vertex written after this call
    pub fn set_color(&mut self, color: [u8; 4]) {
        self.color = color;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_vertex(&mut self, x: f32, y: f32) -> u16 {
        debug_assert!(self.vertices.len() < u16::MAX as usize);
        self.vertices.push(Vertex::new(x, y, self.color));
        (self.vertices.len() - 1) as u16
    }

    // ========================================================================
    // SHAPE WRITERS
    // ========================================================================

    pub fn write_triangle(&mut self, a: [f32; 2], b: [f32; 2], c: [f32; 2]) {
        let ia = self.push_vertex(a[0], a[1]);
        let ib = self.push_vertex(b[0], b[1]);
        let ic = self.push_vertex(c[0], c[1]);
        self.indices.extend_from_slice(&[ia, ib, ic]);
    }

    /// Convex quadrilateral, corners in winding order
    pub fn write_quadrilateral(&mut self, a: [f32; 2], b: [f32; 2], c: [f32; 2], d: [f32; 2]) {
        let ia = self.push_vertex(a[0], a[1]);
        let ib = self.push_vertex(b[0], b[1]);
        let ic = self.push_vertex(c[0], c[1]);
        let id = self.push_vertex(d[0], d[1]);
        self.indices.extend_from_slice(&[ia, ib, ic, ia, ic, id]);
    }

    /// Rectangle centered on `(x, y)`, rotated around its center
    pub fn write_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, rotation: f32) {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let origin = [x, y];

        let a = rotate_point([x - half_w, y - half_h], origin, rotation);
        let b = rotate_point([x + half_w, y - half_h], origin, rotation);
        let c = rotate_point([x + half_w, y + half_h], origin, rotation);
        let d = rotate_point([x - half_w, y + half_h], origin, rotation);

        self.write_quadrilateral(a, b, c, d);
    }

    pub fn write_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.write_ellipse(x, y, radius, radius, 0.0);
    }

    /// Filled ellipse as a fan around the center; subdivision follows the
    /// approximate perimeter so small shapes stay cheap
    pub fn write_ellipse(&mut self, x: f32, y: f32, radius_x: f32, radius_y: f32, rotation: f32) {
        if radius_x <= 0.0 || radius_y <= 0.0 {
            return;
        }

        let resolution = arc_resolution(ellipse_perimeter(radius_x, radius_y));

        let center = self.push_vertex(x, y);
        let first = self.vertices.len() as u16;

        let step = std::f32::consts::TAU / resolution as f32;
        for segment in 0..resolution {
            let angle = step * segment as f32;
            let point = rotate_point(
                [x + angle.cos() * radius_x, y + angle.sin() * radius_y],
                [x, y],
                rotation,
            );
            let _ = self.push_vertex(point[0], point[1]);
        }

        for segment in 0..resolution as u16 {
            let next = first + (segment + 1) % resolution as u16;
            self.indices
                .extend_from_slice(&[center, first + segment, next]);
        }
    }

    /// Straight stroked segment with square ends
    pub fn write_line(&mut self, from: [f32; 2], to: [f32; 2], line_width: f32) {
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            return;
        }

        let nx = (-dy / length) * line_width / 2.0;
        let ny = (dx / length) * line_width / 2.0;

        self.write_quadrilateral(
            [from[0] + nx, from[1] + ny],
            [to[0] + nx, to[1] + ny],
            [to[0] - nx, to[1] - ny],
            [from[0] - nx, from[1] - ny],
        );
    }

    /// Stroked cubic bezier curve from `from` to `to`
    ///
    /// Flattened into a quad strip; each rim pair sits on the curve normal, so
    /// the stroke keeps its width through bends.
    pub fn write_bezier_curve(
        &mut self,
        from: [f32; 2],
        to: [f32; 2],
        control_from: [f32; 2],
        control_to: [f32; 2],
        line_width: f32,
    ) {
        const LENGTH_SAMPLES: usize = 16;

        let mut estimated_length = 0.0;
        let mut previous = from;
        for sample in 1..=LENGTH_SAMPLES {
            let t = sample as f32 / LENGTH_SAMPLES as f32;
            let point = bezier_point(t, from, to, control_from, control_to);
            let dx = point[0] - previous[0];
            let dy = point[1] - previous[1];
            estimated_length += (dx * dx + dy * dy).sqrt();
            previous = point;
        }

        let resolution = arc_resolution(estimated_length);
        let half_width = line_width / 2.0;

        let rim = |point: [f32; 2], tangent: [f32; 2]| -> ([f32; 2], [f32; 2]) {
            let length = (tangent[0] * tangent[0] + tangent[1] * tangent[1]).sqrt();
            if length == 0.0 {
                return (point, point);
            }

            let nx = (-tangent[1] / length) * half_width;
            let ny = (tangent[0] / length) * half_width;
            (
                [point[0] - nx, point[1] - ny],
                [point[0] + nx, point[1] + ny],
            )
        };

        let (start_left, start_right) =
            rim(from, bezier_tangent(0.0, from, to, control_from, control_to));
        let mut left = self.push_vertex(start_left[0], start_left[1]);
        let mut right = self.push_vertex(start_right[0], start_right[1]);

        for segment in 1..=resolution {
            let t = segment as f32 / resolution as f32;
            let point = bezier_point(t, from, to, control_from, control_to);
            let tangent = bezier_tangent(t, from, to, control_from, control_to);
            let (next_left, next_right) = rim(point, tangent);

            let left2 = self.push_vertex(next_left[0], next_left[1]);
            let right2 = self.push_vertex(next_right[0], next_right[1]);

            self.indices
                .extend_from_slice(&[left, right, left2, left2, right, right2]);

            left = left2;
            right = right2;
        }
    }

    /// Flat-top hexagon: corners every 60° starting at the right-hand corner
    pub fn write_hexagon(&mut self, x: f32, y: f32, radius: f32, rotation: f32) {
        let step = std::f32::consts::PI / 3.0;

        let mut corners = [0u16; HEXAGON_VERTEX_COUNT];
        for (index, corner) in corners.iter_mut().enumerate() {
            let angle = rotation + step * index as f32;
            *corner = self.push_vertex(x + angle.cos() * radius, y + angle.sin() * radius);
        }

        self.indices.extend_from_slice(&[
            corners[1], corners[2], corners[3],
            corners[1], corners[3], corners[4],
            corners[1], corners[4], corners[5],
            corners[1], corners[5], corners[0],
        ]);
    }

    /// Extrude the three lower edges of a hexagon downward by `thickness`
    ///
    /// `sides` is a combination of `SKIRT_LEFT`, `SKIRT_BOTTOM` and
    /// `SKIRT_RIGHT`; edges shared with a neighboring tile are masked off by
    /// the caller so adjacent skirts never overdraw.
    pub fn write_hexagon_skirt(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        thickness: f32,
        sides: u8,
    ) {
        if sides == SKIRT_NONE {
            return;
        }

        let half_height = radius * 3.0f32.sqrt() / 2.0;

        // Lower corners, left to right
        let a = [x - radius, y];
        let b = [x - radius / 2.0, y + half_height];
        let c = [x + radius / 2.0, y + half_height];
        let d = [x + radius, y];

        let drop = |p: [f32; 2]| [p[0], p[1] + thickness];

        if sides & SKIRT_LEFT != 0 {
            self.write_quadrilateral(a, b, drop(b), drop(a));
        }

        if sides & SKIRT_BOTTOM != 0 {
            self.write_quadrilateral(b, c, drop(c), drop(b));
        }

        if sides & SKIRT_RIGHT != 0 {
            self.write_quadrilateral(c, d, drop(d), drop(c));
        }
    }
}

/// Segment count for a curve of the given length, clamped to a sane range
fn arc_resolution(length: f32) -> usize {
    let segments = (length / SEGMENT_LENGTH).ceil() as usize;
    segments.clamp(12, 256)
}

/// Ramanujan's approximation
fn ellipse_perimeter(radius_x: f32, radius_y: f32) -> f32 {
    std::f32::consts::PI
        * (3.0 * (radius_x + radius_y)
            - ((3.0 * radius_x + radius_y) * (radius_x + 3.0 * radius_y)).sqrt())
}

fn bezier_point(t: f32, from: [f32; 2], to: [f32; 2], c1: [f32; 2], c2: [f32; 2]) -> [f32; 2] {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;
    let uuu = uu * u;
    let ttt = tt * t;
    [
        uuu * from[0] + 3.0 * uu * t * c1[0] + 3.0 * u * tt * c2[0] + ttt * to[0],
        uuu * from[1] + 3.0 * uu * t * c1[1] + 3.0 * u * tt * c2[1] + ttt * to[1],
    ]
}

fn bezier_tangent(t: f32, from: [f32; 2], to: [f32; 2], c1: [f32; 2], c2: [f32; 2]) -> [f32; 2] {
    let u = 1.0 - t;
    [
        3.0 * u * u * (c1[0] - from[0])
            + 6.0 * u * t * (c2[0] - c1[0])
            + 3.0 * t * t * (to[0] - c2[0]),
        3.0 * u * u * (c1[1] - from[1])
            + 6.0 * u * t * (c2[1] - c1[1])
            + 3.0 * t * t * (to[1] - c2[1]),
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_valid(geometry: &Geometry) {
        for &index in geometry.indices() {
            assert!((index as usize) < geometry.vertex_count());
        }
        assert_eq!(geometry.index_count() % 3, 0);
    }

    #[test]
    fn test_triangle_counts() {
        let mut geometry = Geometry::new();
        geometry.write_triangle([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.index_count(), 3);
        assert_indices_valid(&geometry);
    }

    #[test]
    fn test_quadrilateral_counts() {
        let mut geometry = Geometry::new();
        geometry.write_quadrilateral([0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]);
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.index_count(), 6);
        assert_indices_valid(&geometry);
    }

    #[test]
    fn test_hexagon_counts() {
        let mut geometry = Geometry::new();
        geometry.write_hexagon(10.0, 10.0, 5.0, 0.0);
        assert_eq!(geometry.vertex_count(), HEXAGON_VERTEX_COUNT);
        assert_eq!(geometry.index_count(), HEXAGON_INDEX_COUNT);
        assert_indices_valid(&geometry);
    }

    #[test]
    fn test_hexagon_corners_on_radius() {
        let mut geometry = Geometry::new();
        geometry.write_hexagon(0.0, 0.0, 2.0, 0.0);

        for vertex in geometry.vertices() {
            let [x, y] = vertex.position;
            let distance = (x * x + y * y).sqrt();
            assert!((distance - 2.0).abs() < 1e-4);
        }

        // First corner sits on the +x axis
        assert!((geometry.vertices()[0].position[0] - 2.0).abs() < 1e-4);
        assert!(geometry.vertices()[0].position[1].abs() < 1e-4);
    }

    #[test]
    fn test_skirt_masking() {
        let mut geometry = Geometry::new();
        geometry.write_hexagon_skirt(0.0, 0.0, 2.0, 1.0, SKIRT_ALL);
        assert_eq!(geometry.index_count(), 18); // 3 quads

        geometry.clear();
        geometry.write_hexagon_skirt(0.0, 0.0, 2.0, 1.0, SKIRT_BOTTOM);
        assert_eq!(geometry.index_count(), 6); // 1 quad

        geometry.clear();
        geometry.write_hexagon_skirt(0.0, 0.0, 2.0, 1.0, SKIRT_NONE);
        assert!(geometry.is_empty());
    }

    #[test]
    fn test_skirt_extends_downward() {
        let mut geometry = Geometry::new();
        geometry.write_hexagon_skirt(0.0, 0.0, 2.0, 3.0, SKIRT_BOTTOM);

        let max_y = geometry
            .vertices()
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        let bottom_edge = 2.0 * 3.0f32.sqrt() / 2.0;
        assert!((max_y - (bottom_edge + 3.0)).abs() < 1e-4);
    }

    #[test]
    fn test_ellipse_fan_valid() {
        let mut geometry = Geometry::new();
        geometry.write_ellipse(5.0, 5.0, 8.0, 4.0, 0.5);
        assert!(geometry.vertex_count() >= 13); // center + at least 12 segments
        assert_eq!(
            geometry.index_count(),
            (geometry.vertex_count() - 1) * 3
        );
        assert_indices_valid(&geometry);
    }

    #[test]
    fn test_line_is_one_quad() {
        let mut geometry = Geometry::new();
        geometry.write_line([0.0, 0.0], [10.0, 0.0], 2.0);
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.index_count(), 6);

        // Rim sits half a width off the axis
        for vertex in geometry.vertices() {
            assert!((vertex.position[1].abs() - 1.0).abs() < 1e-5);
        }

        geometry.clear();
        geometry.write_line([3.0, 3.0], [3.0, 3.0], 2.0);
        assert!(geometry.is_empty());
    }

    #[test]
    fn test_bezier_strip_counts() {
        let mut geometry = Geometry::new();
        geometry.write_bezier_curve([0.0, 0.0], [40.0, 0.0], [10.0, 20.0], [30.0, 20.0], 2.0);

        // Quad strip: one rim pair per sample, two triangles per segment
        assert_eq!(geometry.vertex_count() % 2, 0);
        assert_eq!(
            geometry.index_count(),
            (geometry.vertex_count() - 2) * 3
        );
        assert_indices_valid(&geometry);
    }

    #[test]
    fn test_bezier_stroke_width_on_straight_curve() {
        let mut geometry = Geometry::new();
        geometry.write_bezier_curve([0.0, 0.0], [60.0, 0.0], [20.0, 0.0], [40.0, 0.0], 4.0);

        for vertex in geometry.vertices() {
            assert!((vertex.position[1].abs() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rectangle_rotation_preserves_center() {
        let mut geometry = Geometry::new();
        geometry.write_rectangle(3.0, 4.0, 2.0, 1.0, 1.2);

        let (sum_x, sum_y) = geometry
            .vertices()
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), v| {
                (sx + v.position[0], sy + v.position[1])
            });
        assert!((sum_x / 4.0 - 3.0).abs() < 1e-4);
        assert!((sum_y / 4.0 - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_applies_to_following_vertices() {
        let mut geometry = Geometry::new();
        geometry.set_color(colors::GOLD);
        geometry.write_triangle([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        geometry.set_color(colors::DARK_BROWN);
        geometry.write_triangle([2.0, 0.0], [3.0, 0.0], [2.0, 1.0]);

        assert_eq!(geometry.vertices()[0].color, colors::GOLD);
        assert_eq!(geometry.vertices()[3].color, colors::DARK_BROWN);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut geometry = Geometry::with_capacity(64, 64);
        geometry.write_hexagon(0.0, 0.0, 1.0, 0.0);
        let capacity = geometry.vertices.capacity();
        geometry.clear();
        assert_eq!(geometry.vertex_count(), 0);
        assert!(geometry.vertices.capacity() >= capacity);
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let rotated = rotate_point([1.0, 0.0], [0.0, 0.0], std::f32::consts::FRAC_PI_2);
        assert!(rotated[0].abs() < 1e-6);
        assert!((rotated[1] - 1.0).abs() < 1e-6);
    }
}
