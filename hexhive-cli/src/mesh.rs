//! Mesh command - export the tessellated level as JSON
//!
//! Emits the vertex and index buffers a renderer would upload, one batch per
//! draw unit: the tile grid first, then one batch per entity in update
//! order. Colors ride along per vertex and triangles are listed in paint
//! order, so drawing the batches in sequence layers overlapping shapes
//! correctly.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_level(), build_mesh(), write_output()
//! - Level 3: batch_from(), write_player(), write_block()
//! - Level 4: naming utilities

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use hexhive_core::{Entity, EntityKind, Level, LevelData, Point};
use hexhive_geometry::{colors, rotate_point, Geometry};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct MeshArgs {
    /// Level JSON file
    #[arg(value_name = "FILE")]
    pub level: PathBuf,

    /// Window width the grid is fitted into
    #[arg(long, default_value = "640")]
    pub width: f32,

    /// Window height the grid is fitted into
    #[arg(long, default_value = "480")]
    pub height: f32,

    /// Write to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct JsonVertex {
    position: [f32; 2],
    color: [u8; 4],
}

#[derive(serde::Serialize)]
struct JsonBatch {
    name: String,
    vertices: Vec<JsonVertex>,
    indices: Vec<u16>,
}

#[derive(serde::Serialize)]
struct JsonMesh {
    width: f32,
    height: f32,
    batches: Vec<JsonBatch>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run mesh command
///
/// This function reads like a table of contents:
/// 1. Load the level at the requested window size
/// 2. Tessellate the grid and every entity
/// 3. Write the JSON to the output file or stdout
pub fn run(args: MeshArgs) -> Result<()> {
    let data = load_level(&args.level)?;
    let level = Level::new(&data, args.width, args.height);

    let mesh = build_mesh(&level, args.width, args.height);

    write_output(&mesh, args.output.as_deref())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load and validate the level file
fn load_level(path: &Path) -> Result<LevelData> {
    LevelData::from_path(path)
        .with_context(|| format!("Failed to load level: {}", path.display()))
}

fn build_mesh(level: &Level, width: f32, height: f32) -> JsonMesh {
    let mut batches = Vec::with_capacity(level.entities().len() + 1);
    batches.push(batch_from("grid", level.grid_geometry()));

    for (id, entity) in level.entities().iter().enumerate() {
        let mut geometry = Geometry::new();
        match entity.kind() {
            EntityKind::Player => write_player(&mut geometry, entity),
            EntityKind::Block => write_block(&mut geometry, entity),
        }

        let name = format!("{}-{id}", kind_name(entity.kind()));
        batches.push(batch_from(&name, &geometry));
    }

    JsonMesh {
        width,
        height,
        batches,
    }
}

fn write_output(mesh: &JsonMesh, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(mesh).context("Failed to serialize mesh")?;

    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote mesh to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - TESSELLATION
// ============================================================================

fn batch_from(name: &str, geometry: &Geometry) -> JsonBatch {
    JsonBatch {
        name: name.to_string(),
        vertices: geometry
            .vertices()
            .iter()
            .map(|vertex| JsonVertex {
                position: vertex.position,
                color: vertex.color,
            })
            .collect(),
        indices: geometry.indices().to_vec(),
    }
}

/// A block is a squat golden drum: side face first, then the raised top so
/// the extrusion reads from the front
fn write_block(geometry: &mut Geometry, entity: &Entity) {
    let Point { x, y } = entity.position();
    let tile_radius = entity.radius() * entity.scale();
    let thickness = tile_radius / 5.0;

    geometry.set_color(colors::GOLD);
    geometry.write_rectangle(x, y, tile_radius, thickness, 0.0);
    geometry.write_hexagon(x, y + thickness / 2.0, tile_radius / 2.0, 0.0);

    geometry.set_color(colors::LIGHT_YELLOW);
    geometry.write_hexagon(x, y - thickness / 2.0, tile_radius / 2.0, 0.0);
}

/// The bee: capsule body with yellow ends, two curled antennas, a stinger
/// and a pair of wings hinged behind the head
///
/// Everything is laid out facing the positive x axis, then spun around the
/// body center to the entity's facing. The y axis points down on screen, so
/// the spin uses the negated angle.
fn write_player(geometry: &mut Geometry, entity: &Entity) {
    let Some(player) = entity.player() else {
        return;
    };

    let tile_radius = entity.radius() * entity.scale();
    let (float_x, float_y, float_angle) = player.float_offsets();

    let mut position = entity.position();
    position.x += float_x * tile_radius / 5.0;
    position.y += float_y * tile_radius / 5.0;

    let rotation = entity.angle() + float_angle;
    let wings_angle = player.wings_angle() + float_angle;
    let antenna_offset = player.antenna_offset();

    let body_length = tile_radius * 1.25;
    let body_thickness = tile_radius / 1.5;
    let line_width = tile_radius / 10.0;

    let mut back_circle = [
        position.x - body_length / 2.0 + body_thickness / 2.0,
        position.y,
    ];
    let mut front_circle = [
        position.x + body_length / 2.0 - body_thickness / 2.0,
        position.y,
    ];

    let outer_circle_radius = body_thickness / 2.0 + line_width / 2.0;
    let inner_circle_radius = body_thickness / 2.0 - line_width / 2.0;

    // Antenna roots sit on the head, tips curl up and away; the tips and
    // their near control points trail movement by the bounce offset
    let mut left_antenna_root = [
        front_circle[0] + body_thickness / 3.0,
        position.y - body_thickness / 3.0,
    ];
    let mut left_antenna_tip = [
        front_circle[0] + tile_radius / 1.5,
        position.y - tile_radius / 1.5,
    ];
    let mut left_control_from = [
        left_antenna_tip[0] - line_width * 1.5,
        left_antenna_tip[1] + body_thickness / 1.5,
    ];
    let mut left_control_to = [
        left_antenna_tip[0],
        left_antenna_tip[1] + body_thickness / 2.5,
    ];

    let mut right_antenna_root = [
        front_circle[0] + body_thickness / 3.0,
        position.y + body_thickness / 3.0,
    ];
    let mut right_antenna_tip = [
        front_circle[0] + tile_radius / 1.5,
        position.y + tile_radius / 1.5,
    ];
    let mut right_control_from = [
        right_antenna_tip[0] - line_width * 1.5,
        right_antenna_tip[1] - body_thickness / 1.5,
    ];
    let mut right_control_to = [
        right_antenna_tip[0],
        right_antenna_tip[1] - body_thickness / 2.5,
    ];

    for tip in [&mut left_antenna_tip, &mut right_antenna_tip] {
        tip[0] += tile_radius * antenna_offset.x;
        tip[1] += tile_radius * antenna_offset.y;
    }
    for control in [&mut left_control_to, &mut right_control_to] {
        control[0] += tile_radius * antenna_offset.x / 2.0;
        control[1] += tile_radius * antenna_offset.y / 2.0;
    }

    let mut stinger_a = [position.x - body_length / 2.0, position.y + line_width * 1.5];
    let mut stinger_b = [position.x - body_length / 2.0, position.y - line_width * 1.5];
    let mut stinger_tip = [
        position.x - body_length / 2.0 - line_width * 1.25,
        position.y,
    ];

    let wings_length = body_thickness - line_width;
    let wings_thickness = (wings_length - line_width) / 2.0;
    let wings_border_radii = [
        wings_length + line_width / 2.0,
        wings_thickness + line_width / 2.0,
    ];
    let wings_filled_radii = [
        wings_length - line_width / 2.0,
        wings_thickness - line_width / 2.0,
    ];

    let left_wing_angle = wings_angle;
    let right_wing_angle = 2.0 * PI - left_wing_angle;
    let wings_anchor = [front_circle[0] - line_width * 1.5, position.y];
    let wing_center = [wings_anchor[0] + wings_length / 1.5, wings_anchor[1]];

    let mut left_wing_center = rotate_point(wing_center, wings_anchor, left_wing_angle);
    left_wing_center[1] -= line_width;

    let mut right_wing_center = rotate_point(wing_center, wings_anchor, right_wing_angle);
    right_wing_center[1] += line_width;

    let origin = [position.x, position.y];
    for point in [
        &mut back_circle,
        &mut front_circle,
        &mut left_antenna_root,
        &mut left_antenna_tip,
        &mut left_control_from,
        &mut left_control_to,
        &mut right_antenna_root,
        &mut right_antenna_tip,
        &mut right_control_from,
        &mut right_control_to,
        &mut stinger_a,
        &mut stinger_b,
        &mut stinger_tip,
        &mut left_wing_center,
        &mut right_wing_center,
    ] {
        *point = rotate_point(*point, origin, -rotation);
    }

    geometry.set_color(colors::DARK_BROWN);
    geometry.write_circle(back_circle[0], back_circle[1], outer_circle_radius);
    geometry.write_circle(front_circle[0], front_circle[1], outer_circle_radius);

    geometry.set_color(colors::YELLOW);
    geometry.write_circle(back_circle[0], back_circle[1], inner_circle_radius);
    geometry.write_circle(front_circle[0], front_circle[1], inner_circle_radius);

    geometry.set_color(colors::DARK_BROWN);
    geometry.write_rectangle(
        position.x,
        position.y,
        body_length - body_thickness,
        body_thickness + line_width,
        -rotation,
    );
    geometry.write_circle(left_antenna_tip[0], left_antenna_tip[1], line_width);
    geometry.write_circle(right_antenna_tip[0], right_antenna_tip[1], line_width);
    geometry.write_bezier_curve(
        left_antenna_root,
        left_antenna_tip,
        left_control_from,
        left_control_to,
        line_width,
    );
    geometry.write_bezier_curve(
        right_antenna_root,
        right_antenna_tip,
        right_control_from,
        right_control_to,
        line_width,
    );
    geometry.write_triangle(stinger_a, stinger_b, stinger_tip);

    geometry.set_color(colors::DARK_BROWN);
    geometry.write_ellipse(
        left_wing_center[0],
        left_wing_center[1],
        wings_border_radii[0],
        wings_border_radii[1],
        -rotation + left_wing_angle,
    );
    geometry.set_color(colors::LIGHT_YELLOW);
    geometry.write_ellipse(
        left_wing_center[0],
        left_wing_center[1],
        wings_filled_radii[0],
        wings_filled_radii[1],
        -rotation + left_wing_angle,
    );

    geometry.set_color(colors::DARK_BROWN);
    geometry.write_ellipse(
        right_wing_center[0],
        right_wing_center[1],
        wings_border_radii[0],
        wings_border_radii[1],
        -rotation + right_wing_angle,
    );
    geometry.set_color(colors::LIGHT_YELLOW);
    geometry.write_ellipse(
        right_wing_center[0],
        right_wing_center[1],
        wings_filled_radii[0],
        wings_filled_radii[1],
        -rotation + right_wing_angle,
    );
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Player => "player",
        EntityKind::Block => "block",
    }
}

// ============================================================================
// TESTS
// ============================================================================
