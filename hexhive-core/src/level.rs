//! Level simulation
//!
//! A level owns the tile grid, the entity list and both step histories.
//! Logical inputs resolve into [`Change`] records, one per affected entity;
//! the records are applied through the entity mutation path and sealed into
//! the step history as one undoable step. Undo and redo replay reversed
//! records through the same path.

use hexhive_geometry::{colors, Geometry, SKIRT_ALL, SKIRT_BOTTOM, SKIRT_LEFT, SKIRT_RIGHT};

use crate::entity::{Entity, EntityId, EntityKind};
use crate::hex::{HexNeighbor, Orientation, TileIndex};
use crate::history::{Change, ChangeKind, Input, MoveKind, StepHistory};
use crate::loader::LevelData;
use crate::metrics::{Bounds, GridMetrics, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileType {
    Empty,
    Cell,
    Spot,
    Slab,
}

impl TileType {
    /// Tile code used by the level JSON format
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TileType::Empty),
            1 => Some(TileType::Cell),
            2 => Some(TileType::Spot),
            3 => Some(TileType::Slab),
            _ => None,
        }
    }
}

/// Audio cue emitted by the simulation; the frontend drains and plays them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Move,
    Push,
    Turn,
    Hit,
    Win,
}

/// Snapshot of one tile returned by [`Level::query_tile`]
#[derive(Clone, Copy, Debug)]
pub struct TileQuery {
    pub tile_type: TileType,
    pub entity: Option<EntityId>,
    pub position: Point,
}

type CompletionCallback = Box<dyn FnMut()>;

pub struct Level {
    columns: u8,
    rows: u8,
    tiles: Vec<TileType>,
    entities: Vec<Entity>,
    player: EntityId,
    metrics: GridMetrics,
    grid_geometry: Geometry,
    step_history: StepHistory,
    undo_history: StepHistory,
    buffered_input: Option<Input>,
    solved: bool,
    sounds: Vec<Sound>,
    on_completion: Option<CompletionCallback>,
}

impl Level {
    /// Build a running level from validated data, sized to the given window
    pub fn new(data: &LevelData, width: f32, height: f32) -> Self {
        let entities: Vec<Entity> = data
            .entities
            .iter()
            .map(|spec| Entity::new(spec.kind, spec.tile(data.columns), spec.orientation))
            .collect();

        let player = entities
            .iter()
            .position(|entity| entity.kind() == EntityKind::Player)
            .unwrap_or(0);

        let mut level = Self {
            columns: data.columns,
            rows: data.rows,
            tiles: data.tiles.clone(),
            entities,
            player,
            metrics: GridMetrics::from_size(
                Bounds::new(0.0, 0.0, width, height),
                usize::from(data.columns),
                usize::from(data.rows),
            ),
            grid_geometry: Geometry::new(),
            step_history: StepHistory::new(),
            undo_history: StepHistory::new(),
            buffered_input: None,
            solved: false,
            sounds: Vec::new(),
            on_completion: None,
        };

        level.resize(width, height);
        level.solved = level.spots_covered();
        level
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_types(&self) -> &[TileType] {
        &self.tiles
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The controlled entity
    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// Tessellated tile faces and rims, rebuilt on every resize
    pub fn grid_geometry(&self) -> &Geometry {
        &self.grid_geometry
    }

    /// Whether every spot tile is covered by a block
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Number of undoable steps taken so far
    pub fn step_count(&self) -> usize {
        self.step_history.step_count()
    }

    pub fn can_undo(&self) -> bool {
        !self.step_history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undo_history.is_empty()
    }

    /// Whether every animation has finished and no input is waiting in the
    /// replay buffer; frame-stepped frontends poll this between inputs
    pub fn is_settled(&self) -> bool {
        self.buffered_input.is_none() && self.entities.iter().all(Entity::can_change)
    }

    /// Drain the sound cues emitted since the last call
    pub fn take_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.sounds)
    }

    /// Invoked once each time the level transitions into the solved state
    /// through a committed push
    pub fn set_completion_callback(&mut self, callback: impl FnMut() + 'static) {
        self.on_completion = Some(Box::new(callback));
    }

    /// Tile type, occupant and pixel center for an in-range tile index
    pub fn query_tile(&self, tile: TileIndex) -> Option<TileQuery> {
        let tile_type = *self.tiles.get(usize::from(tile))?;
        Some(TileQuery {
            tile_type,
            entity: self.entity_at(tile),
            position: self.tile_point(tile),
        })
    }

    /// Entity occupying a tile, if any
    pub fn entity_at(&self, tile: TileIndex) -> Option<EntityId> {
        self.entities.iter().position(|entity| entity.tile() == tile)
    }

    /// Feed one logical input into the simulation
    ///
    /// If the player is mid-animation the input lands in a single-slot
    /// buffer and replays when the player next becomes idle; a second input
    /// while one is buffered is dropped.
    pub fn handle_input(&mut self, input: Input) {
        if self.entities.get(self.player).is_none() {
            tracing::warn!(?input, "input ignored, level has no controllable entity");
            return;
        }

        match input {
            Input::Forward | Input::Backward => self.move_step(input),
            Input::Left | Input::Right => self.turn_step(input),
            Input::Undo => self.undo(),
            Input::Redo => self.redo(),
        }
    }

    /// Advance the simulation by `delta_time` milliseconds
    pub fn update(&mut self, delta_time: f32) {
        if self.buffered_input.is_some() && self.player_can_change() {
            if let Some(input) = self.buffered_input.take() {
                self.handle_input(input);
            }
        }

        for entity in &mut self.entities {
            if entity.kind() != EntityKind::Player {
                entity.update(delta_time);
            }
        }

        // Players update last
        for entity in &mut self.entities {
            if entity.kind() == EntityKind::Player {
                entity.update(delta_time);
            }
        }
    }

    /// Refit the grid to a window, rebuild the tile geometry and snap
    /// entities onto the rescaled tile centers
    pub fn resize(&mut self, width: f32, height: f32) {
        let padding = width.min(height) / 10.0;
        let bounds = Bounds::new(padding, padding, width - padding * 2.0, height - padding * 2.0);

        let mut metrics =
            GridMetrics::from_size(bounds, usize::from(self.columns), usize::from(self.rows));

        // Lift the grid by half the rim thickness so the extruded rim still
        // sits inside the bounding box
        let thickness = metrics.tile_radius / 2.0;
        metrics.bounds.y -= thickness / 2.0;
        metrics.grid.y -= thickness / 2.0;
        self.metrics = metrics;

        self.rebuild_grid_geometry();

        let tile_radius = self.metrics.tile_radius;
        for index in 0..self.entities.len() {
            let position = self.tile_point(self.entities[index].tile());
            let last_position = self.tile_point(self.entities[index].last_tile());
            self.entities[index].resize(tile_radius, position, last_position);
        }
    }

    // ========================================================================
    // INPUT RESOLUTION
    // ========================================================================

    fn player_can_change(&self) -> bool {
        self.entities.get(self.player).is_some_and(Entity::can_change)
    }

    fn buffer_input(&mut self, input: Input) {
        if self.buffered_input.is_none() {
            self.buffered_input = Some(input);
        }
    }

    fn move_step(&mut self, input: Input) {
        if !self.player_can_change() {
            self.buffer_input(input);
            return;
        }

        let player = self.player;
        let mut direction = self.entities[player].orientation();
        if input == Input::Backward {
            direction = direction.reverse();
        }

        let mut tile = self.entities[player].tile();
        let mut current = player;
        let mut first = true;

        loop {
            let last_tile = tile;

            let Some(next_tile) = direction.advance(last_tile, self.columns, self.rows) else {
                // The blocked entity joins the chain so it recoils too
                self.step_history.stage(Change {
                    entity: current,
                    input,
                    kind: ChangeKind::Move {
                        kind: if first { MoveKind::Walk } else { MoveKind::Pushed },
                        last_tile,
                        next_tile: last_tile,
                    },
                });
                self.reject_pending(direction);
                return;
            };

            let occupant = self.entity_at(next_tile);
            let kind = match (first, occupant) {
                (true, None) => MoveKind::Walk,
                (true, Some(_)) => MoveKind::Push,
                (false, _) => MoveKind::Pushed,
            };

            self.step_history.stage(Change {
                entity: current,
                input,
                kind: ChangeKind::Move {
                    kind,
                    last_tile,
                    next_tile,
                },
            });

            if self.tiles[usize::from(next_tile)] == TileType::Empty {
                self.reject_pending(direction);
                return;
            }

            // Players may stand on slabs; blocks cannot be pushed onto them
            if self.tiles[usize::from(next_tile)] == TileType::Slab
                && self.entities[current].kind() == EntityKind::Block
            {
                self.reject_pending(direction);
                return;
            }

            let Some(next_entity) = occupant else {
                self.undo_history.clear();
                let changes = self.step_history.commit_pending();
                self.apply_changes(&changes);

                if first {
                    self.sounds.push(Sound::Move);
                    return;
                }

                let was_solved = self.solved;
                self.solved = self.spots_covered();
                if !was_solved && self.solved {
                    if let Some(callback) = self.on_completion.as_mut() {
                        callback();
                    }
                    self.sounds.push(Sound::Win);
                    return;
                }

                self.sounds.push(Sound::Push);
                return;
            };

            current = next_entity;
            tile = next_tile;
            first = false;
        }
    }

    fn turn_step(&mut self, input: Input) {
        if !self.player_can_change() {
            self.buffer_input(input);
            return;
        }

        let player = self.player;
        let last_orientation = self.entities[player].orientation();
        let next_orientation = if input == Input::Right {
            last_orientation.turn_right()
        } else {
            last_orientation.turn_left()
        };

        self.step_history.stage(Change {
            entity: player,
            input,
            kind: ChangeKind::Turn {
                last_orientation,
                next_orientation,
            },
        });

        let changes = self.step_history.commit_pending();
        self.apply_changes(&changes);
        self.undo_history.clear();
        self.sounds.push(Sound::Turn);
    }

    fn undo(&mut self) {
        if !self.player_can_change() {
            self.buffer_input(Input::Undo);
            return;
        }

        let changes = StepHistory::swap_step(&mut self.step_history, &mut self.undo_history);
        self.replay_changes(&changes);
    }

    fn redo(&mut self) {
        if !self.player_can_change() {
            self.buffer_input(Input::Redo);
            return;
        }

        let changes = StepHistory::swap_step(&mut self.undo_history, &mut self.step_history);
        self.replay_changes(&changes);
    }

    /// Unwind the pending chain: every staged entity plays a bounce toward
    /// `direction`, nothing is recorded
    fn reject_pending(&mut self, direction: Orientation) {
        let changes = self.step_history.discard_pending(direction);
        self.apply_changes(&changes);
        self.sounds.push(Sound::Hit);
    }

    /// Apply replayed changes from an undo or redo with their sound cues
    fn replay_changes(&mut self, changes: &[Change]) {
        for change in changes {
            match change.kind {
                ChangeKind::Move {
                    kind: MoveKind::Walk,
                    ..
                } => self.sounds.push(Sound::Move),
                ChangeKind::Move {
                    kind: MoveKind::Push,
                    ..
                } => self.sounds.push(Sound::Push),
                ChangeKind::Move { .. } | ChangeKind::Invalid { .. } => {}
                ChangeKind::Turn { .. } => self.sounds.push(Sound::Turn),
            }
        }

        self.apply_changes(changes);

        // Replays can cover or uncover spots but never fire the completion
        // callback; only an original push does
        if !changes.is_empty() {
            self.solved = self.spots_covered();
        }
    }

    fn apply_changes(&mut self, changes: &[Change]) {
        for change in changes {
            let Some(entity) = self.entities.get(change.entity) else {
                continue;
            };

            let tile = match change.kind {
                ChangeKind::Move { next_tile, .. } => next_tile,
                ChangeKind::Turn { .. } | ChangeKind::Invalid { .. } => entity.tile(),
            };

            let tile_point = self.tile_point(tile);
            self.entities[change.entity].apply_change(change, tile_point);
        }
    }

    fn spots_covered(&self) -> bool {
        (0..self.tiles.len()).all(|index| {
            self.tiles[index] != TileType::Spot
                || self
                    .entity_at(index as TileIndex)
                    .is_some_and(|id| self.entities[id].kind() == EntityKind::Block)
        })
    }

    /// Pixel center of a tile; entities on slabs ride a quarter radius high
    fn tile_point(&self, tile: TileIndex) -> Point {
        let mut point = self.metrics.tile_position_at(tile);
        if self.tiles.get(usize::from(tile)) == Some(&TileType::Slab) {
            point.y -= self.metrics.tile_radius / 4.0;
        }
        point
    }

    // ========================================================================
    // TESSELLATION
    // ========================================================================

    fn rebuild_grid_geometry(&mut self) {
        self.grid_geometry.clear();

        let radius = self.metrics.tile_radius;
        let thickness = radius / 2.0;
        let line_width = radius / 5.0;

        // Raised rim under every solid tile; edges facing a solid neighbor
        // are masked off so adjacent rims never overdraw
        self.grid_geometry.set_color(colors::GOLD);
        for row in 0..self.rows {
            for column in 0..self.columns {
                let index = usize::from(row) * usize::from(self.columns) + usize::from(column);
                let tile_type = self.tiles[index];
                if tile_type == TileType::Empty || tile_type == TileType::Slab {
                    continue;
                }

                let point = self.metrics.tile_position(usize::from(column), usize::from(row));

                let mut sides = SKIRT_ALL;
                let shared_edges = [
                    (HexNeighbor::Bottom, SKIRT_BOTTOM),
                    (HexNeighbor::BottomLeft, SKIRT_LEFT),
                    (HexNeighbor::BottomRight, SKIRT_RIGHT),
                ];

                for (neighbor, side) in shared_edges {
                    if let Some((neighbor_column, neighbor_row)) =
                        neighbor.locate(column, row, self.columns, self.rows)
                    {
                        let neighbor_index = usize::from(neighbor_row)
                            * usize::from(self.columns)
                            + usize::from(neighbor_column);
                        if self.tiles[neighbor_index] != TileType::Empty {
                            sides &= !side;
                        }
                    }
                }

                self.grid_geometry.write_hexagon_skirt(
                    point.x,
                    point.y,
                    radius + line_width / 2.0,
                    thickness,
                    sides,
                );
            }
        }

        // Tile faces: a light border hexagon under a filled one, gold marks
        // the spots
        for row in 0..self.rows {
            for column in 0..self.columns {
                let index = usize::from(row) * usize::from(self.columns) + usize::from(column);
                let tile_type = self.tiles[index];
                if tile_type == TileType::Empty || tile_type == TileType::Slab {
                    continue;
                }

                let point = self.metrics.tile_position(usize::from(column), usize::from(row));

                self.grid_geometry.set_color(colors::LIGHT_YELLOW);
                self.grid_geometry
                    .write_hexagon(point.x, point.y, radius + line_width / 2.0, 0.0);

                if tile_type == TileType::Spot {
                    self.grid_geometry.set_color(colors::GOLD);
                } else {
                    self.grid_geometry.set_color(colors::YELLOW);
                }

                self.grid_geometry
                    .write_hexagon(point.x, point.y, radius - line_width / 2.0, 0.0);
            }
        }

        // Slabs: a smaller raised platform floating above the grid plane
        let slab_thickness = thickness / 2.0;
        let slab_radius = radius - line_width;

        for row in 0..self.rows {
            for column in 0..self.columns {
                let index = usize::from(row) * usize::from(self.columns) + usize::from(column);
                if self.tiles[index] != TileType::Slab {
                    continue;
                }

                let mut point = self.metrics.tile_position(usize::from(column), usize::from(row));
                point.y -= slab_thickness;

                self.grid_geometry.set_color(colors::GOLD);
                self.grid_geometry.write_hexagon_skirt(
                    point.x,
                    point.y,
                    slab_radius + line_width / 2.0,
                    slab_thickness,
                    SKIRT_ALL,
                );

                self.grid_geometry.set_color(colors::LIGHT_YELLOW);
                self.grid_geometry
                    .write_hexagon(point.x, point.y, slab_radius + line_width / 2.0, 0.0);

                self.grid_geometry.set_color(colors::YELLOW);
                self.grid_geometry
                    .write_hexagon(point.x, point.y, slab_radius - line_width / 2.0, 0.0);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
