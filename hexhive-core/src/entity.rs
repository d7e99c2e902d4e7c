//! Entities living on the grid
//!
//! An entity tracks both its logical tile/orientation and a pixel-space
//! presentation (position, angle, scale) driven by animation tracks. The
//! logical fields update the moment a change is applied; the presentation
//! catches up over the following frames.

use std::f32::consts::PI;

use crate::animation::{Easing, Segment, Track};
use crate::hex::{Orientation, TileIndex};
use crate::history::{Change, ChangeKind, Input, MoveKind};
use crate::metrics::Point;

/// Index into the owning level's entity list
pub type EntityId = usize;

const CLOSED_WINGS_ANGLE: f32 = -PI * 5.0 / 6.0;
const OPEN_WINGS_ANGLE: f32 = -PI * 4.0 / 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Block,
}

/// Animated state specific to the player bee
#[derive(Clone, Debug)]
pub struct PlayerState {
    wings_angle: f32,
    antenna_offset: Point,
    float_time: f32,
    flapping: Track<f32>,
    bouncing: Track<Point>,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            wings_angle: CLOSED_WINGS_ANGLE,
            antenna_offset: Point::ZERO,
            float_time: 0.0,
            flapping: Track::new(vec![
                Segment::new(CLOSED_WINGS_ANGLE, OPEN_WINGS_ANGLE, Easing::SineIn, 60.0),
                Segment::new(OPEN_WINGS_ANGLE, CLOSED_WINGS_ANGLE, Easing::SineOut, 60.0)
                    .with_delay(30.0),
            ]),
            bouncing: Track::new(vec![
                Segment::lazy(Point::ZERO, Easing::SineOut, 100.0),
                Segment::lazy(Point::ZERO, Easing::SineInOut, 100.0),
            ]),
        }
    }

    /// Hinge angle of the wings, before the hover wobble
    pub fn wings_angle(&self) -> f32 {
        self.wings_angle
    }

    /// Antenna tip displacement in units of the entity radius
    pub fn antenna_offset(&self) -> Point {
        self.antenna_offset
    }

    /// Idle hover displacement `(x, y, angle)` in units of the entity radius
    pub fn float_offsets(&self) -> (f32, f32, f32) {
        let float_x = self.float_time.cos() / 5.0;
        let float_y = self.float_time.sin() / 5.0;
        let float_angle = (float_x + float_y) / 2.5;
        (float_x, float_y, float_angle)
    }
}

#[derive(Clone, Debug)]
enum Payload {
    Player(PlayerState),
    Block,
}

#[derive(Clone, Debug)]
pub struct Entity {
    last_tile: TileIndex,
    next_tile: TileIndex,
    last_orientation: Orientation,
    next_orientation: Orientation,
    position: Point,
    angle: f32,
    scale: f32,
    radius: f32,
    moving: Track<Point>,
    turning: Track<f32>,
    scaling: Track<f32>,
    recoiling: Track<Point>,
    payload: Payload,
}

impl Entity {
    pub(crate) fn new(kind: EntityKind, tile: TileIndex, orientation: Orientation) -> Self {
        Self {
            last_tile: tile,
            next_tile: tile,
            last_orientation: orientation,
            next_orientation: orientation,
            position: Point::ZERO,
            angle: orientation.angle(),
            scale: 1.0,
            radius: 0.0,
            moving: Track::new(vec![Segment::new(
                Point::ZERO,
                Point::ZERO,
                Easing::QuadInOut,
                100.0,
            )]),
            turning: Track::new(vec![Segment::lazy(0.0, Easing::SineOut, 100.0).relative()]),
            scaling: Track::new(vec![
                Segment::lazy(1.0, Easing::QuadOut, 50.0),
                Segment::lazy(1.0, Easing::SineIn, 200.0),
            ]),
            recoiling: Track::new(vec![
                Segment::lazy(Point::ZERO, Easing::QuadOut, 150.0),
                Segment::lazy(Point::ZERO, Easing::QuadIn, 150.0),
            ]),
            payload: match kind {
                EntityKind::Player => Payload::Player(PlayerState::new()),
                EntityKind::Block => Payload::Block,
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.payload {
            Payload::Player(_) => EntityKind::Player,
            Payload::Block => EntityKind::Block,
        }
    }

    /// Tile the entity occupies (its destination while mid-move)
    pub fn tile(&self) -> TileIndex {
        self.next_tile
    }

    /// Tile the entity last moved away from
    pub fn last_tile(&self) -> TileIndex {
        self.last_tile
    }

    pub fn orientation(&self) -> Orientation {
        self.next_orientation
    }

    /// Pixel-space center, mid-animation values included
    pub fn position(&self) -> Point {
        self.position
    }

    /// Presentation rotation in radians; accumulates eased turn offsets
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.payload {
            Payload::Player(player) => Some(player),
            Payload::Block => None,
        }
    }

    /// Whether a new logical change may begin
    ///
    /// Scaling and the player-only cosmetic tracks do not gate input.
    pub fn can_change(&self) -> bool {
        !self.moving.is_active() && !self.turning.is_active() && !self.recoiling.is_active()
    }

    /// Apply one change; `tile_point` is the pixel center of the change's
    /// destination tile (the current tile for turns and rejections)
    pub(crate) fn apply_change(&mut self, change: &Change, tile_point: Point) {
        match change.kind {
            ChangeKind::Turn {
                last_orientation,
                next_orientation,
            } => {
                self.last_orientation = last_orientation;
                self.next_orientation = next_orientation;

                let spin = if change.input == Input::Right { -1.0 } else { 1.0 };
                self.turning.set_target(0, spin * PI / 3.0);
                self.turning.start();
                self.pulse_scale(1.1);

                if let Payload::Player(player) = &mut self.payload {
                    let bounce_y = if change.input == Input::Right { 0.125 } else { -0.125 };
                    player.bouncing.set_target(0, Point::new(0.125, bounce_y));
                    player.bouncing.start();
                }
            }

            ChangeKind::Invalid { direction } => {
                let angle = -direction.angle();
                let away = Point::new(
                    tile_point.x + angle.cos() * self.radius / 5.0,
                    tile_point.y + angle.sin() * self.radius / 5.0,
                );

                self.recoiling.set_target(0, away);
                self.recoiling.set_target(1, tile_point);
                self.recoiling.start();
                self.pulse_scale(1.1);

                if let Payload::Player(player) = &mut self.payload {
                    player.flapping.start();

                    let bounce_x = if change.input == Input::Forward { -0.125 } else { 0.125 };
                    player.bouncing.set_target(0, Point::new(bounce_x, 0.0));
                    player.bouncing.start();
                }
            }

            ChangeKind::Move {
                kind,
                last_tile,
                next_tile,
            } => {
                self.last_tile = last_tile;
                self.next_tile = next_tile;

                self.moving.set_from(0, self.position);
                self.moving.set_target(0, tile_point);
                self.moving.set_easing(
                    0,
                    match kind {
                        MoveKind::Walk => Easing::QuadInOut,
                        MoveKind::Push => Easing::QuadOut,
                        MoveKind::Pushed => Easing::QuadIn,
                    },
                );
                self.moving.start();
                self.pulse_scale(1.2);

                if let Payload::Player(player) = &mut self.payload {
                    player.flapping.start();

                    let bounce_x = if change.input == Input::Forward { -0.25 } else { 0.25 };
                    player.bouncing.set_target(0, Point::new(bounce_x, 0.0));
                    player.bouncing.start();
                }
            }
        }
    }

    fn pulse_scale(&mut self, peak: f32) {
        self.scaling.set_target(0, peak);
        self.scaling.restart();
    }

    /// Advance all animation tracks by `delta_time` milliseconds
    pub fn update(&mut self, delta_time: f32) {
        self.moving.update(&mut self.position, delta_time);
        self.turning.update(&mut self.angle, delta_time);
        self.scaling.update(&mut self.scale, delta_time);
        self.recoiling.update(&mut self.position, delta_time);

        if let Payload::Player(player) = &mut self.payload {
            player.flapping.update(&mut player.wings_angle, delta_time);
            player.bouncing.update(&mut player.antenna_offset, delta_time);
            player.float_time += delta_time / 500.0;
        }
    }

    /// Adopt a new tile radius and snap to the tile center; an in-flight
    /// move is retargeted so it lands on the rescaled grid
    pub(crate) fn resize(&mut self, radius: f32, position: Point, last_position: Point) {
        self.radius = radius;
        self.position = position;

        if self.moving.is_active() {
            self.moving.set_from(0, last_position);
            self.moving.set_target(0, position);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_change(last_tile: TileIndex, next_tile: TileIndex) -> Change {
        Change {
            entity: 0,
            input: Input::Forward,
            kind: ChangeKind::Move {
                kind: MoveKind::Walk,
                last_tile,
                next_tile,
            },
        }
    }

    fn settled(entity: &mut Entity) {
        entity.update(10_000.0);
    }

    #[test]
    fn test_fresh_entity_accepts_changes() {
        let entity = Entity::new(EntityKind::Player, 0, Orientation::UpperMiddle);
        assert!(entity.can_change());
        assert_eq!(entity.tile(), 0);
        assert_eq!(entity.orientation(), Orientation::UpperMiddle);
    }

    #[test]
    fn test_move_updates_tile_and_animates_position() {
        let mut entity = Entity::new(EntityKind::Block, 0, Orientation::UpperMiddle);
        entity.resize(40.0, Point::new(100.0, 100.0), Point::new(100.0, 100.0));

        entity.apply_change(&walk_change(0, 1), Point::new(160.0, 100.0));
        assert_eq!(entity.tile(), 1);
        assert_eq!(entity.last_tile(), 0);
        assert!(!entity.can_change());

        // Position is still en route part way through
        entity.update(50.0);
        assert!(entity.position().x > 100.0);
        assert!(entity.position().x < 160.0);

        settled(&mut entity);
        assert!((entity.position().x - 160.0).abs() < 1e-3);
        assert!(entity.can_change());
    }

    #[test]
    fn test_turn_left_adds_a_sixth_of_a_circle() {
        let mut entity = Entity::new(EntityKind::Player, 0, Orientation::UpperMiddle);
        let start_angle = entity.angle();

        let change = Change {
            entity: 0,
            input: Input::Left,
            kind: ChangeKind::Turn {
                last_orientation: Orientation::UpperMiddle,
                next_orientation: Orientation::UpperLeft,
            },
        };
        entity.apply_change(&change, Point::ZERO);
        assert_eq!(entity.orientation(), Orientation::UpperLeft);
        assert!(!entity.can_change());

        settled(&mut entity);
        assert!((entity.angle() - start_angle - PI / 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_turn_right_subtracts_a_sixth_of_a_circle() {
        let mut entity = Entity::new(EntityKind::Player, 0, Orientation::UpperMiddle);
        let start_angle = entity.angle();

        let change = Change {
            entity: 0,
            input: Input::Right,
            kind: ChangeKind::Turn {
                last_orientation: Orientation::UpperMiddle,
                next_orientation: Orientation::UpperRight,
            },
        };
        entity.apply_change(&change, Point::ZERO);
        settled(&mut entity);
        assert!((entity.angle() - start_angle + PI / 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_rejection_recoils_and_returns() {
        let mut entity = Entity::new(EntityKind::Player, 3, Orientation::UpperRight);
        let home = Point::new(200.0, 150.0);
        entity.resize(40.0, home, home);

        let change = Change {
            entity: 0,
            input: Input::Forward,
            kind: ChangeKind::Invalid {
                direction: Orientation::UpperRight,
            },
        };
        entity.apply_change(&change, home);
        assert_eq!(entity.tile(), 3);
        assert!(!entity.can_change());

        // Leans away from home mid-recoil
        entity.update(75.0);
        let displaced = entity.position();
        assert!((displaced.x - home.x).abs() + (displaced.y - home.y).abs() > 0.5);

        settled(&mut entity);
        assert!((entity.position().x - home.x).abs() < 1e-3);
        assert!((entity.position().y - home.y).abs() < 1e-3);
        assert!(entity.can_change());
    }

    #[test]
    fn test_scale_pulses_and_settles_back() {
        let mut entity = Entity::new(EntityKind::Block, 0, Orientation::UpperMiddle);
        entity.resize(40.0, Point::ZERO, Point::ZERO);

        entity.apply_change(&walk_change(0, 1), Point::new(60.0, 0.0));
        entity.update(50.0);
        assert!((entity.scale() - 1.2).abs() < 1e-3);

        settled(&mut entity);
        assert!((entity.scale() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_wings_flap_and_close_again() {
        let mut entity = Entity::new(EntityKind::Player, 0, Orientation::UpperMiddle);
        entity.resize(40.0, Point::ZERO, Point::ZERO);

        entity.apply_change(&walk_change(0, 1), Point::new(60.0, 0.0));

        entity.update(60.0);
        let open = entity.player().map(|player| player.wings_angle());
        assert!((open.unwrap() - OPEN_WINGS_ANGLE).abs() < 1e-3);

        settled(&mut entity);
        let closed = entity.player().map(|player| player.wings_angle());
        assert!((closed.unwrap() - CLOSED_WINGS_ANGLE).abs() < 1e-3);
    }

    #[test]
    fn test_antenna_bounces_and_returns_to_rest() {
        let mut entity = Entity::new(EntityKind::Player, 0, Orientation::UpperMiddle);
        entity.resize(40.0, Point::ZERO, Point::ZERO);

        entity.apply_change(&walk_change(0, 1), Point::new(60.0, 0.0));

        entity.update(100.0);
        let bounced = entity.player().map(|player| player.antenna_offset());
        assert!((bounced.unwrap().x + 0.25).abs() < 1e-3);

        settled(&mut entity);
        let rest = entity.player().map(|player| player.antenna_offset());
        assert!(rest.unwrap().x.abs() < 1e-3);
        assert!(rest.unwrap().y.abs() < 1e-3);
    }

    #[test]
    fn test_blocks_have_no_player_state() {
        let entity = Entity::new(EntityKind::Block, 0, Orientation::UpperMiddle);
        assert!(entity.player().is_none());
        assert_eq!(entity.kind(), EntityKind::Block);
    }

    #[test]
    fn test_resize_retargets_an_active_move() {
        let mut entity = Entity::new(EntityKind::Block, 0, Orientation::UpperMiddle);
        entity.resize(40.0, Point::new(100.0, 100.0), Point::new(100.0, 100.0));
        entity.apply_change(&walk_change(0, 1), Point::new(160.0, 100.0));
        entity.update(10.0);

        // The window doubled; both endpoints shift
        entity.resize(80.0, Point::new(320.0, 200.0), Point::new(200.0, 200.0));

        settled(&mut entity);
        assert!((entity.position().x - 320.0).abs() < 1e-3);
        assert!((entity.position().y - 200.0).abs() < 1e-3);
    }
}
