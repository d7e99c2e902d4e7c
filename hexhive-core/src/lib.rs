//! HEXHIVE Core - Puzzle engine
//!
//! This crate provides the simulation behind the hexagonal block puzzle:
//! - Hex grid addressing (odd-q offset columns, flat-top tiles)
//! - Grid fitting and tile placement metrics
//! - Keyframe animation tracks with easing curves
//! - Entities (player bee, pushable blocks) and their motion cues
//! - Level state, push-chain resolution and step history (undo/redo)
//! - Level JSON parsing and validation

pub mod animation;
pub mod entity;
pub mod hex;
pub mod history;
pub mod level;
pub mod loader;
pub mod metrics;

// Re-exports for convenient access
pub use animation::{Easing, Lerp, Segment, Track};
pub use entity::{Entity, EntityId, EntityKind, PlayerState};
pub use hex::{HexNeighbor, Orientation, TileIndex, ORIENTATIONS};
pub use history::{Change, ChangeKind, Input, MoveKind, StepHistory};
pub use level::{Level, Sound, TileQuery, TileType};
pub use loader::{EntitySpec, LevelData, LevelError, DIMENSION_LIMIT};
pub use metrics::{Bounds, GridAxis, GridMetrics, Point};
