//! Undo/redo step history
//!
//! Changes accumulate in a pending region at the tail of the change log;
//! sealing the region with an offset turns it into a step. Undo and redo are
//! one operation run on two histories with the roles swapped, so every undo
//! is itself a redoable step in the other buffer.

use crate::entity::EntityId;
use crate::hex::{Orientation, TileIndex};

const INITIAL_CAPACITY: usize = 64;

/// Logical command fed into the level by the input layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Forward,
    Backward,
    Left,
    Right,
    Undo,
    Redo,
}

impl Input {
    /// Mirror for replaying a change in the opposite direction
    pub fn reversed(self) -> Self {
        match self {
            Input::Forward => Input::Backward,
            Input::Backward => Input::Forward,
            Input::Left => Input::Right,
            Input::Right => Input::Left,
            Input::Undo => Input::Redo,
            Input::Redo => Input::Undo,
        }
    }
}

/// How a move change came about; selects its easing and sound cue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// The mover stepped onto a free tile
    Walk,
    /// The mover shoved a chain ahead of itself
    Push,
    /// A chain link displaced by the mover
    Pushed,
}

/// What happened to one entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Move {
        kind: MoveKind,
        last_tile: TileIndex,
        next_tile: TileIndex,
    },
    Turn {
        last_orientation: Orientation,
        next_orientation: Orientation,
    },
    /// A rejected attempt toward `direction`; cosmetic only, never recorded
    Invalid { direction: Orientation },
}

/// One entity mutation inside a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Change {
    pub entity: EntityId,
    pub input: Input,
    pub kind: ChangeKind,
}

impl Change {
    /// The change that exactly unwinds this one
    ///
    /// Rejections have nothing to unwind and return `None`.
    fn reversed(self) -> Option<Self> {
        let kind = match self.kind {
            ChangeKind::Move {
                kind,
                last_tile,
                next_tile,
            } => ChangeKind::Move {
                kind,
                last_tile: next_tile,
                next_tile: last_tile,
            },
            ChangeKind::Turn {
                last_orientation,
                next_orientation,
            } => ChangeKind::Turn {
                last_orientation: next_orientation,
                next_orientation: last_orientation,
            },
            ChangeKind::Invalid { .. } => return None,
        };

        Some(Change {
            entity: self.entity,
            input: self.input.reversed(),
            kind,
        })
    }
}

/// Append-only change log grouped into steps by offsets
#[derive(Debug)]
pub struct StepHistory {
    changes: Vec<Change>,
    step_offsets: Vec<usize>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self {
            changes: Vec::with_capacity(INITIAL_CAPACITY),
            step_offsets: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Number of sealed steps
    pub fn step_count(&self) -> usize {
        self.step_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.step_offsets.is_empty()
    }

    /// Drop all steps and any pending changes
    pub fn clear(&mut self) {
        self.changes.clear();
        self.step_offsets.clear();
    }

    fn pending_start(&self) -> usize {
        self.step_offsets.last().copied().unwrap_or(0)
    }

    /// Append a change to the open pending region
    pub fn stage(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Seal the pending region into a step
    ///
    /// Returns the sealed changes in application order, newest staged first;
    /// a push chain's tail reacts before the links behind it.
    pub fn commit_pending(&mut self) -> Vec<Change> {
        let start = self.pending_start();
        if start == self.changes.len() {
            return Vec::new();
        }

        self.step_offsets.push(self.changes.len());
        self.changes[start..].iter().rev().copied().collect()
    }

    /// Throw away the pending region
    ///
    /// Returns one rejection change per staged entity, newest first, so each
    /// can play its bounce reaction toward `direction`. Nothing is recorded.
    pub fn discard_pending(&mut self, direction: Orientation) -> Vec<Change> {
        let start = self.pending_start();

        let rejected = self.changes[start..]
            .iter()
            .rev()
            .map(|change| Change {
                kind: ChangeKind::Invalid { direction },
                ..*change
            })
            .collect();

        self.changes.truncate(start);
        rejected
    }

    /// Move the most recent step of `source` onto `destination`, reversing
    /// each change
    ///
    /// Undo and redo are both this operation; they differ only in which
    /// history plays which role. Returns the reversed changes in application
    /// order, oldest first. An empty `source` returns nothing.
    pub fn swap_step(source: &mut Self, destination: &mut Self) -> Vec<Change> {
        let Some(&step_end) = source.step_offsets.last() else {
            return Vec::new();
        };

        let step_start = if source.step_offsets.len() > 1 {
            source.step_offsets[source.step_offsets.len() - 2]
        } else {
            0
        };

        let reversed: Vec<Change> = source.changes[step_start..step_end]
            .iter()
            .filter_map(|change| change.reversed())
            .collect();

        destination.changes.extend_from_slice(&reversed);
        destination.step_offsets.push(destination.changes.len());

        source.changes.truncate(step_start);
        source.step_offsets.pop();

        reversed
    }
}

impl Default for StepHistory {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(entity: EntityId, last_tile: TileIndex, next_tile: TileIndex) -> Change {
        Change {
            entity,
            input: Input::Forward,
            kind: ChangeKind::Move {
                kind: MoveKind::Walk,
                last_tile,
                next_tile,
            },
        }
    }

    fn push(entity: EntityId, last_tile: TileIndex, next_tile: TileIndex) -> Change {
        Change {
            entity,
            input: Input::Forward,
            kind: ChangeKind::Move {
                kind: MoveKind::Push,
                last_tile,
                next_tile,
            },
        }
    }

    #[test]
    fn test_commit_returns_changes_newest_first() {
        let mut history = StepHistory::new();
        history.stage(push(0, 0, 1));
        history.stage(push(1, 1, 2));
        history.stage(push(2, 2, 3));

        let committed = history.commit_pending();
        let entities: Vec<EntityId> = committed.iter().map(|change| change.entity).collect();
        assert_eq!(entities, vec![2, 1, 0]);
        assert_eq!(history.step_count(), 1);
    }

    #[test]
    fn test_commit_with_nothing_pending_records_no_step() {
        let mut history = StepHistory::new();
        assert!(history.commit_pending().is_empty());
        assert_eq!(history.step_count(), 0);
    }

    #[test]
    fn test_discard_synthesizes_rejections_and_truncates() {
        let mut history = StepHistory::new();
        history.stage(push(0, 0, 1));
        history.stage(push(1, 1, 2));

        let rejected = history.discard_pending(Orientation::UpperRight);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].entity, 1);
        assert_eq!(rejected[1].entity, 0);

        for change in &rejected {
            assert_eq!(
                change.kind,
                ChangeKind::Invalid {
                    direction: Orientation::UpperRight
                }
            );
        }

        assert_eq!(history.step_count(), 0);
        assert!(history.commit_pending().is_empty());
    }

    #[test]
    fn test_discard_leaves_sealed_steps_alone() {
        let mut history = StepHistory::new();
        history.stage(walk(0, 0, 1));
        history.commit_pending();

        history.stage(walk(0, 1, 2));
        history.discard_pending(Orientation::LowerMiddle);

        assert_eq!(history.step_count(), 1);
        assert_eq!(history.changes.len(), 1);
        assert_eq!(history.changes[0], walk(0, 0, 1));
    }

    #[test]
    fn test_swap_reverses_tiles_and_input() {
        let mut steps = StepHistory::new();
        let mut undone = StepHistory::new();

        steps.stage(push(0, 0, 1));
        steps.stage(push(1, 1, 2));
        steps.commit_pending();

        let replayed = StepHistory::swap_step(&mut steps, &mut undone);

        assert_eq!(steps.step_count(), 0);
        assert_eq!(undone.step_count(), 1);

        // Oldest change first, endpoints swapped, heading flipped
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].entity, 0);
        assert_eq!(replayed[0].input, Input::Backward);
        assert_eq!(
            replayed[0].kind,
            ChangeKind::Move {
                kind: MoveKind::Push,
                last_tile: 1,
                next_tile: 0,
            }
        );
    }

    #[test]
    fn test_swap_twice_restores_the_original_step() {
        let mut steps = StepHistory::new();
        let mut undone = StepHistory::new();

        let original = vec![push(0, 3, 4), push(1, 4, 5)];
        for change in &original {
            steps.stage(*change);
        }
        steps.commit_pending();

        StepHistory::swap_step(&mut steps, &mut undone);
        StepHistory::swap_step(&mut undone, &mut steps);

        assert_eq!(steps.step_count(), 1);
        assert_eq!(undone.step_count(), 0);
        assert_eq!(steps.changes, original);
    }

    #[test]
    fn test_swap_on_empty_source_is_a_no_op() {
        let mut steps = StepHistory::new();
        let mut undone = StepHistory::new();

        assert!(StepHistory::swap_step(&mut steps, &mut undone).is_empty());
        assert_eq!(undone.step_count(), 0);
    }

    #[test]
    fn test_turn_reversal_flips_spin_and_orientations() {
        let change = Change {
            entity: 0,
            input: Input::Left,
            kind: ChangeKind::Turn {
                last_orientation: Orientation::UpperMiddle,
                next_orientation: Orientation::UpperLeft,
            },
        };

        let reversed = change.reversed().unwrap();
        assert_eq!(reversed.input, Input::Right);
        assert_eq!(
            reversed.kind,
            ChangeKind::Turn {
                last_orientation: Orientation::UpperLeft,
                next_orientation: Orientation::UpperMiddle,
            }
        );
    }

    #[test]
    fn test_clear_drops_steps_and_pending() {
        let mut history = StepHistory::new();
        history.stage(walk(0, 0, 1));
        history.commit_pending();
        history.stage(walk(0, 1, 2));

        history.clear();
        assert!(history.is_empty());
        assert!(history.commit_pending().is_empty());
    }
}
