//! The bundled level files stay valid and winnable
//!
//! Each level is driven through a scripted solution the way the play loop
//! would, settling the clock between inputs.

use std::fs;
use std::path::PathBuf;

use hexhive_core::{Input, Level, LevelData, Orientation, TileIndex};

fn levels_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../levels")
}

fn bundled(name: &str) -> LevelData {
    LevelData::from_path(levels_dir().join(name))
        .unwrap_or_else(|error| panic!("{name}: {error:#}"))
}

/// Parse a move script: f/b step, a/d turn, z/x undo and redo
fn script(moves: &str) -> Vec<Input> {
    moves
        .chars()
        .filter(|letter| !letter.is_whitespace())
        .map(|letter| match letter {
            'f' => Input::Forward,
            'b' => Input::Backward,
            'a' => Input::Left,
            'd' => Input::Right,
            'z' => Input::Undo,
            'x' => Input::Redo,
            other => panic!("unknown move '{other}'"),
        })
        .collect()
}

/// Feed inputs with the clock settling in between, as the play loop does
fn drive(level: &mut Level, inputs: &[Input]) {
    for &input in inputs {
        level.handle_input(input);
        level.update(10_000.0);
    }
}

fn configuration(level: &Level) -> Vec<(TileIndex, Orientation)> {
    level
        .entities()
        .iter()
        .map(|entity| (entity.tile(), entity.orientation()))
        .collect()
}

#[test]
fn test_every_bundled_level_parses() {
    let mut count = 0;
    for entry in fs::read_dir(levels_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_some_and(|extension| extension == "json") {
            LevelData::from_path(&path)
                .unwrap_or_else(|error| panic!("{}: {error:#}", path.display()));
            count += 1;
        }
    }

    assert!(count >= 3, "expected the bundled levels, found {count}");
}

#[test]
fn test_first_flight_solution() {
    let mut level = Level::new(&bundled("first-flight.json"), 640.0, 480.0);
    assert!(!level.is_solved());

    drive(&mut level, &script("ff"));
    assert!(level.is_solved());
    assert_eq!(level.step_count(), 2);
}

#[test]
fn test_zigzag_yard_solution() {
    let mut level = Level::new(&bundled("zigzag-yard.json"), 640.0, 480.0);
    let solution = script("f d ff  ddd ff  d f  dd ff");

    drive(&mut level, &solution[..solution.len() - 1]);
    assert!(!level.is_solved(), "solved one move early");

    drive(&mut level, &solution[solution.len() - 1..]);
    assert!(level.is_solved());
    assert_eq!(level.step_count(), solution.len());
}

#[test]
fn test_honey_cellar_solution() {
    let mut level = Level::new(&bundled("honey-cellar.json"), 640.0, 480.0);
    let solution = script("ff  aaa ff aa f d f aa ff  aaa ff dd f a f d f a f dd ff");

    drive(&mut level, &solution[..solution.len() - 1]);
    assert!(!level.is_solved(), "solved one move early");

    drive(&mut level, &solution[solution.len() - 1..]);
    assert!(level.is_solved());
    assert_eq!(level.step_count(), solution.len());
}

#[test]
fn test_solution_survives_a_full_rewind() {
    let mut level = Level::new(&bundled("zigzag-yard.json"), 640.0, 480.0);
    let start = configuration(&level);

    let solution = script("f d ff  ddd ff  d f  dd ff");
    drive(&mut level, &solution);
    assert!(level.is_solved());

    // All the way back: every entity returns to its spawn pose
    for _ in 0..solution.len() {
        drive(&mut level, &script("z"));
    }
    assert_eq!(configuration(&level), start);
    assert_eq!(level.step_count(), 0);
    assert!(!level.can_undo());
    assert!(!level.is_solved());

    // And all the way forward again
    for _ in 0..solution.len() {
        drive(&mut level, &script("x"));
    }
    assert!(level.is_solved());
    assert!(!level.can_redo());
}
