//! Level data parsing and validation
//!
//! Levels are authored as JSON: `columns`, `rows`, a flat `tiles` array of
//! type codes, and a flat `entities` array of `[kind, column, row,
//! orientation]` quadruples. Everything is range checked here so the
//! simulation never sees a malformed level.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use crate::entity::EntityKind;
use crate::hex::{Orientation, TileIndex};
use crate::level::TileType;

/// Largest accepted column or row count
pub const DIMENSION_LIMIT: u8 = 20;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grid columns {0} is invalid, expected an integer in 1..=20")]
    InvalidColumns(i64),

    #[error("grid rows {0} is invalid, expected an integer in 1..=20")]
    InvalidRows(i64),

    #[error("tile count {found} does not match the grid, expected {expected} ({columns} * {rows})")]
    TileCountMismatch {
        found: usize,
        expected: usize,
        columns: u8,
        rows: u8,
    },

    #[error("tile #{index} has code {code}, expected an integer in 0..=3")]
    InvalidTileCode { index: usize, code: i64 },

    #[error("entities array length {0} is not a multiple of 4")]
    EntityRecordSize(usize),

    #[error("entity #{index} has kind {code}, expected 0 (player) or 1 (block)")]
    InvalidEntityKind { index: usize, code: i64 },

    #[error("entity #{index} is at column {column}, the grid has {columns}")]
    InvalidEntityColumn {
        index: usize,
        column: i64,
        columns: u8,
    },

    #[error("entity #{index} is at row {row}, the grid has {rows}")]
    InvalidEntityRow { index: usize, row: i64, rows: u8 },

    #[error("entity #{index} has orientation {code}, expected an integer in 0..=5")]
    InvalidEntityOrientation { index: usize, code: i64 },

    #[error("level has no player entity")]
    NoPlayer,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    columns: i64,
    rows: i64,
    tiles: Vec<i64>,
    entities: Vec<i64>,
}

/// One parsed entity record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySpec {
    pub kind: EntityKind,
    pub column: u8,
    pub row: u8,
    pub orientation: Orientation,
}

impl EntitySpec {
    /// Flat tile index of the spawn position
    pub fn tile(&self, columns: u8) -> TileIndex {
        TileIndex::from(self.row) * TileIndex::from(columns) + TileIndex::from(self.column)
    }
}

/// Validated level description, ready to become a running level
#[derive(Clone, Debug)]
pub struct LevelData {
    pub columns: u8,
    pub rows: u8,
    pub tiles: Vec<TileType>,
    pub entities: Vec<EntitySpec>,
}

impl LevelData {
    /// Parse and validate level JSON
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        Self::parse(text)
            .inspect_err(|error| tracing::error!(%error, "failed to parse level data"))
    }

    /// Read and parse a level file
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read level file {}", path.display()))?;
        let data = Self::from_json(&text)
            .with_context(|| format!("failed to load level {}", path.display()))?;
        Ok(data)
    }

    fn parse(text: &str) -> Result<Self, LevelError> {
        let raw: RawLevel = serde_json::from_str(text)?;

        if raw.columns < 1 || raw.columns > i64::from(DIMENSION_LIMIT) {
            return Err(LevelError::InvalidColumns(raw.columns));
        }

        if raw.rows < 1 || raw.rows > i64::from(DIMENSION_LIMIT) {
            return Err(LevelError::InvalidRows(raw.rows));
        }

        let columns = raw.columns as u8;
        let rows = raw.rows as u8;

        let expected = columns as usize * rows as usize;
        if raw.tiles.len() != expected {
            return Err(LevelError::TileCountMismatch {
                found: raw.tiles.len(),
                expected,
                columns,
                rows,
            });
        }

        let tiles = raw
            .tiles
            .iter()
            .enumerate()
            .map(|(index, &code)| {
                u8::try_from(code)
                    .ok()
                    .and_then(TileType::from_code)
                    .ok_or(LevelError::InvalidTileCode { index, code })
            })
            .collect::<Result<Vec<TileType>, LevelError>>()?;

        if raw.entities.len() % 4 != 0 {
            return Err(LevelError::EntityRecordSize(raw.entities.len()));
        }

        let entities = raw
            .entities
            .chunks_exact(4)
            .enumerate()
            .map(|(index, record)| {
                let kind = match record[0] {
                    0 => EntityKind::Player,
                    1 => EntityKind::Block,
                    code => return Err(LevelError::InvalidEntityKind { index, code }),
                };

                let column = u8::try_from(record[1])
                    .ok()
                    .filter(|&column| column < columns)
                    .ok_or(LevelError::InvalidEntityColumn {
                        index,
                        column: record[1],
                        columns,
                    })?;

                let row = u8::try_from(record[2])
                    .ok()
                    .filter(|&row| row < rows)
                    .ok_or(LevelError::InvalidEntityRow {
                        index,
                        row: record[2],
                        rows,
                    })?;

                let orientation = u8::try_from(record[3])
                    .ok()
                    .and_then(Orientation::from_code)
                    .ok_or(LevelError::InvalidEntityOrientation {
                        index,
                        code: record[3],
                    })?;

                Ok(EntitySpec {
                    kind,
                    column,
                    row,
                    orientation,
                })
            })
            .collect::<Result<Vec<EntitySpec>, LevelError>>()?;

        if !entities.iter().any(|spec| spec.kind == EntityKind::Player) {
            return Err(LevelError::NoPlayer);
        }

        Ok(Self {
            columns,
            rows,
            tiles,
            entities,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
