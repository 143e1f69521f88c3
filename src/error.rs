//! Configuration error types
//!
//! Steady-state play never errors: legality queries are total predicates
//! returning `bool` or `Option`. Errors exist only for malformed level data
//! rejected at construction, where silently clamping would corrupt the
//! occupancy invariant.

use crate::block::BlockColor;
use crate::exit::ExitSide;
use thiserror::Error;

/// A malformed shape definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape has no cells")]
    Empty,

    #[error("shape cell ({row}, {col}) appears more than once")]
    DuplicateCell { row: i32, col: i32 },
}

/// A malformed level definition, rejected at engine construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("play area {width}x{height} is too small for wall thickness {wall}")]
    AreaTooSmall { width: f32, height: f32, wall: f32 },

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("obstacle at ({row}, {col}) is outside the {rows}x{cols} grid")]
    ObstacleOutOfBounds {
        row: i32,
        col: i32,
        rows: i32,
        cols: i32,
    },

    #[error("exit range {first}..={last} is out of range for the {side:?} side")]
    ExitOutOfRange {
        side: ExitSide,
        first: i32,
        last: i32,
    },

    #[error("block {index} ({color}) has a cell at ({row}, {col}) outside the grid")]
    BlockOutOfBounds {
        index: usize,
        color: BlockColor,
        row: i32,
        col: i32,
    },

    #[error("block {index} overlaps an obstacle at ({row}, {col})")]
    BlockOnObstacle { index: usize, row: i32, col: i32 },

    #[error("blocks {first} and {second} overlap at ({row}, {col})")]
    BlockOverlap {
        first: usize,
        second: usize,
        row: i32,
        col: i32,
    },
}
