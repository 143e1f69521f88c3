//! # Blockslide - grid block-escape puzzle engine
//!
//! Colored polyomino blocks occupy cells of a rectangular grid and are
//! dragged out through color-matched perimeter exits without overlapping
//! other blocks, obstacles, or grid bounds. This crate is the movement and
//! collision-resolution core: grid occupancy, block geometry, swept/sliding
//! collision detection, nearest-valid-placement search and exit matching.
//! Rendering, animation, timers and raw input plumbing live in the host.

pub mod block;
pub mod collision;
pub mod drag;
pub mod engine;
pub mod error;
pub mod exit;
pub mod geometry;
pub mod grid;
pub mod level;
pub mod shape;

pub use drag::EngineEvent;
pub use engine::PuzzleEngine;
pub use error::LevelError;
pub use level::LevelConfig;

/// Common imports for internal use
pub mod prelude {
    pub use crate::block::{Block, BlockColor, BlockId};
    pub use crate::geometry::{CellOffset, GridPos, Rect};
    pub use crate::grid::Grid;
    pub use crate::shape::{Shape, ShapeKind};
    pub use glam::Vec2;
}
