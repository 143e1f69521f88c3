//! Coordinate spaces and world-space rectangles
//!
//! Three spaces are kept apart by type:
//! - local shape space ([`CellOffset`]) - cell offsets within a shape,
//!   normalized so the minimum row and column are both zero
//! - grid space ([`GridPos`]) - discrete cell coordinates on the board
//! - world space (`glam::Vec2`) - continuous pixel coordinates
//!
//! Conversions between spaces are explicit; the two discrete spaces never
//! share a field or a function parameter slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Offset of one cell within a shape's local space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellOffset {
    pub d_row: i32,
    pub d_col: i32,
}

impl CellOffset {
    pub const ZERO: CellOffset = CellOffset { d_row: 0, d_col: 0 };

    pub fn new(d_row: i32, d_col: i32) -> Self {
        Self { d_row, d_col }
    }
}

impl std::ops::Neg for CellOffset {
    type Output = CellOffset;

    fn neg(self) -> CellOffset {
        CellOffset::new(-self.d_row, -self.d_col)
    }
}

/// A discrete cell position on the grid.
///
/// Not bounds-checked; callers that need validity go through
/// [`crate::grid::Grid::is_in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: i32,
    pub col: i32,
}

impl GridPos {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Translate by a local-space offset, producing another grid position.
    pub fn offset_by(self, off: CellOffset) -> GridPos {
        GridPos::new(self.row + off.d_row, self.col + off.d_col)
    }
}

/// Axis-aligned rectangle in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test with `margin` shaved off every side of both rectangles.
    ///
    /// Two rectangles whose edges merely touch (or sit within `2 * margin`
    /// of each other) do not count as overlapping, which keeps adjacent
    /// blocks from visually touching.
    pub fn overlaps_with_margin(&self, other: &Rect, margin: f32) -> bool {
        self.min.x + margin < other.max.x - margin
            && self.max.x - margin > other.min.x + margin
            && self.min.y + margin < other.max.y - margin
            && self.max.y - margin > other.min.y + margin
    }

    /// Whether `other` lies entirely inside `self`, with `slack` of leeway
    /// on every side.
    pub fn contains_rect(&self, other: &Rect, slack: f32) -> bool {
        other.min.x >= self.min.x - slack
            && other.min.y >= self.min.y - slack
            && other.max.x <= self.max.x + slack
            && other.max.y <= self.max.y + slack
    }
}
