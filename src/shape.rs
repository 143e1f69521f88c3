//! Polyomino shape catalog and normalized shape geometry
//!
//! The catalog is static data: every [`ShapeKind`] maps to a fixed set of
//! cell offsets. Catalog entries may be authored in any convenient frame
//! (the cross is centered on its hub, for example); [`Shape`] normalizes the
//! offsets so they start at (0, 0) and records the shift as an origin
//! offset, so grid-space math can round-trip back to the authored frame.

use crate::error::ShapeError;
use crate::geometry::CellOffset;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Identifier for a catalog shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Single cell.
    Single,
    /// 1 row x 2 cols.
    Bar1x2,
    /// 2 rows x 1 col.
    Bar2x1,
    /// 1 row x 3 cols.
    Bar1x3,
    /// 3 rows x 1 col.
    Bar3x1,
    /// 2x2 square.
    Square2,
    /// L tetromino and its three clockwise rotations.
    L0,
    L90,
    L180,
    L270,
    /// T tetromino and its three clockwise rotations.
    T0,
    T90,
    T180,
    T270,
    /// Plus-shaped pentomino, authored around its hub cell.
    Cross,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 15] = [
        ShapeKind::Single,
        ShapeKind::Bar1x2,
        ShapeKind::Bar2x1,
        ShapeKind::Bar1x3,
        ShapeKind::Bar3x1,
        ShapeKind::Square2,
        ShapeKind::L0,
        ShapeKind::L90,
        ShapeKind::L180,
        ShapeKind::L270,
        ShapeKind::T0,
        ShapeKind::T90,
        ShapeKind::T180,
        ShapeKind::T270,
        ShapeKind::Cross,
    ];

    /// Catalog cells as (row, col) in the authored frame.
    ///
    /// Not necessarily normalized; the cross is centered on (0, 0).
    pub fn catalog_cells(self) -> &'static [(i32, i32)] {
        match self {
            ShapeKind::Single => &[(0, 0)],
            ShapeKind::Bar1x2 => &[(0, 0), (0, 1)],
            ShapeKind::Bar2x1 => &[(0, 0), (1, 0)],
            ShapeKind::Bar1x3 => &[(0, 0), (0, 1), (0, 2)],
            ShapeKind::Bar3x1 => &[(0, 0), (1, 0), (2, 0)],
            ShapeKind::Square2 => &[(0, 0), (0, 1), (1, 0), (1, 1)],
            ShapeKind::L0 => &[(0, 0), (1, 0), (2, 0), (2, 1)],
            ShapeKind::L90 => &[(0, 0), (0, 1), (0, 2), (1, 0)],
            ShapeKind::L180 => &[(0, 0), (0, 1), (1, 1), (2, 1)],
            ShapeKind::L270 => &[(0, 2), (1, 0), (1, 1), (1, 2)],
            ShapeKind::T0 => &[(0, 0), (0, 1), (0, 2), (1, 1)],
            ShapeKind::T90 => &[(0, 1), (1, 0), (1, 1), (2, 1)],
            ShapeKind::T180 => &[(0, 1), (1, 0), (1, 1), (1, 2)],
            ShapeKind::T270 => &[(0, 0), (1, 0), (1, 1), (2, 0)],
            ShapeKind::Cross => &[(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)],
        }
    }
}

/// A normalized polyomino: offsets starting at (0, 0) plus the origin offset
/// recorded during normalization.
///
/// Occupied grid cells are `grid_position + origin_offset + offset` for each
/// normalized offset; the origin offset carries the authored frame back into
/// grid space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    kind: ShapeKind,
    offsets: SmallVec<[CellOffset; 8]>,
    origin: CellOffset,
}

impl Shape {
    /// Build a catalog shape. Catalog data is statically well-formed, so
    /// this never fails.
    pub fn new(kind: ShapeKind) -> Shape {
        Self::normalize(kind, kind.catalog_cells().iter().copied())
    }

    /// Build a shape from arbitrary cells, rejecting malformed input.
    ///
    /// Used when shapes arrive from outside the catalog; empty cell sets and
    /// duplicate cells are configuration errors, not recoverable states.
    pub fn from_cells(
        kind: ShapeKind,
        cells: impl IntoIterator<Item = (i32, i32)>,
    ) -> Result<Shape, ShapeError> {
        let cells: SmallVec<[(i32, i32); 8]> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(ShapeError::Empty);
        }
        for (i, cell) in cells.iter().enumerate() {
            if cells[..i].contains(cell) {
                return Err(ShapeError::DuplicateCell {
                    row: cell.0,
                    col: cell.1,
                });
            }
        }
        Ok(Self::normalize(kind, cells))
    }

    fn normalize(kind: ShapeKind, cells: impl IntoIterator<Item = (i32, i32)>) -> Shape {
        let raw: SmallVec<[(i32, i32); 8]> = cells.into_iter().collect();
        let min_row = raw.iter().map(|c| c.0).min().unwrap_or(0);
        let min_col = raw.iter().map(|c| c.1).min().unwrap_or(0);
        let offsets = raw
            .iter()
            .map(|c| CellOffset::new(c.0 - min_row, c.1 - min_col))
            .collect();
        Shape {
            kind,
            offsets,
            origin: CellOffset::new(min_row, min_col),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Normalized offsets; minimum row and column are both zero.
    pub fn offsets(&self) -> &[CellOffset] {
        &self.offsets
    }

    /// Shift applied during normalization (the authored frame's minimum row
    /// and column).
    pub fn origin_offset(&self) -> CellOffset {
        self.origin
    }

    pub fn cell_count(&self) -> usize {
        self.offsets.len()
    }

    /// Bounding-box height in cells.
    pub fn rows(&self) -> i32 {
        self.offsets.iter().map(|o| o.d_row).max().unwrap_or(0) + 1
    }

    /// Bounding-box width in cells.
    pub fn cols(&self) -> i32 {
        self.offsets.iter().map(|o| o.d_col).max().unwrap_or(0) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shapes_are_normalized_after_construction() {
        for kind in ShapeKind::ALL {
            let shape = Shape::new(kind);
            assert!(!shape.offsets().is_empty());
            let min_row = shape.offsets().iter().map(|o| o.d_row).min().unwrap();
            let min_col = shape.offsets().iter().map(|o| o.d_col).min().unwrap();
            assert_eq!((min_row, min_col), (0, 0), "{kind:?} not normalized");
        }
    }

    #[test]
    fn test_cross_records_origin_shift() {
        let cross = Shape::new(ShapeKind::Cross);
        assert_eq!(cross.origin_offset(), CellOffset::new(-1, -1));
        assert_eq!(cross.cell_count(), 5);
        assert_eq!(cross.rows(), 3);
        assert_eq!(cross.cols(), 3);
    }

    #[test]
    fn test_bar_extents() {
        assert_eq!(Shape::new(ShapeKind::Bar1x3).cols(), 3);
        assert_eq!(Shape::new(ShapeKind::Bar1x3).rows(), 1);
        assert_eq!(Shape::new(ShapeKind::Bar3x1).rows(), 3);
        assert_eq!(Shape::new(ShapeKind::Square2).cell_count(), 4);
    }

    #[test]
    fn test_from_cells_rejects_malformed_input() {
        assert!(matches!(
            Shape::from_cells(ShapeKind::Single, []),
            Err(ShapeError::Empty)
        ));
        assert!(matches!(
            Shape::from_cells(ShapeKind::Bar1x2, [(0, 0), (0, 1), (0, 0)]),
            Err(ShapeError::DuplicateCell { row: 0, col: 0 })
        ));
        assert!(Shape::from_cells(ShapeKind::Bar1x2, [(4, 4), (4, 5)]).is_ok());
    }
}
