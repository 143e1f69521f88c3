//! Exit zones on the grid perimeter
//!
//! An exit is a color-tagged span of cells along one edge. Its world-space
//! geometry is derived from the grid on demand, never stored.

use crate::block::BlockColor;
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// One of the four perimeter edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl ExitSide {
    /// Whether the exit spans columns (top/bottom) or rows (left/right).
    pub fn is_horizontal(self) -> bool {
        matches!(self, ExitSide::Top | ExitSide::Bottom)
    }
}

/// A color-matched removal zone on the grid perimeter.
///
/// `first..=last` is the inclusive cell range along the side: column indices
/// for top/bottom exits, row indices for left/right exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitZone {
    pub color: BlockColor,
    pub side: ExitSide,
    pub first: i32,
    pub last: i32,
}

impl ExitZone {
    /// World-space span of the exit along its edge, as `(min, max)` on the
    /// tangential axis (x for top/bottom, y for left/right).
    pub fn world_span(&self, grid: &Grid) -> (f32, f32) {
        let cell = grid.cell_size();
        let field = grid.playfield();
        if self.side.is_horizontal() {
            (
                field.min.x + self.first as f32 * cell,
                field.min.x + (self.last + 1) as f32 * cell,
            )
        } else {
            (
                field.min.y + self.first as f32 * cell,
                field.min.y + (self.last + 1) as f32 * cell,
            )
        }
    }

    /// World coordinate of the grid edge a block must align to before it can
    /// leave through this exit.
    pub fn outer_edge(&self, grid: &Grid) -> f32 {
        let field = grid.playfield();
        match self.side {
            ExitSide::Top => field.min.y,
            ExitSide::Bottom => field.max.y,
            ExitSide::Left => field.min.x,
            ExitSide::Right => field.max.x,
        }
    }

    /// Number of cells along the grid side this exit sits on, for range
    /// validation.
    pub fn side_len(&self, grid_rows: i32, grid_cols: i32) -> i32 {
        if self.side.is_horizontal() {
            grid_cols
        } else {
            grid_rows
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use glam::Vec2;

    fn grid_6x6() -> Grid {
        let area = Rect::from_pos_size(Vec2::ZERO, Vec2::splat(600.0));
        Grid::new(6, 6, area, 0.0)
    }

    #[test]
    fn test_left_exit_span_covers_its_rows() {
        let grid = grid_6x6();
        let exit = ExitZone {
            color: BlockColor::Blue,
            side: ExitSide::Left,
            first: 2,
            last: 3,
        };
        assert_eq!(exit.world_span(&grid), (200.0, 400.0));
        assert_eq!(exit.outer_edge(&grid), 0.0);
    }

    #[test]
    fn test_bottom_exit_span_covers_its_columns() {
        let grid = grid_6x6();
        let exit = ExitZone {
            color: BlockColor::Red,
            side: ExitSide::Bottom,
            first: 0,
            last: 0,
        };
        assert_eq!(exit.world_span(&grid), (0.0, 100.0));
        assert_eq!(exit.outer_edge(&grid), 600.0);
    }
}
