//! Already-parsed structured level input
//!
//! Hosts hand the engine a [`LevelConfig`] at level load. The types here are
//! plain serde data, RON-friendly, with defaults for everything optional:
//!
//! ```ron
//! (
//!     rows: 6,
//!     cols: 6,
//!     blocks: [
//!         (color: blue, shape: bar1x2, position: (row: 2, col: 1)),
//!     ],
//!     exits: [
//!         (color: blue, side: left, first: 2, last: 2),
//!     ],
//! )
//! ```
//!
//! Structural validation (grid-geometry-independent checks) lives here;
//! placement validation happens during engine construction where the grid
//! and occupancy exist.

use crate::block::BlockColor;
use crate::collision::CollisionConfig;
use crate::error::LevelError;
use crate::exit::ExitZone;
use crate::geometry::GridPos;
use crate::shape::ShapeKind;
use serde::{Deserialize, Serialize};

/// One block's starting placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub color: BlockColor,
    pub shape: ShapeKind,
    /// Reference cell in grid space (pre-normalization frame).
    pub position: GridPos,
}

/// Complete level description as consumed at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub rows: u32,
    pub cols: u32,
    /// Wall thickness in world units, carved off every side of the pixel
    /// area before the cell size is derived (default: 0).
    #[serde(default)]
    pub wall_thickness: f32,
    /// Static blocked cells; never owned by a block.
    #[serde(default)]
    pub obstacles: Vec<GridPos>,
    pub blocks: Vec<BlockSpec>,
    /// Perimeter exits in declaration order; order is the tie-break when
    /// several exits of one color could match.
    #[serde(default)]
    pub exits: Vec<ExitZone>,
    #[serde(default)]
    pub collision: CollisionConfig,
}

impl LevelConfig {
    /// Checks that need no grid geometry: cell counts, obstacle and exit
    /// ranges. Placement checks run in [`crate::engine::PuzzleEngine::new`].
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(LevelError::EmptyGrid);
        }
        let rows = self.rows as i32;
        let cols = self.cols as i32;
        for obstacle in &self.obstacles {
            if obstacle.row < 0 || obstacle.row >= rows || obstacle.col < 0 || obstacle.col >= cols
            {
                return Err(LevelError::ObstacleOutOfBounds {
                    row: obstacle.row,
                    col: obstacle.col,
                    rows,
                    cols,
                });
            }
        }
        for exit in &self.exits {
            let len = exit.side_len(rows, cols);
            if exit.first > exit.last || exit.first < 0 || exit.last >= len {
                return Err(LevelError::ExitOutOfRange {
                    side: exit.side,
                    first: exit.first,
                    last: exit.last,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::ExitSide;

    fn minimal_level() -> LevelConfig {
        LevelConfig {
            rows: 6,
            cols: 6,
            wall_thickness: 0.0,
            obstacles: vec![],
            blocks: vec![BlockSpec {
                color: BlockColor::Blue,
                shape: ShapeKind::Bar1x2,
                position: GridPos::new(2, 1),
            }],
            exits: vec![ExitZone {
                color: BlockColor::Blue,
                side: ExitSide::Left,
                first: 2,
                last: 2,
            }],
            collision: CollisionConfig::default(),
        }
    }

    #[test]
    fn test_validate_accepts_minimal_level() {
        assert_eq!(minimal_level().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_grid() {
        let mut level = minimal_level();
        level.rows = 0;
        assert_eq!(level.validate(), Err(LevelError::EmptyGrid));
    }

    #[test]
    fn test_validate_rejects_out_of_range_obstacle() {
        let mut level = minimal_level();
        level.obstacles.push(GridPos::new(6, 0));
        assert!(matches!(
            level.validate(),
            Err(LevelError::ObstacleOutOfBounds { row: 6, col: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_or_overlong_exit_range() {
        let mut level = minimal_level();
        level.exits[0].first = 3;
        level.exits[0].last = 2;
        assert!(matches!(
            level.validate(),
            Err(LevelError::ExitOutOfRange { .. })
        ));

        let mut level = minimal_level();
        level.exits[0].last = 6;
        assert!(matches!(
            level.validate(),
            Err(LevelError::ExitOutOfRange { .. })
        ));
    }
}
