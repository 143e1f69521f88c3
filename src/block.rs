//! Block entity: identity, color, shape and position state
//!
//! Blocks live in an index-based arena owned by the engine; the occupancy
//! table stores [`BlockId`] values instead of references, so grid and blocks
//! never form an ownership cycle.
//!
//! Invariant: whenever a block is not mid-drag, the cell set implied by
//! `grid_position + origin_offset + offsets` equals the set of grid cells
//! whose occupant is this block. [`Block::set_grid_position`] is the only
//! sanctioned way to commit a position outside a live drag.

use crate::geometry::{GridPos, Rect};
use crate::grid::Grid;
use crate::shape::{Shape, ShapeKind};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Stable index of a block in the engine's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Block color palette. Exits only accept blocks of their own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl BlockColor {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Orange => "orange",
            BlockColor::Yellow => "yellow",
            BlockColor::Green => "green",
            BlockColor::Blue => "blue",
            BlockColor::Purple => "purple",
        }
    }
}

impl fmt::Display for BlockColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockColor {
    type Err = String;

    /// Case-insensitive parse; host input arrives in mixed case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(BlockColor::Red),
            "orange" => Ok(BlockColor::Orange),
            "yellow" => Ok(BlockColor::Yellow),
            "green" => Ok(BlockColor::Green),
            "blue" => Ok(BlockColor::Blue),
            "purple" => Ok(BlockColor::Purple),
            other => Err(format!("unknown block color: {other}")),
        }
    }
}

/// A movable polyomino block.
pub struct Block {
    id: BlockId,
    color: BlockColor,
    shape: Shape,
    /// Reference cell in grid space (pre-normalization frame).
    grid_pos: GridPos,
    /// Continuous position of the bounding box's top-left corner.
    world_pos: Vec2,
    dragging: bool,
    /// Rollback anchor for the drag-end soft-failure path.
    last_valid_pos: GridPos,
    removed: bool,
}

impl Block {
    pub fn new(id: BlockId, color: BlockColor, kind: ShapeKind, grid_pos: GridPos) -> Block {
        Block {
            id,
            color,
            shape: Shape::new(kind),
            grid_pos,
            world_pos: Vec2::ZERO,
            dragging: false,
            last_valid_pos: grid_pos,
            removed: false,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn color(&self) -> BlockColor {
        self.color
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn grid_position(&self) -> GridPos {
        self.grid_pos
    }

    pub fn world_position(&self) -> Vec2 {
        self.world_pos
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn last_valid_position(&self) -> GridPos {
        self.last_valid_pos
    }

    /// Cells occupied at the current grid position.
    pub fn occupied_cells(&self) -> SmallVec<[GridPos; 8]> {
        self.cells_at(self.grid_pos)
    }

    /// Cells that would be occupied if the reference cell were at `pos`.
    pub fn cells_at(&self, pos: GridPos) -> SmallVec<[GridPos; 8]> {
        let base = pos.offset_by(self.shape.origin_offset());
        self.shape
            .offsets()
            .iter()
            .map(|off| base.offset_by(*off))
            .collect()
    }

    /// Axis-aligned world bounds at the current continuous position.
    pub fn world_bounds(&self, grid: &Grid) -> Rect {
        self.world_bounds_at(grid, self.world_pos)
    }

    /// Axis-aligned world bounds with the bounding box corner at `pos`.
    pub fn world_bounds_at(&self, grid: &Grid, pos: Vec2) -> Rect {
        let cell = grid.cell_size();
        Rect::from_pos_size(
            pos,
            Vec2::new(
                self.shape.cols() as f32 * cell,
                self.shape.rows() as f32 * cell,
            ),
        )
    }

    /// Per-cell world rectangles with the bounding box corner at `pos`.
    ///
    /// The exact footprint for collision tests; for L, T and cross shapes
    /// the bounding box alone is a poor proxy for the occupied area.
    pub fn cell_rects_at(&self, grid: &Grid, pos: Vec2) -> SmallVec<[Rect; 8]> {
        let cell = grid.cell_size();
        self.shape
            .offsets()
            .iter()
            .map(|off| {
                Rect::from_pos_size(
                    pos + Vec2::new(off.d_col as f32 * cell, off.d_row as f32 * cell),
                    Vec2::splat(cell),
                )
            })
            .collect()
    }

    /// Commit a grid position: clear stale occupancy, write the new cell
    /// set, resynchronize the continuous position, and advance the rollback
    /// anchor.
    pub fn set_grid_position(&mut self, grid: &mut Grid, pos: GridPos) {
        grid.clear_block(self.id);
        self.grid_pos = pos;
        self.last_valid_pos = pos;
        self.world_pos = grid.grid_to_world(pos.offset_by(self.shape.origin_offset()));
        for cell in self.occupied_cells() {
            grid.set_occupant(cell, self.id);
        }
        log::trace!("block {:?} committed at {:?}", self.id, pos);
    }

    /// Begin a drag: the block leaves the occupancy table (becoming
    /// transparent to collision against itself) and is flagged as dragging.
    pub fn start_drag(&mut self, grid: &mut Grid) {
        grid.clear_block(self.id);
        self.dragging = true;
    }

    /// Reposition continuous coordinates only; occupancy and grid position
    /// are untouched until the drag ends.
    pub fn update_drag(&mut self, pos: Vec2) {
        self.world_pos = pos;
    }

    /// End the drag. Occupancy is re-established by the caller through
    /// [`Block::set_grid_position`] or exit removal.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Clear occupancy and mark the block for disposal.
    pub fn remove(&mut self, grid: &mut Grid) {
        grid.clear_block(self.id);
        self.removed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CellOffset;

    fn grid_6x6() -> Grid {
        let area = Rect::from_pos_size(Vec2::ZERO, Vec2::splat(600.0));
        Grid::new(6, 6, area, 0.0)
    }

    #[test]
    fn test_color_parse_is_case_insensitive() {
        assert_eq!("Blue".parse::<BlockColor>(), Ok(BlockColor::Blue));
        assert_eq!("RED".parse::<BlockColor>(), Ok(BlockColor::Red));
        assert_eq!("purple".parse::<BlockColor>(), Ok(BlockColor::Purple));
        assert!("magenta".parse::<BlockColor>().is_err());
    }

    #[test]
    fn test_cross_cells_unnormalize_through_origin_offset() {
        let block = Block::new(
            BlockId::from_raw(0),
            BlockColor::Red,
            ShapeKind::Cross,
            GridPos::new(3, 3),
        );
        assert_eq!(
            Shape::new(ShapeKind::Cross).origin_offset(),
            CellOffset::new(-1, -1)
        );
        let cells = block.occupied_cells();
        // The hub sits at the reference cell; arms reach one cell out.
        assert!(cells.contains(&GridPos::new(3, 3)));
        assert!(cells.contains(&GridPos::new(2, 3)));
        assert!(cells.contains(&GridPos::new(4, 3)));
        assert!(cells.contains(&GridPos::new(3, 2)));
        assert!(cells.contains(&GridPos::new(3, 4)));
    }

    #[test]
    fn test_set_grid_position_syncs_occupancy_and_world() {
        let mut grid = grid_6x6();
        let mut block = Block::new(
            BlockId::from_raw(0),
            BlockColor::Blue,
            ShapeKind::Bar1x2,
            GridPos::new(2, 1),
        );
        block.set_grid_position(&mut grid, GridPos::new(2, 1));
        assert_eq!(block.world_position(), Vec2::new(100.0, 200.0));
        let mut cells = grid.cells_of(block.id());
        cells.sort_by_key(|c| (c.row, c.col));
        assert_eq!(cells, vec![GridPos::new(2, 1), GridPos::new(2, 2)]);

        // Moving clears the old cells before writing the new ones
        block.set_grid_position(&mut grid, GridPos::new(4, 0));
        let mut cells = grid.cells_of(block.id());
        cells.sort_by_key(|c| (c.row, c.col));
        assert_eq!(cells, vec![GridPos::new(4, 0), GridPos::new(4, 1)]);
    }

    #[test]
    fn test_set_grid_position_is_idempotent() {
        let mut grid = grid_6x6();
        let mut block = Block::new(
            BlockId::from_raw(0),
            BlockColor::Green,
            ShapeKind::Square2,
            GridPos::new(1, 1),
        );
        block.set_grid_position(&mut grid, GridPos::new(1, 1));
        let once = grid.cells_of(block.id());
        block.set_grid_position(&mut grid, GridPos::new(1, 1));
        let twice = grid.cells_of(block.id());
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 4);
    }

    #[test]
    fn test_drag_lifecycle_clears_and_restores_occupancy() {
        let mut grid = grid_6x6();
        let mut block = Block::new(
            BlockId::from_raw(0),
            BlockColor::Red,
            ShapeKind::Single,
            GridPos::new(0, 0),
        );
        block.set_grid_position(&mut grid, GridPos::new(0, 0));
        block.start_drag(&mut grid);
        assert!(block.is_dragging());
        assert!(grid.cells_of(block.id()).is_empty());

        block.update_drag(Vec2::new(42.0, 17.0));
        assert_eq!(block.world_position(), Vec2::new(42.0, 17.0));
        // update_drag never touches the grid position
        assert_eq!(block.grid_position(), GridPos::new(0, 0));

        block.end_drag();
        assert!(!block.is_dragging());
        block.set_grid_position(&mut grid, GridPos::new(0, 1));
        assert_eq!(grid.cells_of(block.id()), vec![GridPos::new(0, 1)]);
    }

    #[test]
    fn test_remove_clears_occupancy() {
        let mut grid = grid_6x6();
        let mut block = Block::new(
            BlockId::from_raw(3),
            BlockColor::Yellow,
            ShapeKind::Bar2x1,
            GridPos::new(0, 0),
        );
        block.set_grid_position(&mut grid, GridPos::new(0, 0));
        block.remove(&mut grid);
        assert!(block.is_removed());
        assert!(grid.cells_of(block.id()).is_empty());
    }
}
