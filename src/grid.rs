//! Grid geometry and the cell occupancy table
//!
//! The grid owns two things: the affine mapping between world space and grid
//! space (derived once from the pixel area, wall thickness and cell counts)
//! and the occupancy table recording which block, if any, holds each cell.
//! Geometry is immutable after construction; only occupancy mutates.

use crate::block::BlockId;
use crate::geometry::{GridPos, Rect};
use glam::Vec2;

/// Rectangular playing grid with a per-cell occupancy table.
pub struct Grid {
    rows: i32,
    cols: i32,
    cell_size: f32,
    wall_thickness: f32,
    /// World position of the playfield interior's top-left corner.
    origin: Vec2,
    occupancy: Vec<Option<BlockId>>,
}

impl Grid {
    /// Derive grid geometry from the available pixel area.
    ///
    /// Cell size is the largest square that fits `cols x rows` cells inside
    /// the area after the wall thickness is carved off every side.
    pub fn new(rows: u32, cols: u32, area: Rect, wall_thickness: f32) -> Grid {
        let rows = rows as i32;
        let cols = cols as i32;
        let inner_w = (area.width() - 2.0 * wall_thickness).max(1.0);
        let inner_h = (area.height() - 2.0 * wall_thickness).max(1.0);
        let cell_size = (inner_w / cols as f32).min(inner_h / rows as f32);
        let origin = area.min + Vec2::splat(wall_thickness);
        log::debug!(
            "grid: {rows}x{cols}, cell size {cell_size:.2}, origin {origin:?}"
        );
        Grid {
            rows,
            cols,
            cell_size,
            wall_thickness,
            origin,
            occupancy: vec![None; (rows * cols) as usize],
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn wall_thickness(&self) -> f32 {
        self.wall_thickness
    }

    /// World rectangle of the playable interior.
    pub fn playfield(&self) -> Rect {
        Rect::from_pos_size(
            self.origin,
            Vec2::new(
                self.cols as f32 * self.cell_size,
                self.rows as f32 * self.cell_size,
            ),
        )
    }

    /// Floor conversion from world space to grid space.
    ///
    /// Not bounds-checked; may return coordinates outside the grid.
    pub fn world_to_grid(&self, pos: Vec2) -> GridPos {
        let rel = pos - self.origin;
        GridPos::new(
            (rel.y / self.cell_size).floor() as i32,
            (rel.x / self.cell_size).floor() as i32,
        )
    }

    /// Nearest-cell conversion (rounds instead of flooring); used when
    /// snapping a continuous position to the closest cell corner.
    pub fn world_to_grid_nearest(&self, pos: Vec2) -> GridPos {
        let rel = pos - self.origin + Vec2::splat(self.cell_size * 0.5);
        GridPos::new(
            (rel.y / self.cell_size).floor() as i32,
            (rel.x / self.cell_size).floor() as i32,
        )
    }

    /// World position of the top-left corner of a cell.
    pub fn grid_to_world(&self, pos: GridPos) -> Vec2 {
        self.origin
            + Vec2::new(
                pos.col as f32 * self.cell_size,
                pos.row as f32 * self.cell_size,
            )
    }

    /// World rectangle covered by a cell.
    pub fn cell_rect(&self, pos: GridPos) -> Rect {
        Rect::from_pos_size(self.grid_to_world(pos), Vec2::splat(self.cell_size))
    }

    pub fn is_in_bounds(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if self.is_in_bounds(pos) {
            Some((pos.row * self.cols + pos.col) as usize)
        } else {
            None
        }
    }

    /// Occupancy test. Out-of-bounds cells read as occupied.
    pub fn is_cell_occupied(&self, pos: GridPos) -> bool {
        match self.index(pos) {
            Some(i) => self.occupancy[i].is_some(),
            None => true,
        }
    }

    /// Occupant of a cell, if any. Out-of-bounds cells have none.
    pub fn occupant(&self, pos: GridPos) -> Option<BlockId> {
        self.index(pos).and_then(|i| self.occupancy[i])
    }

    pub fn set_occupant(&mut self, pos: GridPos, id: BlockId) {
        if let Some(i) = self.index(pos) {
            self.occupancy[i] = Some(id);
        }
    }

    pub fn clear_cell(&mut self, pos: GridPos) {
        if let Some(i) = self.index(pos) {
            self.occupancy[i] = None;
        }
    }

    /// Clear every cell referencing `id`.
    ///
    /// Full-table scan; used before recomputing a block's occupancy after a
    /// move so no stale cell survives.
    pub fn clear_block(&mut self, id: BlockId) {
        for cell in self.occupancy.iter_mut() {
            if *cell == Some(id) {
                *cell = None;
            }
        }
    }

    /// All cells currently referencing `id`, in row-major order.
    pub fn cells_of(&self, id: BlockId) -> Vec<GridPos> {
        self.occupancy
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Some(id))
            .map(|(i, _)| GridPos::new(i as i32 / self.cols, i as i32 % self.cols))
            .collect()
    }
}
