//! Engine facade: level loading, pointer event entry points, event queue
//!
//! The host drives the engine with pointer-derived world coordinates tagged
//! as down/move/up and drains [`EngineEvent`]s after each call. Everything
//! runs synchronously on the caller's thread; every entry point is a
//! bounded computation.

use crate::block::{Block, BlockId};
use crate::collision::CollisionDetector;
use crate::drag::{DragController, EngineEvent};
use crate::error::LevelError;
use crate::exit::ExitZone;
use crate::geometry::Rect;
use crate::grid::Grid;
use crate::level::LevelConfig;
use ahash::AHashSet;
use glam::Vec2;

/// The puzzle core: grid, block arena, exits, detector and drag state.
pub struct PuzzleEngine {
    grid: Grid,
    blocks: Vec<Block>,
    exits: Vec<ExitZone>,
    detector: CollisionDetector,
    controller: DragController,
    events: Vec<EngineEvent>,
}

impl PuzzleEngine {
    /// Build an engine from already-parsed level data and the pixel area the
    /// host renders into.
    ///
    /// Malformed configuration is rejected here with a descriptive error;
    /// silently clamping a bad placement would corrupt the occupancy
    /// invariant, so nothing is clamped.
    pub fn new(level: &LevelConfig, area: Rect) -> Result<Self, LevelError> {
        level.validate()?;
        if level.wall_thickness < 0.0
            || area.width() <= 2.0 * level.wall_thickness
            || area.height() <= 2.0 * level.wall_thickness
        {
            return Err(LevelError::AreaTooSmall {
                width: area.width(),
                height: area.height(),
                wall: level.wall_thickness,
            });
        }

        let mut grid = Grid::new(level.rows, level.cols, area, level.wall_thickness);
        let obstacle_set: AHashSet<_> = level.obstacles.iter().copied().collect();
        let detector =
            CollisionDetector::new(level.obstacles.iter().copied(), level.collision);

        let mut blocks = Vec::with_capacity(level.blocks.len());
        for (index, spec) in level.blocks.iter().enumerate() {
            let id = BlockId::from_raw(index as u32);
            let mut block = Block::new(id, spec.color, spec.shape, spec.position);
            for cell in block.occupied_cells() {
                if !grid.is_in_bounds(cell) {
                    return Err(LevelError::BlockOutOfBounds {
                        index,
                        color: spec.color,
                        row: cell.row,
                        col: cell.col,
                    });
                }
                if obstacle_set.contains(&cell) {
                    return Err(LevelError::BlockOnObstacle {
                        index,
                        row: cell.row,
                        col: cell.col,
                    });
                }
                if let Some(prev) = grid.occupant(cell) {
                    return Err(LevelError::BlockOverlap {
                        first: prev.index(),
                        second: index,
                        row: cell.row,
                        col: cell.col,
                    });
                }
            }
            block.set_grid_position(&mut grid, spec.position);
            blocks.push(block);
        }

        log::info!(
            "level loaded: {}x{} grid, {} blocks, {} exits, {} obstacles",
            level.rows,
            level.cols,
            blocks.len(),
            level.exits.len(),
            level.obstacles.len()
        );

        Ok(Self {
            grid,
            blocks,
            exits: level.exits.clone(),
            detector,
            controller: DragController::new(),
            events: Vec::new(),
        })
    }

    /// Drag-start notification addressed to a block.
    pub fn pointer_down(&mut self, block: BlockId, pointer: Vec2) {
        self.controller.start(
            &mut self.grid,
            &mut self.blocks,
            block,
            pointer,
            &mut self.events,
        );
    }

    /// Drag-move notification. Returns the continuous position to render
    /// the dragged block at, or `None` when no drag is live.
    pub fn pointer_move(&mut self, pointer: Vec2) -> Option<Vec2> {
        self.controller
            .update(&self.grid, &mut self.blocks, &self.detector, pointer)
    }

    /// Drag-end notification: exit-check, then snap-or-revert.
    pub fn pointer_up(&mut self) {
        self.controller.finish(
            &mut self.grid,
            &mut self.blocks,
            &self.detector,
            &self.exits,
            &mut self.events,
        );
    }

    /// Take all events produced since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn detector(&self) -> &CollisionDetector {
        &self.detector
    }

    pub fn exits(&self) -> &[ExitZone] {
        &self.exits
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn dragged_block(&self) -> Option<BlockId> {
        self.controller.active_block()
    }

    /// Convenience passthrough to the detector's legality predicate.
    pub fn can_block_move_to(&self, id: BlockId, pos: Vec2) -> bool {
        self.detector
            .can_block_move_to(&self.grid, &self.blocks, id, pos)
    }

    /// Blocks still on the board.
    pub fn remaining_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_removed()).count()
    }

    /// Whether every block has left through an exit.
    pub fn is_cleared(&self) -> bool {
        self.blocks.iter().all(|b| b.is_removed())
    }
}
