//! Drag lifecycle orchestration
//!
//! One block at a time moves through `Idle -> Dragging -> {SnappedToGrid |
//! ExitedAndRemoved}`. The controller owns the grab offset (so a block does
//! not jump to center itself under the pointer), delegates legality to the
//! collision detector during the drag, and on release checks the exit
//! condition before falling back to nearest-valid-cell snapping.

use crate::block::{Block, BlockColor, BlockId};
use crate::collision::CollisionDetector;
use crate::exit::ExitZone;
use crate::geometry::GridPos;
use crate::grid::Grid;
use crate::shape::ShapeKind;
use glam::Vec2;

/// Outcome notifications drained by the host after each input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Fired once per level, on the first drag start. External timer hook.
    FirstInteraction,
    /// A drag ended with the block snapped to a different grid position.
    MoveCompleted { block: BlockId },
    /// A block satisfied an exit and left the grid.
    BlockRemoved {
        block: BlockId,
        color: BlockColor,
        shape: ShapeKind,
    },
}

struct ActiveDrag {
    block: BlockId,
    /// Pointer-to-block-corner vector captured at drag start.
    grab_offset: Vec2,
    /// Grid position when the drag began, for change detection.
    start_pos: GridPos,
}

/// Per-level drag state machine.
pub struct DragController {
    active: Option<ActiveDrag>,
    interacted: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            active: None,
            interacted: false,
        }
    }

    pub fn active_block(&self) -> Option<BlockId> {
        self.active.as_ref().map(|drag| drag.block)
    }

    /// Begin dragging `id` from pointer position `pointer`.
    ///
    /// Ignored if another drag is live (no multi-block dragging) or the
    /// block has already been removed. Pushes `FirstInteraction` the first
    /// time any block is grabbed in this level.
    pub fn start(
        &mut self,
        grid: &mut Grid,
        blocks: &mut [Block],
        id: BlockId,
        pointer: Vec2,
        events: &mut Vec<EngineEvent>,
    ) {
        if self.active.is_some() || id.index() >= blocks.len() {
            return;
        }
        let block = &mut blocks[id.index()];
        if block.is_removed() {
            return;
        }
        let grab_offset = block.world_position() - pointer;
        let start_pos = block.grid_position();
        block.start_drag(grid);
        self.active = Some(ActiveDrag {
            block: id,
            grab_offset,
            start_pos,
        });
        if !self.interacted {
            self.interacted = true;
            events.push(EngineEvent::FirstInteraction);
        }
        log::debug!("drag start: {id:?} at {start_pos:?}, grab offset {grab_offset:?}");
    }

    /// Continuous drag update. Returns the legal position the host should
    /// render the block at, or `None` when no drag is live.
    pub fn update(
        &self,
        grid: &Grid,
        blocks: &mut [Block],
        detector: &CollisionDetector,
        pointer: Vec2,
    ) -> Option<Vec2> {
        let drag = self.active.as_ref()?;
        let id = drag.block;
        let desired = pointer + drag.grab_offset;
        let current = blocks[id.index()].world_position();
        let legal = detector.valid_drag_position(grid, blocks, id, desired, current);
        blocks[id.index()].update_drag(legal);
        Some(legal)
    }

    /// End the live drag: exit-check first, then snap to the nearest legal
    /// cell, then - the soft failure path - revert to the last valid
    /// position. Never panics and always leaves occupancy synchronized.
    pub fn finish(
        &mut self,
        grid: &mut Grid,
        blocks: &mut [Block],
        detector: &CollisionDetector,
        exits: &[ExitZone],
        events: &mut Vec<EngineEvent>,
    ) {
        let Some(drag) = self.active.take() else {
            return;
        };
        let id = drag.block;
        blocks[id.index()].end_drag();

        if let Some(exit_index) = detector.check_exit(grid, &blocks[id.index()], exits) {
            let block = &mut blocks[id.index()];
            let color = block.color();
            let shape = block.shape().kind();
            block.remove(grid);
            log::debug!("drag end: {id:?} removed through exit {exit_index}");
            events.push(EngineEvent::BlockRemoved {
                block: id,
                color,
                shape,
            });
            return;
        }

        let dropped_at = blocks[id.index()].world_position();
        match detector.nearest_valid_grid_position(grid, blocks, id, dropped_at) {
            Some(target) => {
                blocks[id.index()].set_grid_position(grid, target);
                log::debug!("drag end: {id:?} snapped to {target:?}");
                if target != drag.start_pos {
                    events.push(EngineEvent::MoveCompleted { block: id });
                }
            }
            None => {
                // No legal cell within the search radius; the move is
                // rejected with a silent snap-back.
                let anchor = blocks[id.index()].last_valid_position();
                blocks[id.index()].set_grid_position(grid, anchor);
                log::debug!("drag end: no legal cell near drop point, {id:?} reverted to {anchor:?}");
            }
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
