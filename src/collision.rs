//! Collision detection, swept movement, sliding and placement search
//!
//! The detector answers four questions during play:
//! - is a continuous candidate position legal? ([`CollisionDetector::can_block_move_to`])
//! - given a desired drag target, how far can the block actually move?
//!   ([`CollisionDetector::valid_drag_position`], with wall-sliding)
//! - where should the block snap when the drag ends?
//!   ([`CollisionDetector::nearest_valid_grid_position`])
//! - does the block satisfy an exit? ([`CollisionDetector::check_exit`])
//!
//! All queries are total: "no valid position" and "no matching exit" are
//! first-class `None`/`false` outcomes, never errors. Every query is a
//! bounded synchronous computation (fixed sweep step count, capped
//! refinement iterations, ring radius cap), so a call always fits inside a
//! single input-event handling slice.

use crate::block::{Block, BlockId};
use crate::exit::{ExitSide, ExitZone};
use crate::geometry::GridPos;
use crate::grid::Grid;
use ahash::AHashSet;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Tuning for collision and snapping, expressed relative to cell size so
/// levels with very different grid densities behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Gap shaved off each side of every rectangle in overlap tests, as a
    /// fraction of cell size. Keeps adjacent blocks from visually touching
    /// and absorbs float jitter (default: 0.06, about a couple of pixels at
    /// typical cell sizes).
    pub buffer_ratio: f32,
    /// How far a block's edge may sit from an exit's outer edge and still
    /// count as aligned, as a fraction of cell size (default: 0.5).
    pub align_tolerance_ratio: f32,
    /// Sample spacing of the swept legality check, as a fraction of cell
    /// size (default: 0.5). Must stay below 1.0 minus twice the buffer or a
    /// sweep could step over a one-cell obstruction.
    pub sweep_step_ratio: f32,
    /// Iteration cap for the binary refinement that tightens a sweep's
    /// stopping point against an obstruction (default: 8).
    pub refine_iterations: u32,
    /// Distance below which refinement stops early, as a fraction of cell
    /// size (default: 0.02).
    pub refine_tolerance_ratio: f32,
    /// Ring radius cap for the drag-end placement search (default: 3).
    pub search_radius: i32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            buffer_ratio: 0.06,
            align_tolerance_ratio: 0.5,
            sweep_step_ratio: 0.5,
            refine_iterations: 8,
            refine_tolerance_ratio: 0.02,
            search_radius: 3,
        }
    }
}

impl CollisionConfig {
    /// Clamp every field to a sane range so malformed host configuration
    /// cannot produce degenerate sweeps or unbounded searches.
    pub fn clamped(self) -> Self {
        Self {
            buffer_ratio: self.buffer_ratio.clamp(0.0, 0.25),
            align_tolerance_ratio: self.align_tolerance_ratio.clamp(0.01, 1.0),
            sweep_step_ratio: self.sweep_step_ratio.clamp(0.05, 0.8),
            refine_iterations: self.refine_iterations.clamp(1, 32),
            refine_tolerance_ratio: self.refine_tolerance_ratio.clamp(0.001, 0.25),
            search_radius: self.search_radius.clamp(1, 8),
        }
    }
}

/// Outcome of a swept legality check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepResult {
    /// Furthest legal position found along the segment.
    pub stop: Vec2,
    /// Whether the sweep reached `end` without obstruction.
    pub reached_end: bool,
}

/// Swept legality check from `start` toward `end`.
///
/// Samples the segment every `step` units; on the first illegal sample,
/// binary-searches between the last legal and first illegal position
/// (at most `refine_iterations` halvings, stopping early below `tolerance`)
/// so the block stops flush against the obstruction instead of a visible
/// step short of it. Pure over the predicate; the diagonal sweep and both
/// axis sweeps of the sliding resolver share this one loop.
///
/// `start` is assumed legal; if it is not, the result degrades to `start`.
pub fn sweep_toward<F: Fn(Vec2) -> bool>(
    predicate: F,
    start: Vec2,
    end: Vec2,
    step: f32,
    refine_iterations: u32,
    tolerance: f32,
) -> SweepResult {
    let delta = end - start;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return SweepResult {
            stop: end,
            reached_end: true,
        };
    }
    let dir = delta / dist;
    let min_step = tolerance.max(1e-3).min(dist);
    let step = step.clamp(min_step, dist);

    let mut last_valid = start;
    let mut travelled = 0.0;
    loop {
        travelled = (travelled + step).min(dist);
        let sample = start + dir * travelled;
        if predicate(sample) {
            last_valid = sample;
            if travelled >= dist {
                return SweepResult {
                    stop: end,
                    reached_end: true,
                };
            }
        } else {
            let mut lo = last_valid;
            let mut hi = sample;
            for _ in 0..refine_iterations {
                if (hi - lo).length() <= tolerance {
                    break;
                }
                let mid = (lo + hi) * 0.5;
                if predicate(mid) {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            return SweepResult {
                stop: lo,
                reached_end: false,
            };
        }
    }
}

/// Legality oracle over grid occupancy, block geometry and the static
/// obstacle set. Holds no per-call state.
pub struct CollisionDetector {
    obstacles: AHashSet<GridPos>,
    config: CollisionConfig,
}

impl CollisionDetector {
    pub fn new(obstacles: impl IntoIterator<Item = GridPos>, config: CollisionConfig) -> Self {
        Self {
            obstacles: obstacles.into_iter().collect(),
            config: config.clamped(),
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    pub fn is_obstacle(&self, pos: GridPos) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Core legality predicate: may `id`'s block sit at continuous position
    /// `pos`?
    ///
    /// Rejects if any cell rectangle leaves the playable area, overlaps
    /// (buffered, exact per-cell) another block's cells, or overlaps an
    /// obstacle cell. Occupancy is consulted in a one-cell neighborhood
    /// around each candidate cell, which is sufficient because an
    /// overlapping neighbor's cell can be at most one cell away.
    pub fn can_block_move_to(
        &self,
        grid: &Grid,
        blocks: &[Block],
        id: BlockId,
        pos: Vec2,
    ) -> bool {
        let block = &blocks[id.index()];
        let rects = block.cell_rects_at(grid, pos);
        let field = grid.playfield();
        let buffer = self.config.buffer_ratio * grid.cell_size();
        let eps = 1e-3 * grid.cell_size();

        for rect in &rects {
            if !field.contains_rect(rect, eps) {
                return false;
            }
        }

        let mut occupants: SmallVec<[BlockId; 4]> = SmallVec::new();
        for rect in &rects {
            let center_cell = grid.world_to_grid(rect.center());
            for d_row in -1..=1 {
                for d_col in -1..=1 {
                    let neighbor = GridPos::new(center_cell.row + d_row, center_cell.col + d_col);
                    if let Some(occ) = grid.occupant(neighbor) {
                        if occ != id && !occupants.contains(&occ) {
                            occupants.push(occ);
                        }
                    }
                }
            }
        }

        let candidate_bounds = block.world_bounds_at(grid, pos);
        for occ in occupants {
            let other = &blocks[occ.index()];
            // Cheap bounding-box rejection before the exact per-cell tests
            if !candidate_bounds.overlaps_with_margin(&other.world_bounds(grid), buffer) {
                continue;
            }
            let other_rects = other.cell_rects_at(grid, other.world_position());
            for a in &rects {
                for b in &other_rects {
                    if a.overlaps_with_margin(b, buffer) {
                        return false;
                    }
                }
            }
        }

        for obstacle in &self.obstacles {
            let obstacle_rect = grid.cell_rect(*obstacle);
            if !candidate_bounds.overlaps_with_margin(&obstacle_rect, buffer) {
                continue;
            }
            for rect in &rects {
                if rect.overlaps_with_margin(&obstacle_rect, buffer) {
                    return false;
                }
            }
        }

        true
    }

    /// Motion resolution with wall-sliding.
    ///
    /// Priority order: (1) full diagonal movement, swept from `current` to
    /// `desired`; a clean sweep returns `desired` unchanged. (2) When the
    /// sweep is obstructed, its stopping point is tightened by binary
    /// refinement. (3) From there, the remaining horizontal-only and
    /// vertical-only displacements are each swept independently. (4) The
    /// axis whose result travelled the greater Manhattan distance from the
    /// original position wins (ties go to the horizontal candidate), and
    /// movement along the other axis is then added back from that result.
    /// A block pressed diagonally into a corner keeps moving along whichever
    /// axis is unobstructed instead of stopping dead.
    pub fn valid_drag_position(
        &self,
        grid: &Grid,
        blocks: &[Block],
        id: BlockId,
        desired: Vec2,
        current: Vec2,
    ) -> Vec2 {
        let predicate = |p: Vec2| self.can_block_move_to(grid, blocks, id, p);
        let cell = grid.cell_size();
        let step = self.config.sweep_step_ratio * cell;
        let tolerance = self.config.refine_tolerance_ratio * cell;
        let iterations = self.config.refine_iterations;

        let diagonal = sweep_toward(predicate, current, desired, step, iterations, tolerance);
        if diagonal.reached_end {
            return desired;
        }
        let stop = diagonal.stop;

        let horizontal = sweep_toward(
            predicate,
            stop,
            Vec2::new(desired.x, stop.y),
            step,
            iterations,
            tolerance,
        );
        let vertical = sweep_toward(
            predicate,
            stop,
            Vec2::new(stop.x, desired.y),
            step,
            iterations,
            tolerance,
        );

        let manhattan =
            |p: Vec2| (p.x - current.x).abs() + (p.y - current.y).abs();
        let (winner, other_axis_target) = if manhattan(horizontal.stop) >= manhattan(vertical.stop)
        {
            (horizontal.stop, Vec2::new(horizontal.stop.x, desired.y))
        } else {
            (vertical.stop, Vec2::new(desired.x, vertical.stop.y))
        };

        sweep_toward(
            predicate,
            winner,
            other_axis_target,
            step,
            iterations,
            tolerance,
        )
        .stop
    }

    /// Discrete analogue of [`CollisionDetector::can_block_move_to`]: every
    /// occupied cell must be in bounds, unoccupied-or-self, and not an
    /// obstacle.
    pub fn is_valid_grid_position(
        &self,
        grid: &Grid,
        blocks: &[Block],
        id: BlockId,
        pos: GridPos,
    ) -> bool {
        let block = &blocks[id.index()];
        for cell in block.cells_at(pos) {
            if !grid.is_in_bounds(cell) {
                return false;
            }
            if self.obstacles.contains(&cell) {
                return false;
            }
            if let Some(occ) = grid.occupant(cell) {
                if occ != id {
                    return false;
                }
            }
        }
        true
    }

    /// Nearest legal discrete placement for a block whose bounding-box
    /// corner sits at continuous position `pos`.
    ///
    /// Tests the nearest cell first, then searches outward in square rings
    /// (radius 1 up to the configured cap), visiting each ring's cells in
    /// row-major order and returning the first legal position. `None` means
    /// no legal position exists within the search radius.
    pub fn nearest_valid_grid_position(
        &self,
        grid: &Grid,
        blocks: &[Block],
        id: BlockId,
        pos: Vec2,
    ) -> Option<GridPos> {
        let block = &blocks[id.index()];
        let base_cell = grid.world_to_grid_nearest(pos);
        let home = base_cell.offset_by(-block.shape().origin_offset());
        if self.is_valid_grid_position(grid, blocks, id, home) {
            return Some(home);
        }
        for radius in 1..=self.config.search_radius {
            for d_row in -radius..=radius {
                for d_col in -radius..=radius {
                    if d_row.abs().max(d_col.abs()) != radius {
                        continue;
                    }
                    let candidate = GridPos::new(home.row + d_row, home.col + d_col);
                    if self.is_valid_grid_position(grid, blocks, id, candidate) {
                        log::trace!(
                            "placement search for {id:?} landed at {candidate:?} (radius {radius})"
                        );
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Exit matching for a block at its current continuous position.
    ///
    /// An exit matches when its color equals the block's, the block's world
    /// bounds fit within the exit span along the relevant axis (width for
    /// top/bottom exits, height for left/right), and the block's outward
    /// edge sits within the alignment tolerance of the grid edge.
    ///
    /// Exits are evaluated in level-declared order and the first match wins;
    /// levels with several same-color exits use declaration order as the
    /// tie-break.
    pub fn check_exit(&self, grid: &Grid, block: &Block, exits: &[ExitZone]) -> Option<usize> {
        let bounds = block.world_bounds(grid);
        let tolerance = self.config.align_tolerance_ratio * grid.cell_size();
        let eps = 1e-3 * grid.cell_size();

        for (index, exit) in exits.iter().enumerate() {
            if exit.color != block.color() {
                continue;
            }
            let (span_min, span_max) = exit.world_span(grid);
            let edge = exit.outer_edge(grid);
            let (fits, aligned) = match exit.side {
                ExitSide::Top => (
                    bounds.min.x >= span_min - eps && bounds.max.x <= span_max + eps,
                    (bounds.min.y - edge).abs() <= tolerance,
                ),
                ExitSide::Bottom => (
                    bounds.min.x >= span_min - eps && bounds.max.x <= span_max + eps,
                    (bounds.max.y - edge).abs() <= tolerance,
                ),
                ExitSide::Left => (
                    bounds.min.y >= span_min - eps && bounds.max.y <= span_max + eps,
                    (bounds.min.x - edge).abs() <= tolerance,
                ),
                ExitSide::Right => (
                    bounds.min.y >= span_min - eps && bounds.max.y <= span_max + eps,
                    (bounds.max.x - edge).abs() <= tolerance,
                ),
            };
            if fits && aligned {
                return Some(index);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_reaches_unobstructed_end() {
        let result = sweep_toward(
            |_| true,
            Vec2::ZERO,
            Vec2::new(100.0, 50.0),
            25.0,
            8,
            1.0,
        );
        assert!(result.reached_end);
        assert_eq!(result.stop, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_sweep_refines_against_a_wall() {
        // Legal while x < 40
        let result = sweep_toward(
            |p: Vec2| p.x < 40.0,
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            30.0,
            16,
            0.01,
        );
        assert!(!result.reached_end);
        assert!(result.stop.x <= 40.0);
        assert!(result.stop.x > 39.5, "stop {} not tight", result.stop.x);
    }

    #[test]
    fn test_sweep_zero_length_is_trivially_reached() {
        let result = sweep_toward(|_| false, Vec2::ONE, Vec2::ONE, 10.0, 8, 0.1);
        assert!(result.reached_end);
    }

    #[test]
    fn test_sweep_degrades_to_start_when_start_is_blocked() {
        let result = sweep_toward(|_| false, Vec2::ZERO, Vec2::new(50.0, 0.0), 10.0, 8, 0.1);
        assert!(!result.reached_end);
        assert!(result.stop.length() <= 0.2);
    }

    #[test]
    fn test_config_clamping() {
        let wild = CollisionConfig {
            buffer_ratio: 3.0,
            align_tolerance_ratio: 0.0,
            sweep_step_ratio: 50.0,
            refine_iterations: 0,
            refine_tolerance_ratio: -1.0,
            search_radius: 100,
        }
        .clamped();
        assert_eq!(wild.buffer_ratio, 0.25);
        assert_eq!(wild.align_tolerance_ratio, 0.01);
        assert_eq!(wild.sweep_step_ratio, 0.8);
        assert_eq!(wild.refine_iterations, 1);
        assert_eq!(wild.refine_tolerance_ratio, 0.001);
        assert_eq!(wild.search_radius, 8);
    }
}
