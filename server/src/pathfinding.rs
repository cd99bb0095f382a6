//! Chunk-grid pathfinding.
//!
//! Routes are computed with A* over the chunk grid, not the unit grid:
//! one chunk is the resolution of both terrain and search. The returned
//! waypoints are unit-coordinate positions a unit can travel between in
//! straight lines without crossing impassable terrain.
//!
//! Determinism: neighbor chunks are expanded in a fixed order (diagonals
//! before orthogonals) and priority-queue ties are broken by insertion
//! order, so identical inputs always produce identical paths.

use crate::error::{Result, SimError};
use crate::grid::GridMap;
use shared::{chunk_center, Coord, CHUNK_SIZE};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Fixed neighbor expansion order: the four diagonals, then the four
/// orthogonals.
const NEIGHBOR_ORDER: [(i32, i32); 8] = [
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// Cost of an orthogonal step between adjacent chunks, in unit distance.
const ORTHO_COST: i64 = CHUNK_SIZE as i64;

/// Cost of a diagonal step: `round(CHUNK_SIZE * sqrt(2))`.
fn diagonal_cost() -> i64 {
    (f64::from(CHUNK_SIZE) * std::f64::consts::SQRT_2).round() as i64
}

/// Straight-line distance between two chunks in unit scale. Never
/// overestimates the remaining path cost, so A* stays optimal.
fn heuristic(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = f64::from(from.0 - to.0);
    let dy = f64::from(from.1 - to.1);
    (dx * dx + dy * dy).sqrt() * f64::from(CHUNK_SIZE)
}

/// An entry in the open set. `seq` is a monotonic insertion counter used
/// to break priority ties deterministically (earlier insertion wins).
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    chunk: (i32, i32),
    priority: f64,
    seq: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.priority.total_cmp(&other.priority) == Ordering::Equal && self.seq == other.seq
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the comparison so the lowest
        // priority value pops first.
        match other.priority.total_cmp(&self.priority) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Computes an obstacle-avoiding waypoint path from `src` to `dest`.
///
/// Intermediate waypoints are chunk centers; the final waypoint is the
/// exact `dest`. The source chunk itself is never emitted: the unit
/// travels directly from its current position toward the first waypoint.
///
/// # Errors
///
/// Returns [`SimError::NoPathToTarget`] if the source or destination
/// chunk is out of bounds, or the destination is unreachable. Returns
/// [`SimError::InternalInconsistency`] if path reconstruction trips its
/// loop guard, which means the search state is corrupt.
pub fn find_path(map: &GridMap, src: Coord, dest: Coord) -> Result<Vec<Coord>> {
    let src_chunk = src.to_chunk();
    if !map.in_bounds(src_chunk) {
        return Err(SimError::NoPathToTarget);
    }

    let dest_chunk = dest.to_chunk();
    if src_chunk == dest_chunk {
        // Same chunk: straight line, no search.
        return Ok(vec![dest]);
    }
    if !map.is_passable(dest_chunk) {
        return Err(SimError::NoPathToTarget);
    }

    let diag_cost = diagonal_cost();
    let mut open: BinaryHeap<OpenNode> = BinaryHeap::new();
    let mut parents: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut best_cost: HashMap<(i32, i32), i64> = HashMap::new();
    let mut seq: u64 = 0;

    best_cost.insert(src_chunk, 0);
    open.push(OpenNode {
        chunk: src_chunk,
        priority: heuristic(src_chunk, dest_chunk),
        seq,
    });

    while let Some(node) = open.pop() {
        if node.chunk == dest_chunk {
            return backtrace(map, &parents, src_chunk, dest_chunk, dest);
        }

        let current_cost = best_cost
            .get(&node.chunk)
            .copied()
            .unwrap_or(i64::MAX);

        for &(dx, dy) in &NEIGHBOR_ORDER {
            let next = (node.chunk.0 + dx, node.chunk.1 + dy);
            if !map.is_passable(next) {
                continue;
            }

            let diagonal = dx != 0 && dy != 0;
            if diagonal {
                // A diagonal step is only legal when both adjacent corner
                // chunks are passable; otherwise it would cut through a
                // zero-width gap between two blocked cells.
                let corner_a = (node.chunk.0 + dx, node.chunk.1);
                let corner_b = (node.chunk.0, node.chunk.1 + dy);
                if !map.is_passable(corner_a) || !map.is_passable(corner_b) {
                    continue;
                }
            }

            let step_cost = if diagonal { diag_cost } else { ORTHO_COST };
            let tentative = current_cost + step_cost;

            if best_cost.get(&next).map_or(true, |&c| tentative < c) {
                best_cost.insert(next, tentative);
                parents.insert(next, node.chunk);
                seq += 1;
                open.push(OpenNode {
                    chunk: next,
                    priority: tentative as f64 + heuristic(next, dest_chunk),
                    seq,
                });
            }
        }
    }

    Err(SimError::NoPathToTarget)
}

/// Walks parent pointers from the destination chunk back to the source,
/// then maps the chunk sequence to waypoints.
fn backtrace(
    map: &GridMap,
    parents: &HashMap<(i32, i32), (i32, i32)>,
    src_chunk: (i32, i32),
    dest_chunk: (i32, i32),
    dest: Coord,
) -> Result<Vec<Coord>> {
    let hop_limit = (map.width() as usize) * (map.height() as usize);

    let mut chunks = vec![dest_chunk];
    let mut current = dest_chunk;
    while current != src_chunk {
        if chunks.len() > hop_limit {
            return Err(SimError::InternalInconsistency(format!(
                "path backtrace exceeded {hop_limit} hops"
            )));
        }
        current = *parents.get(&current).ok_or_else(|| {
            SimError::InternalInconsistency(format!("missing parent for chunk {current:?}"))
        })?;
        chunks.push(current);
    }
    chunks.reverse();

    // Intermediate chunks become their centers; the final waypoint is the
    // exact destination and the source chunk is skipped entirely.
    let mut waypoints = Vec::with_capacity(chunks.len() - 1);
    for &(cx, cy) in &chunks[1..chunks.len() - 1] {
        waypoints.push(chunk_center(cx, cy));
    }
    waypoints.push(dest);
    Ok(waypoints)
}
