//! Coarse-grid A* and unstuck recovery used by movers that lost line of sight.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
    f32::consts::SQRT_2,
};

use arena_siege_core::PathTuning;
use glam::Vec2;

use crate::walls::WallMap;

/// Cell of the navigation grid; one cell spans one wall block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    x: i32,
    y: i32,
}

impl GridCell {
    /// Creates a grid cell.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing the world position.
    #[must_use]
    pub fn containing(position: Vec2, block: f32) -> Self {
        let block = block.max(f32::EPSILON);
        Self::new(
            (position.x / block).floor() as i32,
            (position.y / block).floor() as i32,
        )
    }

    /// World position of the cell center.
    #[must_use]
    pub fn center(&self, block: f32) -> Vec2 {
        (Vec2::new(self.x as f32, self.y as f32) + Vec2::splat(0.5)) * block
    }

    fn distance(&self, other: GridCell) -> f32 {
        Vec2::new((self.x - other.x) as f32, (self.y - other.y) as f32).length()
    }
}

/// Outcome of one bounded search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchReport {
    /// First waypoint of the found path, or `None` when the search failed.
    pub next_step: Option<Vec2>,
    /// Node expansions performed.
    pub iterations: u32,
}

#[derive(Clone, Copy, Debug)]
struct PathNode {
    g: f32,
    parent: Option<GridCell>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    g: f32,
    cell: GridCell,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the lowest f, ties favouring deeper nodes.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

/// Runs A* from `from` toward `to`, expanding at most `max_iterations` nodes.
///
/// Movement is 8-directional with orthogonal cost 1 and diagonal cost
/// sqrt(2); diagonals may not cut the corner of a blocked cell. The goal cell
/// is always enterable so targets standing against walls stay reachable.
#[must_use]
pub fn search(walls: &WallMap, from: Vec2, to: Vec2, max_iterations: u32) -> SearchReport {
    let block = walls.block_size();
    let start = GridCell::containing(from, block);
    let goal = GridCell::containing(to, block);

    if start == goal {
        return SearchReport {
            next_step: Some(to),
            iterations: 0,
        };
    }

    let blocked = |cell: GridCell| cell != goal && walls.is_wall(cell.center(block));

    let mut nodes: HashMap<GridCell, PathNode> = HashMap::new();
    let mut closed: HashSet<GridCell> = HashSet::new();
    let mut open = BinaryHeap::new();
    let _ = nodes.insert(start, PathNode { g: 0.0, parent: None });
    open.push(OpenEntry {
        f: start.distance(goal),
        g: 0.0,
        cell: start,
    });

    let mut iterations = 0;
    while let Some(entry) = open.pop() {
        if iterations >= max_iterations {
            break;
        }
        if !closed.insert(entry.cell) {
            continue;
        }
        iterations += 1;

        if entry.cell == goal {
            let step = first_step(&nodes, start, goal);
            return SearchReport {
                next_step: Some(if step == goal { to } else { step.center(block) }),
                iterations,
            };
        }

        for (neighbor, cost) in neighbors(entry.cell) {
            if closed.contains(&neighbor) || blocked(neighbor) {
                continue;
            }
            let diagonal = neighbor.x != entry.cell.x && neighbor.y != entry.cell.y;
            if diagonal
                && (blocked(GridCell::new(neighbor.x, entry.cell.y))
                    || blocked(GridCell::new(entry.cell.x, neighbor.y)))
            {
                continue;
            }

            let g = entry.g + cost;
            let improved = nodes.get(&neighbor).map_or(true, |node| g < node.g);
            if !improved {
                continue;
            }
            let _ = nodes.insert(
                neighbor,
                PathNode {
                    g,
                    parent: Some(entry.cell),
                },
            );
            open.push(OpenEntry {
                f: g + neighbor.distance(goal),
                g,
                cell: neighbor,
            });
        }
    }

    log::trace!("path search gave up after {iterations} expansions");
    SearchReport {
        next_step: None,
        iterations,
    }
}

/// Next waypoint from `from` toward `to`, or `to` itself when no path exists
/// within the iteration bound.
#[must_use]
pub fn find_next_step(walls: &WallMap, from: Vec2, to: Vec2, tuning: &PathTuning) -> Vec2 {
    search(walls, from, to, tuning.max_iterations)
        .next_step
        .unwrap_or(to)
}

/// Moves a position out of a wall.
///
/// Positions outside every wall are returned unchanged. Otherwise rings of
/// whole-block offsets are searched outward up to `radius_blocks`; the first
/// free candidate wins. When none is free the original position is returned.
#[must_use]
pub fn unstuck_from_wall(walls: &WallMap, position: Vec2, radius_blocks: i32) -> Vec2 {
    if !walls.is_wall(position) {
        return position;
    }

    let block = walls.block_size();
    for radius in 1..=radius_blocks {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let candidate = position + Vec2::new(dx as f32, dy as f32) * block;
                if !walls.is_wall(candidate) {
                    return candidate;
                }
            }
        }
    }

    log::warn!(
        "no free cell within {radius_blocks} blocks of ({:.0}, {:.0})",
        position.x,
        position.y
    );
    position
}

fn first_step(nodes: &HashMap<GridCell, PathNode>, start: GridCell, goal: GridCell) -> GridCell {
    let mut current = goal;
    while let Some(parent) = nodes.get(&current).and_then(|node| node.parent) {
        if parent == start {
            return current;
        }
        current = parent;
    }
    current
}

fn neighbors(cell: GridCell) -> impl Iterator<Item = (GridCell, f32)> {
    const OFFSETS: [(i32, i32); 8] = [
        (0, -1),
        (1, 0),
        (0, 1),
        (-1, 0),
        (1, -1),
        (1, 1),
        (-1, 1),
        (-1, -1),
    ];

    OFFSETS.into_iter().map(move |(dx, dy)| {
        let cost = if dx != 0 && dy != 0 { SQRT_2 } else { 1.0 };
        (GridCell::new(cell.x + dx, cell.y + dy), cost)
    })
}
