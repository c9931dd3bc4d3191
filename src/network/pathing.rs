//! Bounded A* over grid positions.
//!
//! The search is shared by the road builder (floating terrain costs with turn
//! penalties and bridge jumps) and the settlement builder (small integer
//! costs). Open-set ties are broken by grid position so results never depend
//! on heap internals. When the iteration budget runs out the search returns
//! the path to the explored node closest to the goal instead of failing.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::warn;

use crate::tilemap::GridPos;

/// One outgoing edge from a node
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub to: GridPos,
    pub cost: f32,
    /// Tiles crossed between the node and `to`, in travel order (bridge spans)
    pub via: Vec<GridPos>,
}

impl Step {
    pub fn new(to: GridPos, cost: f32) -> Self {
        Self { to, cost, via: Vec::new() }
    }

    pub fn with_via(to: GridPos, cost: f32, via: Vec<GridPos>) -> Self {
        Self { to, cost, via }
    }
}

/// Result of a search
#[derive(Clone, Debug, PartialEq)]
pub struct RoutedPath {
    /// Tiles from start to the end point, inclusive
    pub tiles: Vec<GridPos>,
    pub cost: f32,
    /// False when the budget ran out and `tiles` ends short of the goal
    pub complete: bool,
}

impl RoutedPath {
    pub fn end(&self) -> Option<GridPos> {
        self.tiles.last().copied()
    }
}

/// Node for the priority queue
#[derive(Clone, Copy)]
struct PathNode {
    pos: GridPos,
    g: f32,
    f: f32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap: lowest f, then lowest position
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

/// Run A* from `start` to `goal`.
///
/// `successors(node, parent)` lists outgoing steps; infinite-cost steps are
/// skipped. `heuristic(node)` estimates the remaining cost.
pub fn find_path<S, H>(
    start: GridPos,
    goal: GridPos,
    max_iterations: usize,
    mut successors: S,
    heuristic: H,
) -> RoutedPath
where
    S: FnMut(GridPos, Option<GridPos>) -> Vec<Step>,
    H: Fn(GridPos) -> f32,
{
    let mut g_score: HashMap<GridPos, f32> = HashMap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut via_tiles: HashMap<GridPos, Vec<GridPos>> = HashMap::new();
    let mut closed: HashSet<GridPos> = HashSet::new();
    let mut open = BinaryHeap::new();

    g_score.insert(start, 0.0);
    open.push(PathNode { pos: start, g: 0.0, f: heuristic(start) });

    // Closest explored node to the goal: (h, g, pos)
    let mut best = (heuristic(start), 0.0f32, start);
    let mut iterations = 0usize;

    while let Some(PathNode { pos, g, .. }) = open.pop() {
        if pos == goal {
            return RoutedPath {
                tiles: reconstruct(&came_from, &via_tiles, pos),
                cost: g,
                complete: true,
            };
        }

        if !closed.insert(pos) {
            continue;
        }

        iterations += 1;
        if iterations > max_iterations {
            break;
        }

        let h = heuristic(pos);
        if h < best.0 || (h == best.0 && g < best.1) {
            best = (h, g, pos);
        }

        let parent = came_from.get(&pos).copied();
        for step in successors(pos, parent) {
            if !step.cost.is_finite() || closed.contains(&step.to) {
                continue;
            }

            let tentative = g + step.cost;
            let current = g_score.get(&step.to).copied().unwrap_or(f32::INFINITY);
            if tentative < current {
                g_score.insert(step.to, tentative);
                came_from.insert(step.to, pos);
                if step.via.is_empty() {
                    via_tiles.remove(&step.to);
                } else {
                    via_tiles.insert(step.to, step.via);
                }
                open.push(PathNode {
                    pos: step.to,
                    g: tentative,
                    f: tentative + heuristic(step.to),
                });
            }
        }
    }

    warn!(
        %start,
        %goal,
        iterations,
        reached = %best.2,
        "path search exhausted, using best partial path"
    );

    RoutedPath {
        tiles: reconstruct(&came_from, &via_tiles, best.2),
        cost: best.1,
        complete: false,
    }
}

/// Walk parent pointers back from `end`, expanding bridge spans.
fn reconstruct(
    came_from: &HashMap<GridPos, GridPos>,
    via_tiles: &HashMap<GridPos, Vec<GridPos>>,
    end: GridPos,
) -> Vec<GridPos> {
    let mut path = vec![end];
    let mut current = end;

    while let Some(&prev) = came_from.get(&current) {
        if let Some(via) = via_tiles.get(&current) {
            path.extend(via.iter().rev());
        }
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
