/// Enemy AI: A* over the orientation graph.
///
/// Every edge (rotation or move) costs one turn. The heuristic is the
/// Manhattan distance between cells, orientation ignored. Each move changes
/// row or col by exactly one, so the heuristic never overestimates and a
/// binary heap with lazy deletion finds a shortest path in edge count.
///
/// Ties on f-score go to the node pushed first, which keeps the chase
/// deterministic for a given grid.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::graph::{GraphNode, GridGraph};

/// How many upcoming nodes the pursuit step receives.
pub const PATH_LOOKAHEAD: usize = 5;

/// Shortest path from `start` to `goal`, excluding `start`.
///
/// `Some(vec![])` when they are the same node, `None` when either node is
/// unknown or the goal is unreachable.
pub fn find_path(graph: &GridGraph, start: &GraphNode, goal: &GraphNode) -> Option<Vec<GraphNode>> {
    let start_idx = graph.node_index(start)?;
    let goal_idx = graph.node_index(goal)?;
    if start_idx == goal_idx {
        return Some(Vec::new());
    }

    let n = graph.node_count();
    let mut g_score = vec![usize::MAX; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut seq = 0usize;

    g_score[start_idx] = 0;
    open.push(Reverse((start.manhattan(goal), seq, start_idx)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if closed[current] {
            continue;
        }
        if current == goal_idx {
            return Some(reconstruct(graph, &came_from, goal_idx));
        }
        closed[current] = true;

        for edge in graph.edges(current) {
            let next = edge.target;
            if closed[next] {
                continue;
            }
            let tentative = g_score[current] + 1;
            if tentative < g_score[next] {
                g_score[next] = tentative;
                came_from[next] = Some(current);
                let h = graph.node(next).map_or(0, |node| node.manhattan(goal));
                seq += 1;
                open.push(Reverse((tentative + h, seq, next)));
            }
        }
    }

    None
}

fn reconstruct(graph: &GridGraph, came_from: &[Option<usize>], goal: usize) -> Vec<GraphNode> {
    let mut path = Vec::new();
    let mut cursor = goal;
    while let Some(prev) = came_from[cursor] {
        if let Some(node) = graph.node(cursor) {
            path.push(node);
        }
        cursor = prev;
    }
    path.reverse();
    path
}

/// The next few nodes toward `goal` (at most [`PATH_LOOKAHEAD`]); empty when
/// no path exists.
pub fn pursuit_steps(graph: &GridGraph, start: &GraphNode, goal: &GraphNode) -> Vec<GraphNode> {
    let mut path = find_path(graph, start, goal).unwrap_or_default();
    path.truncate(PATH_LOOKAHEAD);
    path
}
