/// State graph over `(row, col, orientation)`.
///
/// Each node has two rotation edges (to the other orientations of the same
/// triangle) and up to two movement edges (through the faced side, arriving
/// forward-left or forward-right). The graph is a cached derivation of the
/// grid: rebuild it whenever side states change.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{step_target, MoveDirection, Rotation};
use super::grid::TriangularGrid;
use super::side::Side;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct GraphNode {
    pub row: usize,
    pub col: usize,
    pub orientation: Side,
}

impl GraphNode {
    pub fn new(row: usize, col: usize, orientation: Side) -> Self {
        GraphNode { row, col, orientation }
    }

    /// `|Δrow| + |Δcol|`, orientation ignored.
    pub fn manhattan(&self, other: &GraphNode) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.row, self.col, self.orientation)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EdgeKind {
    Rotate(Rotation),
    Move(MoveDirection),
}

impl EdgeKind {
    pub fn is_move(self) -> bool {
        matches!(self, EdgeKind::Move(_))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GraphEdge {
    /// Index of the target node.
    pub target: usize,
    pub kind: EdgeKind,
}

#[derive(Clone, Debug, Default)]
pub struct GridGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<GraphNode, usize>,
    edges: Vec<Vec<GraphEdge>>,
}

impl GridGraph {
    /// Nodes first, so every edge target resolves by lookup; then rotation
    /// edges; then movement edges.
    pub fn build(grid: &TriangularGrid) -> Self {
        let mut graph = GridGraph::default();

        for t in grid.triangles() {
            for side in Side::ALL {
                let node = GraphNode::new(t.row, t.col, side);
                graph.index.insert(node, graph.nodes.len());
                graph.nodes.push(node);
            }
        }
        graph.edges = vec![Vec::new(); graph.nodes.len()];

        for i in 0..graph.nodes.len() {
            let node = graph.nodes[i];
            let Some(points_up) = grid.get(node.row, node.col).map(|t| t.points_up()) else {
                continue;
            };
            for rotation in [Rotation::Clockwise, Rotation::CounterClockwise] {
                let turned = GraphNode::new(node.row, node.col, rotation.apply(node.orientation, points_up));
                if let Some(&target) = graph.index.get(&turned) {
                    graph.edges[i].push(GraphEdge { target, kind: EdgeKind::Rotate(rotation) });
                }
            }
        }

        for i in 0..graph.nodes.len() {
            let node = graph.nodes[i];
            for direction in MoveDirection::ALL {
                let Ok(landed) = step_target(grid, node, direction) else { continue };
                if let Some(&target) = graph.index.get(&landed) {
                    graph.edges[i].push(GraphEdge { target, kind: EdgeKind::Move(direction) });
                }
            }
        }

        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn node(&self, index: usize) -> Option<GraphNode> {
        self.nodes.get(index).copied()
    }

    pub fn node_index(&self, node: &GraphNode) -> Option<usize> {
        self.index.get(node).copied()
    }

    pub fn contains(&self, node: &GraphNode) -> bool {
        self.index.contains_key(node)
    }

    /// Outgoing edges of node `index`; empty for unknown indices.
    pub fn edges(&self, index: usize) -> &[GraphEdge] {
        self.edges.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Is there an edge `from → to`?
    pub fn has_edge(&self, from: &GraphNode, to: &GraphNode) -> bool {
        match (self.node_index(from), self.node_index(to)) {
            (Some(a), Some(b)) => self.edges(a).iter().any(|e| e.target == b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Character, CharacterKind};
    use crate::domain::side::SideState;

    #[test]
    fn three_nodes_per_triangle() {
        let grid = TriangularGrid::new(3, 5).unwrap();
        let graph = GridGraph::build(&grid);
        assert_eq!(graph.node_count(), 45);
        for t in grid.triangles() {
            for side in Side::ALL {
                assert!(graph.contains(&GraphNode::new(t.row, t.col, side)));
            }
        }
    }

    #[test]
    fn every_node_has_two_rotations() {
        let grid = TriangularGrid::new(2, 4).unwrap();
        let graph = GridGraph::build(&grid);
        for i in 0..graph.node_count() {
            let here = graph.node(i).unwrap();
            let rotations: Vec<_> = graph.edges(i).iter().filter(|e| !e.kind.is_move()).collect();
            assert_eq!(rotations.len(), 2);
            for e in rotations {
                let there = graph.node(e.target).unwrap();
                assert_eq!((there.row, there.col), (here.row, here.col));
                assert_ne!(there.orientation, here.orientation);
            }
        }
    }

    #[test]
    fn movement_edges_respect_mirrors() {
        let mut grid = TriangularGrid::new(1, 2).unwrap();
        let open = GridGraph::build(&grid);
        let from = GraphNode::new(0, 0, Side::Right);
        let idx = open.node_index(&from).unwrap();
        assert_eq!(open.edges(idx).iter().filter(|e| e.kind.is_move()).count(), 2);

        grid.set_side_state(0, 0, Side::Right, SideState::Mirror).unwrap();
        let closed = GridGraph::build(&grid);
        let idx = closed.node_index(&from).unwrap();
        assert_eq!(closed.edges(idx).iter().filter(|e| e.kind.is_move()).count(), 0);
    }

    #[test]
    fn boundary_facing_nodes_have_no_moves() {
        let grid = TriangularGrid::new(1, 1).unwrap();
        let graph = GridGraph::build(&grid);
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn edges_follow_character_moves() {
        let out = TriangularGrid::generate_random_grid(5, 9, 0.2, Some("graph")).unwrap();
        let graph = GridGraph::build(&out.grid);
        for (i, node) in graph.nodes().iter().enumerate() {
            for edge in graph.edges(i) {
                let EdgeKind::Move(direction) = edge.kind else { continue };
                let mut c = Character::new(CharacterKind::Player, node.row, node.col, node.orientation);
                let landed = c.move_forward(&out.grid, direction).unwrap();
                assert_eq!(Some(landed), graph.node(edge.target));
            }
        }
    }

    #[test]
    fn has_edge_lookup() {
        let grid = TriangularGrid::new(1, 2).unwrap();
        let graph = GridGraph::build(&grid);
        assert!(graph.has_edge(
            &GraphNode::new(0, 0, Side::Right),
            &GraphNode::new(0, 1, Side::Third)
        ));
        assert!(!graph.has_edge(
            &GraphNode::new(0, 0, Side::Left),
            &GraphNode::new(0, 1, Side::Third)
        ));
        assert!(!graph.has_edge(
            &GraphNode::new(9, 9, Side::Left),
            &GraphNode::new(0, 1, Side::Third)
        ));
    }

    #[test]
    fn manhattan_ignores_orientation() {
        let a = GraphNode::new(0, 0, Side::Left);
        let b = GraphNode::new(3, 7, Side::Right);
        assert_eq!(a.manhattan(&b), 10);
        assert_eq!(b.manhattan(&a), 10);
        assert_eq!(a.manhattan(&GraphNode::new(0, 0, Side::Third)), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn move_edges_match_character(
                rows in 1usize..6,
                cols in 1usize..10,
                density in 0.0f64..1.0,
                seed in "[a-z]{1,6}",
            ) {
                // One column splits into pairs of rows from three rows on.
                prop_assume!(cols > 1 || rows < 3);
                let out = TriangularGrid::generate_random_grid(rows, cols, density, Some(&seed)).unwrap();
                let graph = GridGraph::build(&out.grid);
                prop_assert_eq!(graph.node_count(), 3 * out.grid.triangle_count());
                for (i, node) in graph.nodes().iter().enumerate() {
                    let moves: Vec<_> = graph.edges(i).iter().filter(|e| e.kind.is_move()).collect();
                    prop_assert!(moves.len() == 0 || moves.len() == 2);
                    for edge in moves {
                        let EdgeKind::Move(direction) = edge.kind else { continue };
                        let mut c = Character::new(CharacterKind::Enemy, node.row, node.col, node.orientation);
                        prop_assert_eq!(c.move_forward(&out.grid, direction).ok(), graph.node(edge.target));
                    }
                }
            }
        }
    }
}
