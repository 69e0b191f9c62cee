/// Characters: the player and the enemy share one value type.
/// A character is `(row, col, orientation)` plus its role; the phase state
/// machine that drives it lives in `sim::movement`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ActionError;
use super::graph::GraphNode;
use super::grid::TriangularGrid;
use super::side::Side;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Player,
    Enemy,
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CharacterKind::Player => "player",
            CharacterKind::Enemy => "enemy",
        })
    }
}

/// Which of the two non-reentrant sides to face after crossing an edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    ForwardLeft,
    ForwardRight,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 2] = [MoveDirection::ForwardLeft, MoveDirection::ForwardRight];

    /// Orientation on arrival, given the side entered through and the
    /// destination triangle's pointing direction.
    pub fn arrival(self, entered: Side, points_up: bool) -> Side {
        match self {
            MoveDirection::ForwardLeft => entered.clockwise(points_up),
            MoveDirection::ForwardRight => entered.counter_clockwise(points_up),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn apply(self, side: Side, points_up: bool) -> Side {
        match self {
            Rotation::Clockwise => side.clockwise(points_up),
            Rotation::CounterClockwise => side.counter_clockwise(points_up),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub row: usize,
    pub col: usize,
    pub orientation: Side,
    pub kind: CharacterKind,
}

impl Character {
    pub fn new(kind: CharacterKind, row: usize, col: usize, orientation: Side) -> Self {
        Character { row, col, orientation, kind }
    }

    pub fn pose(&self) -> GraphNode {
        GraphNode::new(self.row, self.col, self.orientation)
    }

    pub fn set_pose(&mut self, node: GraphNode) {
        self.row = node.row;
        self.col = node.col;
        self.orientation = node.orientation;
    }

    pub fn same_cell(&self, other: &Character) -> bool {
        self.row == other.row && self.col == other.col
    }

    pub fn rotate_clockwise(&mut self, points_up: bool) {
        self.orientation = self.orientation.clockwise(points_up);
    }

    pub fn rotate_counter_clockwise(&mut self, points_up: bool) {
        self.orientation = self.orientation.counter_clockwise(points_up);
    }

    /// Rotate in place on the current triangle.
    pub fn rotate(&mut self, grid: &TriangularGrid, rotation: Rotation) -> Result<GraphNode, ActionError> {
        let points_up = grid
            .get(self.row, self.col)
            .ok_or(ActionError::OffGrid { row: self.row, col: self.col })?
            .points_up();
        self.orientation = rotation.apply(self.orientation, points_up);
        Ok(self.pose())
    }

    /// Step through the faced side. On error nothing changes.
    pub fn move_forward(
        &mut self,
        grid: &TriangularGrid,
        direction: MoveDirection,
    ) -> Result<GraphNode, ActionError> {
        let target = step_target(grid, self.pose(), direction)?;
        self.set_pose(target);
        Ok(target)
    }
}

/// Where a move from `from` in `direction` would land. Shared by
/// `Character::move_forward` and graph construction so both agree.
pub fn step_target(
    grid: &TriangularGrid,
    from: GraphNode,
    direction: MoveDirection,
) -> Result<GraphNode, ActionError> {
    let side = from.orientation;
    let here = grid
        .get(from.row, from.col)
        .ok_or(ActionError::OffGrid { row: from.row, col: from.col })?;
    if !here.side_state(side).is_passable() {
        return Err(ActionError::Mirror { side });
    }
    let next = grid
        .neighbor(from.row, from.col, side)
        .ok_or(ActionError::Boundary { side })?;

    let entered = side.corresponding();
    let orientation = direction.arrival(entered, next.points_up());
    Ok(GraphNode::new(next.row, next.col, orientation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::side::SideState;

    fn closed_pair() -> TriangularGrid {
        // 1x2: only the shared edge is open.
        TriangularGrid::from_map("m|e|m e|m|m").unwrap()
    }

    #[test]
    fn rotation_without_grid() {
        let mut c = Character::new(CharacterKind::Player, 0, 0, Side::Left);
        c.rotate_clockwise(true);
        assert_eq!(c.orientation, Side::Right);
        c.rotate_counter_clockwise(true);
        assert_eq!(c.orientation, Side::Left);
        c.rotate_clockwise(false);
        assert_eq!(c.orientation, Side::Third);
    }

    #[test]
    fn forward_left_into_pair() {
        let grid = closed_pair();
        let mut c = Character::new(CharacterKind::Player, 0, 0, Side::Right);
        let landed = c.move_forward(&grid, MoveDirection::ForwardLeft).unwrap();
        // Entered (0,1) through its left side; (0,1) points down.
        assert_eq!(landed, GraphNode::new(0, 1, Side::Third));
        assert_eq!(c.pose(), landed);
    }

    #[test]
    fn forward_right_into_pair() {
        let grid = closed_pair();
        let mut c = Character::new(CharacterKind::Player, 0, 0, Side::Right);
        let landed = c.move_forward(&grid, MoveDirection::ForwardRight).unwrap();
        assert_eq!(landed, GraphNode::new(0, 1, Side::Right));
    }

    #[test]
    fn arrival_never_faces_entry_side() {
        for up in [true, false] {
            for entered in Side::ALL {
                for dir in MoveDirection::ALL {
                    assert_ne!(dir.arrival(entered, up), entered);
                }
                assert_ne!(
                    MoveDirection::ForwardLeft.arrival(entered, up),
                    MoveDirection::ForwardRight.arrival(entered, up)
                );
            }
        }
    }

    #[test]
    fn mirror_blocks_and_leaves_pose() {
        let mut grid = closed_pair();
        grid.set_side_state(0, 0, Side::Right, SideState::Mirror).unwrap();
        let mut c = Character::new(CharacterKind::Enemy, 0, 0, Side::Right);
        assert_eq!(
            c.move_forward(&grid, MoveDirection::ForwardLeft),
            Err(ActionError::Mirror { side: Side::Right })
        );
        assert_eq!(c.pose(), GraphNode::new(0, 0, Side::Right));
    }

    #[test]
    fn open_boundary_is_still_blocked() {
        let grid = TriangularGrid::new(1, 2).unwrap();
        let mut c = Character::new(CharacterKind::Player, 0, 0, Side::Left);
        assert_eq!(
            c.move_forward(&grid, MoveDirection::ForwardRight),
            Err(ActionError::Boundary { side: Side::Left })
        );
    }

    #[test]
    fn off_grid_character_cannot_act() {
        let grid = TriangularGrid::new(1, 2).unwrap();
        let mut c = Character::new(CharacterKind::Player, 4, 4, Side::Left);
        assert_eq!(
            c.move_forward(&grid, MoveDirection::ForwardLeft),
            Err(ActionError::OffGrid { row: 4, col: 4 })
        );
        assert!(c.rotate(&grid, Rotation::Clockwise).is_err());
        assert_eq!(c.orientation, Side::Left);
    }

    #[test]
    fn rotate_uses_triangle_orientation() {
        let grid = TriangularGrid::new(1, 2).unwrap();
        let mut c = Character::new(CharacterKind::Player, 0, 1, Side::Left);
        let pose = c.rotate(&grid, Rotation::Clockwise).unwrap();
        // (0,1) points down: left -> third.
        assert_eq!(pose.orientation, Side::Third);
    }

    #[test]
    fn vertical_move_across_base() {
        let grid = TriangularGrid::new(2, 1).unwrap();
        let mut c = Character::new(CharacterKind::Player, 0, 0, Side::Third);
        let landed = c.move_forward(&grid, MoveDirection::ForwardLeft).unwrap();
        // (1,0) points down, entered via third; clockwise from third is right.
        assert_eq!(landed, GraphNode::new(1, 0, Side::Right));
    }
}
