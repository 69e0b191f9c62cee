/// A single cell of the tessellation.
///
/// Triangles never hold references to each other. A neighbor is stored as the
/// `(row, col)` pair of the adjacent triangle and resolved through the owning
/// `TriangularGrid`.

use super::side::{Side, SideState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub row: usize,
    pub col: usize,
    points_up: bool,
    sides: [SideState; 3],
    neighbors: [Option<(usize, usize)>; 3],
}

impl Triangle {
    pub fn new(row: usize, col: usize) -> Self {
        Triangle {
            row,
            col,
            points_up: (row + col) % 2 == 0,
            sides: [SideState::Empty; 3],
            neighbors: [None; 3],
        }
    }

    /// Orientation is fixed by position and never changes.
    #[inline]
    pub fn points_up(&self) -> bool {
        self.points_up
    }

    #[inline]
    pub fn side_state(&self, side: Side) -> SideState {
        self.sides[side.index()]
    }

    /// Coordinates of the triangle across `side`, `None` on the grid boundary.
    #[inline]
    pub fn neighbor(&self, side: Side) -> Option<(usize, usize)> {
        self.neighbors[side.index()]
    }

    pub fn is_boundary(&self, side: Side) -> bool {
        self.neighbors[side.index()].is_none()
    }

    /// Candidate coordinates across each side, before bounds checks.
    /// Left/right stay in the row; the base leads down when pointing up and
    /// up when pointing down.
    pub fn adjacent_coords(&self, side: Side) -> Option<(usize, usize)> {
        match side {
            Side::Left => self.col.checked_sub(1).map(|c| (self.row, c)),
            Side::Right => Some((self.row, self.col + 1)),
            Side::Third if self.points_up => Some((self.row + 1, self.col)),
            Side::Third => self.row.checked_sub(1).map(|r| (r, self.col)),
        }
    }

    /// Local write without propagation. The grid keeps the edge in sync.
    pub(crate) fn set_side_local(&mut self, side: Side, state: SideState) {
        self.sides[side.index()] = state;
    }

    pub(crate) fn set_neighbor(&mut self, side: Side, coords: Option<(usize, usize)>) {
        self.neighbors[side.index()] = coords;
    }

    /// `L|R|T` map token.
    pub fn to_token(&self) -> String {
        format!(
            "{}|{}|{}",
            self.sides[0].to_char(),
            self.sides[1].to_char(),
            self.sides[2].to_char()
        )
    }
}
