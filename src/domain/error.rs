/// Error types for the grid core.
///
/// Illegal actions are ordinary `Err` values: nothing was mutated and no turn
/// was consumed. Game over is not an error.

use thiserror::Error;

use super::side::Side;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SideParseError {
    #[error("unknown side name `{0}` (expected left, right or third)")]
    UnknownSide(String),
    #[error("unknown side state `{0}` (expected e or m)")]
    UnknownState(String),
}

/// Malformed map text. Loading is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map contains no triangles")]
    Empty,
    #[error("triangle at row {row}, col {col}: expected 3 `|`-separated sides, found {found}")]
    FieldCount { row: usize, col: usize, found: usize },
    #[error("triangle at row {row}, col {col}: invalid side state `{token}`")]
    InvalidSideState { row: usize, col: usize, token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid needs at least one row and one column (got {rows}x{cols})")]
    EmptyDimensions { rows: usize, cols: usize },
    #[error("no triangle at ({row}, {col})")]
    NoTriangle { row: usize, col: usize },
    #[error("a {rows}x{cols} grid falls apart into pieces no maze can join")]
    Disconnected { rows: usize, cols: usize },
    #[error(transparent)]
    Map(#[from] MapError),
}

/// A rotation or move that was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("character is off the grid at ({row}, {col})")]
    OffGrid { row: usize, col: usize },
    #[error("blocked by a mirror on the {side} side")]
    Mirror { side: Side },
    #[error("the {side} side is the edge of the maze")]
    Boundary { side: Side },
}
