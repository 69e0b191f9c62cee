/// Events produced by one input.
/// Returned as plain values; the presentation layer turns them into
/// status messages.

use crate::domain::graph::GraphNode;
use super::movement::Phase;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged { phase: Phase },
    PlayerRotated { to: GraphNode },
    PlayerMoved { to: GraphNode },
    EnemyMoved { to: GraphNode },
    EnemyWaiting,
    Collision { row: usize, col: usize },
}

impl GameEvent {
    /// Short status-line text.
    pub fn describe(&self) -> String {
        match self {
            GameEvent::PhaseChanged { phase } => format!("{} mode", phase.name()),
            GameEvent::PlayerRotated { to } => format!("Facing {}", to.orientation),
            GameEvent::PlayerMoved { to } => format!("Moved to ({}, {})", to.row, to.col),
            GameEvent::EnemyMoved { .. } => "The enemy closes in".to_string(),
            GameEvent::EnemyWaiting => "The enemy waits".to_string(),
            GameEvent::Collision { row, col } => format!("Caught at ({row}, {col})!"),
        }
    }
}
