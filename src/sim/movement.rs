/// MovementSystem: the two-phase input grammar.
///
///   ROTATION:  turn keys rotate the player in place
///   MOVEMENT:  turn keys step through the faced side, arriving
///              forward-left or forward-right
///
/// `Forward` selects MOVEMENT, `Backward` selects ROTATION, at any time.
/// Every accepted rotate/move goes through `step::take_turn`.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{MoveDirection, Rotation};
use crate::domain::error::ActionError;
use super::event::GameEvent;
use super::step::{self, PlayerAction};
use super::world::GameState;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Rotation,
    Movement,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Rotation => "ROTATION",
            Phase::Movement => "MOVEMENT",
        }
    }
}

/// Device-independent input, produced by the keyboard and gamepad layers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SemanticKey {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

#[derive(Clone, Debug, Default)]
pub struct MovementSystem {
    phase: Phase,
}

impl MovementSystem {
    pub fn new() -> Self {
        MovementSystem::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// The player action a turn key maps to in the current phase.
    pub fn action_for(&self, key: SemanticKey) -> Option<PlayerAction> {
        match (self.phase, key) {
            (Phase::Rotation, SemanticKey::TurnLeft) => Some(PlayerAction::Rotate(Rotation::CounterClockwise)),
            (Phase::Rotation, SemanticKey::TurnRight) => Some(PlayerAction::Rotate(Rotation::Clockwise)),
            (Phase::Movement, SemanticKey::TurnLeft) => Some(PlayerAction::Move(MoveDirection::ForwardLeft)),
            (Phase::Movement, SemanticKey::TurnRight) => Some(PlayerAction::Move(MoveDirection::ForwardRight)),
            (_, SemanticKey::Forward | SemanticKey::Backward) => None,
        }
    }

    /// Feed one key. Phase keys never touch the game state.
    pub fn handle(&mut self, state: &mut GameState, key: SemanticKey) -> Result<Vec<GameEvent>, ActionError> {
        match key {
            SemanticKey::Forward => Ok(self.switch(Phase::Movement)),
            SemanticKey::Backward => Ok(self.switch(Phase::Rotation)),
            SemanticKey::TurnLeft | SemanticKey::TurnRight => match self.action_for(key) {
                Some(action) => step::take_turn(state, action),
                None => Ok(vec![]),
            },
        }
    }

    fn switch(&mut self, phase: Phase) -> Vec<GameEvent> {
        self.phase = phase;
        vec![GameEvent::PhaseChanged { phase }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::GraphNode;
    use crate::domain::grid::TriangularGrid;
    use crate::domain::side::Side;

    #[test]
    fn starts_in_rotation() {
        assert_eq!(MovementSystem::new().phase(), Phase::Rotation);
    }

    #[test]
    fn phase_keys_switch_unconditionally() {
        let mut state = GameState::new(TriangularGrid::new(2, 2).unwrap());
        let mut ms = MovementSystem::new();
        assert_eq!(
            ms.handle(&mut state, SemanticKey::Forward).unwrap(),
            vec![GameEvent::PhaseChanged { phase: Phase::Movement }]
        );
        ms.handle(&mut state, SemanticKey::Forward).unwrap();
        assert_eq!(ms.phase(), Phase::Movement);
        ms.handle(&mut state, SemanticKey::Backward).unwrap();
        assert_eq!(ms.phase(), Phase::Rotation);
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn turn_keys_rotate_in_rotation_phase() {
        let mut state = GameState::new(TriangularGrid::new(2, 4).unwrap());
        let mut ms = MovementSystem::new();
        ms.handle(&mut state, SemanticKey::TurnRight).unwrap();
        // (0,0) points up: left -> right clockwise.
        assert_eq!(state.player().orientation, Side::Right);
        ms.handle(&mut state, SemanticKey::TurnLeft).unwrap();
        assert_eq!(state.player().orientation, Side::Left);
        assert_eq!(state.turn(), 2);
    }

    #[test]
    fn turn_keys_move_in_movement_phase() {
        let mut state = GameState::new(TriangularGrid::new(2, 4).unwrap());
        let mut ms = MovementSystem::new();
        ms.handle(&mut state, SemanticKey::TurnRight).unwrap();
        ms.handle(&mut state, SemanticKey::Forward).unwrap();
        let events = ms.handle(&mut state, SemanticKey::TurnLeft).unwrap();
        assert_eq!(events[0], GameEvent::PlayerMoved { to: GraphNode::new(0, 1, Side::Third) });
    }

    #[test]
    fn blocked_move_is_reported_without_turn() {
        let mut state = GameState::new(TriangularGrid::new(2, 4).unwrap());
        let mut ms = MovementSystem::new();
        ms.handle(&mut state, SemanticKey::Forward).unwrap();
        assert_eq!(
            ms.handle(&mut state, SemanticKey::TurnRight),
            Err(ActionError::Boundary { side: Side::Left })
        );
        assert_eq!(state.turn(), 0);
        assert_eq!(ms.phase(), Phase::Movement);
    }

    #[test]
    fn action_mapping_table() {
        let mut ms = MovementSystem::new();
        assert_eq!(ms.action_for(SemanticKey::Forward), None);
        assert_eq!(
            ms.action_for(SemanticKey::TurnLeft),
            Some(PlayerAction::Rotate(Rotation::CounterClockwise))
        );
        ms.set_phase(Phase::Movement);
        assert_eq!(
            ms.action_for(SemanticKey::TurnRight),
            Some(PlayerAction::Move(MoveDirection::ForwardRight))
        );
    }
}
