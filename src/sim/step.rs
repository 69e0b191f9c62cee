/// The turn function: applies one player action and answers it.
///
/// Processing order:
///   1. Game-over guard (ignored input, no events)
///   2. Player action (rotate or move); a refused action ends here
///   3. Turn counter += 1
///   4. Collision check (player walked into the enemy)
///   5. Enemy pursuit step (first node of the A* path)
///   6. Collision check (enemy caught the player)

use log::debug;

use crate::domain::entity::{CharacterKind, MoveDirection, Rotation};
use crate::domain::error::ActionError;
use super::event::GameEvent;
use super::world::GameState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerAction {
    Rotate(Rotation),
    Move(MoveDirection),
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Run one turn. An `Err` means the action was refused: nothing changed and
/// no turn was consumed.
pub fn take_turn(state: &mut GameState, action: PlayerAction) -> Result<Vec<GameEvent>, ActionError> {
    if state.is_game_over() {
        return Ok(vec![]);
    }

    let mut events = Vec::new();
    match action {
        PlayerAction::Rotate(rotation) => {
            let to = state.rotate_character(CharacterKind::Player, rotation)?;
            events.push(GameEvent::PlayerRotated { to });
        }
        PlayerAction::Move(direction) => {
            let to = state.move_character(CharacterKind::Player, direction)?;
            events.push(GameEvent::PlayerMoved { to });
        }
    }

    state.advance_turn();
    debug!("turn {}: {:?}", state.turn(), action);

    if resolve_collision(state, &mut events) {
        return Ok(events);
    }

    match state.enemy_pursuit_step() {
        Some(to) => events.push(GameEvent::EnemyMoved { to }),
        None => events.push(GameEvent::EnemyWaiting),
    }

    resolve_collision(state, &mut events);
    Ok(events)
}

fn resolve_collision(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if state.check_collision() {
        let p = state.player();
        events.push(GameEvent::Collision { row: p.row, col: p.col });
        true
    } else {
        false
    }
}
