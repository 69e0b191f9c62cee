/// Keyboard input.
///
/// The game is turn-based, so only fresh presses matter: every Press event
/// becomes at most one `Command`. Repeats and releases are ignored, which
/// keeps a held arrow key from burning several turns.
///
///   ↑ / W      →  Forward   (MOVEMENT phase)
///   ↓ / S      →  Backward  (ROTATION phase)
///   ← / A      →  Turn left
///   → / D      →  Turn right
///   R          →  New maze
///   M          →  Next map from the maps directory
///   X          →  Export map
///   F5-F8      →  Save slot 1-4
///   F9-F12     →  Load slot 1-4
///   Esc / Q    →  Quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::movement::SemanticKey;

/// Everything the front-end can be asked to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Key(SemanticKey),
    Regenerate,
    NextMap,
    Export,
    Save(u8),
    Load(u8),
    Quit,
}

pub struct InputState {
    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Wait up to `timeout` for input, then drain everything pending.
    pub fn drain_events(&mut self, timeout: Duration) {
        self.raw_events.clear();

        let mut wait = timeout;
        while poll(wait).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
            }
            wait = Duration::ZERO;
        }
    }

    /// Commands from this frame's presses, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.raw_events.iter().filter_map(command_for).collect()
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Map one key event to a command. Only presses count.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let cmd = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::Key(SemanticKey::Forward),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::Key(SemanticKey::Backward),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::Key(SemanticKey::TurnLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Command::Key(SemanticKey::TurnRight),
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Regenerate,
        KeyCode::Char('m') | KeyCode::Char('M') => Command::NextMap,
        KeyCode::Char('x') | KeyCode::Char('X') => Command::Export,
        KeyCode::F(n @ 5..=8) => Command::Save(n - 4),
        KeyCode::F(n @ 9..=12) => Command::Load(n - 8),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}
