/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Forward / Backward / Turn left / Turn right
///   Y                     →  Forward (MOVEMENT phase)
///   A                     →  Backward (ROTATION phase)
///   L1 / X                →  Turn left
///   R1 / B                →  Turn right
///   Start                 →  New maze
///   Select                →  Quit
///
/// Only fresh presses produce commands; holding a button does nothing more.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::movement::SemanticKey;
use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// D-pad and stick directions share one slot each.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    fn key(self) -> SemanticKey {
        match self {
            Dir::Up => SemanticKey::Forward,
            Dir::Down => SemanticKey::Backward,
            Dir::Left => SemanticKey::TurnLeft,
            Dir::Right => SemanticKey::TurnRight,
        }
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    forward: Vec<Btn>,
    backward: Vec<Btn>,
    turn_left: Vec<Btn>,
    turn_right: Vec<Btn>,
    regenerate: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            forward:    vec![Btn::Y],
            backward:   vec![Btn::A],
            turn_left:  vec![Btn::L1, Btn::X],
            turn_right: vec![Btn::R1, Btn::B],
            regenerate: vec![Btn::Start],
            quit:       vec![Btn::Select],
        }
    }
}

impl ActionMap {
    fn command_for(&self, btn: Btn) -> Option<Command> {
        if self.forward.contains(&btn) {
            Some(Command::Key(SemanticKey::Forward))
        } else if self.backward.contains(&btn) {
            Some(Command::Key(SemanticKey::Backward))
        } else if self.turn_left.contains(&btn) {
            Some(Command::Key(SemanticKey::TurnLeft))
        } else if self.turn_right.contains(&btn) {
            Some(Command::Key(SemanticKey::TurnRight))
        } else if self.regenerate.contains(&btn) {
            Some(Command::Regenerate)
        } else if self.quit.contains(&btn) {
            Some(Command::Quit)
        } else {
            None
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // Stick position, reduced to one held direction
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<Dir>,

    // Fresh presses since the last update
    pressed: Vec<Btn>,
    pressed_dirs: Vec<Dir>,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        let mut pad = Self::offline();
        pad.attach();
        pad
    }

    /// No backend: never produces commands until `attach` succeeds.
    fn offline() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dir: None,
            pressed: Vec::with_capacity(4),
            pressed_dirs: Vec::with_capacity(4),
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    #[cfg(feature = "gamepad")]
    fn attach(&mut self) {
        match Gilrs::new() {
            Ok(g) => {
                self.connected = g.gamepads().next().is_some();
                self.gilrs = Some(g);
            }
            Err(e) => log::warn!("gamepad support unavailable: {e}"),
        }
    }

    #[cfg(not(feature = "gamepad"))]
    fn attach(&mut self) {}

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let btns = parse_list(names);
            if !btns.is_empty() { *slot = btns; }
        }
        let map = &mut self.action_map;
        apply(&mut map.forward, &cfg.forward);
        apply(&mut map.backward, &cfg.backward);
        apply(&mut map.turn_left, &cfg.turn_left);
        apply(&mut map.turn_right, &cfg.turn_right);
        apply(&mut map.regenerate, &cfg.regenerate);
        apply(&mut map.quit, &cfg.quit);
    }

    pub fn update(&mut self) {
        self.pressed.clear();
        self.pressed_dirs.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// Commands from this frame's presses: directions first, then buttons.
    pub fn commands(&self) -> Vec<Command> {
        let dirs = self.pressed_dirs.iter().map(|d| Command::Key(d.key()));
        let btns = self.pressed.iter().filter_map(|&b| self.action_map.command_for(b));
        dirs.chain(btns).collect()
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press_button(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    self.stick_dir = None;
                }
                _ => {}
            }
        }

        // Stick counts as a press when it leaves the dead zone in a new direction
        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir.is_some() && dir != self.stick_dir {
            if let Some(d) = dir { self.pressed_dirs.push(d); }
        }
        self.stick_dir = dir;
    }

    #[cfg(feature = "gamepad")]
    fn press_button(&mut self, gilrs_btn: Button) {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => { self.pressed_dirs.push(Dir::Up); return; }
            Button::DPadDown  => { self.pressed_dirs.push(Dir::Down); return; }
            Button::DPadLeft  => { self.pressed_dirs.push(Dir::Left); return; }
            Button::DPadRight => { self.pressed_dirs.push(Dir::Right); return; }
            _ => {}
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.pressed.push(btn);
        }
    }
}

/// Dominant stick direction outside the dead zone.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Dir> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    if x.abs() >= y.abs() {
        Some(if x < 0.0 { Dir::Left } else { Dir::Right })
    } else {
        Some(if y > 0.0 { Dir::Up } else { Dir::Down })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_parse() {
        assert_eq!(Btn::from_name("lb"), Some(Btn::L1));
        assert_eq!(Btn::from_name("North"), Some(Btn::Y));
        assert_eq!(Btn::from_name("Turbo"), None);
    }

    #[test]
    fn default_mapping() {
        let map = ActionMap::default();
        assert_eq!(map.command_for(Btn::Y), Some(Command::Key(SemanticKey::Forward)));
        assert_eq!(map.command_for(Btn::X), Some(Command::Key(SemanticKey::TurnLeft)));
        assert_eq!(map.command_for(Btn::Select), Some(Command::Quit));
        assert_eq!(map.command_for(Btn::R2), None);
    }

    #[test]
    fn config_overrides_and_ignores_unknown_names() {
        let mut pad = GamepadState::offline();
        let cfg = GamepadConfig {
            forward: vec!["R2".into()],
            backward: vec!["nonsense".into()],
            turn_left: vec!["L1".into()],
            turn_right: vec!["R1".into()],
            regenerate: vec!["Start".into()],
            quit: vec!["Select".into()],
        };
        pad.load_button_config(&cfg);
        assert_eq!(pad.action_map.command_for(Btn::R2), Some(Command::Key(SemanticKey::Forward)));
        // Unparseable list keeps the default.
        assert_eq!(pad.action_map.command_for(Btn::A), Some(Command::Key(SemanticKey::Backward)));
    }

    #[test]
    fn stick_picks_dominant_axis() {
        assert_eq!(stick_direction(0.1, 0.2), None);
        assert_eq!(stick_direction(-0.9, 0.3), Some(Dir::Left));
        assert_eq!(stick_direction(0.2, 0.8), Some(Dir::Up));
        assert_eq!(stick_direction(0.0, -0.7), Some(Dir::Down));
    }

    #[test]
    fn presses_become_commands() {
        let mut pad = GamepadState::offline();
        pad.pressed_dirs.push(Dir::Right);
        pad.pressed.push(Btn::Start);
        assert_eq!(
            pad.commands(),
            vec![Command::Key(SemanticKey::TurnRight), Command::Regenerate]
        );
    }
}
