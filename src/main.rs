/// Entry point and game loop.

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};

use trimaze::config::{self, GameConfig};
use trimaze::sim::level::{
    builtin_map, export_map_file, load_map_file, next_export_path, next_map_in,
};
use trimaze::sim::movement::MovementSystem;
use trimaze::sim::save;
use trimaze::sim::world::GameState;
use trimaze::ui::gamepad::GamepadState;
use trimaze::ui::input::{Command, InputState};
use trimaze::ui::renderer::{Renderer, View};

/// How long one loop iteration waits for input.
const INPUT_WAIT: Duration = Duration::from_millis(50);

/// The running game plus what the HUD needs to describe it.
struct Session {
    state: GameState,
    movement: MovementSystem,
    title: String,
    message: String,
    /// Map file the session was loaded from, for cycling the maps directory.
    map_path: Option<PathBuf>,
}

impl Session {
    fn new(state: GameState, title: String) -> Self {
        Session {
            state,
            movement: MovementSystem::new(),
            title,
            message: String::new(),
            map_path: None,
        }
    }

    fn seed_title(state: &GameState) -> String {
        match state.seed() {
            Some(seed) => format!("seed {seed}"),
            None => "Loaded maze".to_string(),
        }
    }
}

fn main() {
    init_logging();
    let config = GameConfig::load();

    let mut session = match initial_session(&config) {
        Some(s) => s,
        None => {
            eprintln!("No playable maze: see trimaze.log for details");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Trimaze!");
    println!("Turns taken: {}", session.state.turn());
}

/// Log to `trimaze.log` in the data directory; the terminal belongs to the
/// game. `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let path = config::data_dir().join("trimaze.log");
    let Ok(file) = File::create(&path) else { return };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

/// Configured map file first, then a generated grid, then the built-in map.
fn initial_session(config: &GameConfig) -> Option<Session> {
    if let Some(path) = &config.grid.map_file {
        match load_map_file(path) {
            Ok(map) => {
                let mut session = Session::new(GameState::new(map.grid), map.name);
                session.map_path = Some(path.clone());
                return Some(session);
            }
            Err(e) => warn!("map file unusable, generating instead: {e}"),
        }
    }

    match GameState::generate(&config.grid.params()) {
        Ok(state) => {
            let title = Session::seed_title(&state);
            return Some(Session::new(state, title));
        }
        Err(e) => warn!("generation failed, using built-in map: {e}"),
    }

    match builtin_map() {
        Ok(map) => Some(Session::new(GameState::new(map.grid), map.name)),
        Err(e) => {
            error!("built-in map is broken: {e}");
            None
        }
    }
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    loop {
        let view = View {
            state: &session.state,
            phase: session.movement.phase(),
            title: &session.title,
            message: &session.message,
        };
        renderer.render(&view)?;

        kb.drain_events(INPUT_WAIT);
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let commands = kb.commands().into_iter().chain(gp.commands());
        for cmd in commands {
            if cmd == Command::Quit {
                return Ok(());
            }
            dispatch(session, cmd, config);
        }
    }

    Ok(())
}

fn dispatch(session: &mut Session, cmd: Command, config: &GameConfig) {
    match cmd {
        Command::Key(key) => match session.movement.handle(&mut session.state, key) {
            Ok(events) => {
                if let Some(last) = events.last() {
                    session.message = events
                        .iter()
                        .map(|e| e.describe())
                        .collect::<Vec<_>>()
                        .join(" · ");
                    info!("turn {}: {}", session.state.turn(), last.describe());
                }
            }
            Err(e) => session.message = format!("Blocked: {e}"),
        },
        Command::Regenerate => {
            let mut params = config.grid.params();
            params.seed = None;
            match GameState::generate(&params) {
                Ok(state) => {
                    session.title = Session::seed_title(&state);
                    session.state = state;
                    session.movement = MovementSystem::new();
                    session.map_path = None;
                    session.message = "New maze".to_string();
                }
                Err(e) => session.message = format!("Generation failed: {e}"),
            }
        }
        Command::NextMap => {
            let Some(path) = next_map_in(&config.maps_dir, session.map_path.as_deref()) else {
                session.message = format!("No .tmap files in {}", config.maps_dir.display());
                return;
            };
            match load_map_file(&path) {
                Ok(map) => {
                    session.message = format!("Loaded {}", map.name);
                    session.state = GameState::new(map.grid);
                    session.movement = MovementSystem::new();
                    session.title = map.name;
                }
                Err(e) => session.message = format!("Load failed: {e}"),
            }
            session.map_path = Some(path);
        }
        Command::Export => {
            let path = next_export_path(&config.maps_dir);
            match export_map_file(session.state.grid(), &path, &session.title) {
                Ok(()) => session.message = format!("Exported {}", path.display()),
                Err(e) => session.message = format!("Export failed: {e}"),
            }
        }
        Command::Save(slot) => {
            let snap = save::capture_snapshot(&session.state, &session.movement);
            session.message = match save::save_slot(slot, &snap) {
                Ok(()) => format!("Saved slot {} (turn {})", slot, snap.turn),
                Err(e) => format!("Save failed: {e}"),
            };
        }
        Command::Load(slot) => {
            if !save::has_slot(slot) {
                session.message = format!("Slot {slot} is empty");
                return;
            }
            match save::load_slot(slot).and_then(|snap| save::restore_snapshot(&snap)) {
                Ok((state, movement)) => {
                    session.title = Session::seed_title(&state);
                    session.map_path = None;
                    session.state = state;
                    session.movement = movement;
                    session.message = format!("Loaded slot {slot}");
                }
                Err(e) => session.message = format!("Load failed: {e}"),
            }
        }
        Command::Quit => {}
    }
}
