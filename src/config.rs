/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sim::world::GridParams;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub gamepad: GamepadConfig,
    pub maps_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,          // triangles per row
    pub mirror_density: f64,  // fraction of internal edges kept as mirrors
    pub seed: Option<String>,
    pub map_file: Option<PathBuf>,
}

impl GridConfig {
    pub fn params(&self) -> GridParams {
        GridParams {
            rows: self.rows,
            cols: self.cols,
            mirror_density: self.mirror_density,
            seed: self.seed.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub turn_left: Vec<String>,
    pub turn_right: Vec<String>,
    pub regenerate: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_rows")]
    rows: usize,
    #[serde(default = "default_cols")]
    cols: usize,
    #[serde(default = "default_mirror_density")]
    mirror_density: f64,
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    map_file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_forward")]
    forward: Vec<String>,
    #[serde(default = "default_backward")]
    backward: Vec<String>,
    #[serde(default = "default_turn_left")]
    turn_left: Vec<String>,
    #[serde(default = "default_turn_right")]
    turn_right: Vec<String>,
    #[serde(default = "default_regenerate")]
    regenerate: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
}

// ── Defaults ──

fn default_rows() -> usize { 6 }
fn default_cols() -> usize { 12 }
fn default_mirror_density() -> f64 { 0.6 }  // clamped to the feasible band at generation

fn default_forward() -> Vec<String> { vec!["Y".into()] }
fn default_backward() -> Vec<String> { vec!["A".into()] }
fn default_turn_left() -> Vec<String> { vec!["L1".into(), "X".into()] }
fn default_turn_right() -> Vec<String> { vec!["R1".into(), "B".into()] }
fn default_regenerate() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_maps_dir() -> String { "maps".into() }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            rows: default_rows(),
            cols: default_cols(),
            mirror_density: default_mirror_density(),
            seed: None,
            map_file: None,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            forward: default_forward(),
            backward: default_backward(),
            turn_left: default_turn_left(),
            turn_right: default_turn_right(),
            regenerate: default_regenerate(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            maps_dir: default_maps_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse config text directly (no directory search).
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let maps_dir = resolve_dir(&toml_cfg.general.maps_dir, search_dirs);
        let map_file = toml_cfg.grid.map_file.as_deref().map(|f| {
            let path = PathBuf::from(f);
            if path.is_absolute() || path.exists() {
                path
            } else {
                search_dirs.iter()
                    .map(|d| d.join(f))
                    .find(|p| p.is_file())
                    .unwrap_or(path)
            }
        });

        GameConfig {
            grid: GridConfig {
                rows: toml_cfg.grid.rows,
                cols: toml_cfg.grid.cols,
                mirror_density: toml_cfg.grid.mirror_density,
                seed: toml_cfg.grid.seed.filter(|s| !s.is_empty()),
                map_file,
            },
            gamepad: GamepadConfig {
                forward: toml_cfg.gamepad.forward,
                backward: toml_cfg.gamepad.backward,
                turn_left: toml_cfg.gamepad.turn_left,
                turn_right: toml_cfg.gamepad.turn_right,
                regenerate: toml_cfg.gamepad.regenerate,
                quit: toml_cfg.gamepad.quit,
            },
            maps_dir,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

/// Absolute paths as-is; relative ones are looked up in the search dirs and
/// default to CWD-relative.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    if Path::new(dir).is_absolute() {
        return PathBuf::from(dir);
    }
    search_dirs.iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(dir))
}

/// Candidate directories to search: exe dir + CWD + XDG data (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/trimaze)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/trimaze");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        info!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

/// Writable directory for saves, exported maps and the log file.
/// Exe directory if writable, else `~/.local/share/trimaze`, else CWD.
pub fn data_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ won't be writable
            let test_path = parent.join(".write_test_trimaze");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/trimaze");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.grid.rows, 6);
        assert_eq!(cfg.grid.cols, 12);
        assert_eq!(cfg.grid.mirror_density, 0.6);
        assert_eq!(cfg.grid.seed, None);
        assert_eq!(cfg.grid.map_file, None);
        assert_eq!(cfg.maps_dir, PathBuf::from("maps"));
        assert_eq!(cfg.gamepad.turn_left, vec!["L1".to_string(), "X".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[grid]\nrows = 3\nseed = \"abc\"\n\n[gamepad]\nquit = [\"Mode\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.grid.rows, 3);
        assert_eq!(cfg.grid.cols, 12);
        assert_eq!(cfg.grid.seed.as_deref(), Some("abc"));
        assert_eq!(cfg.gamepad.quit, vec!["Mode".to_string()]);
        assert_eq!(cfg.gamepad.forward, vec!["Y".to_string()]);
    }

    #[test]
    fn empty_seed_means_random() {
        let cfg = GameConfig::from_toml_str("[grid]\nseed = \"\"\n").unwrap();
        assert_eq!(cfg.grid.seed, None);
    }

    #[test]
    fn params_carry_grid_settings() {
        let cfg = GameConfig::from_toml_str("[grid]\nrows = 2\ncols = 5\nmirror_density = 0.1\n").unwrap();
        let p = cfg.grid.params();
        assert_eq!((p.rows, p.cols), (2, 5));
        assert_eq!(p.mirror_density, 0.1);
    }

    #[test]
    fn bad_types_are_rejected() {
        assert!(GameConfig::from_toml_str("[grid]\nrows = \"many\"\n").is_err());
    }
}
