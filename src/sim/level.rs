/// Map files on disk.
///
/// ## Sources:
///   1. `map_file` from config, loaded at startup
///   2. `maps/` directory (individual `.tmap` files), cycled in name order
///   3. Built-in embedded map, when nothing else is playable
///
/// ## Map file format (`.tmap`):
///   ```text
///   # Map Name
///   m|e|e e|e|m e|m|e
///   m|e|e e|e|m e|e|e
///   ```
///
/// Lines starting with `#` are comments; the first one names the map.
/// Blank lines are ignored. Every other line is one grid row of
/// `left|right|third` tokens, `e` = empty, `m` = mirror.

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::domain::error::MapError;
use crate::domain::grid::TriangularGrid;

pub const MAP_EXTENSION: &str = "tmap";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: MapError,
    },
}

/// A parsed map ready to install.
#[derive(Clone, Debug)]
pub struct LoadedMap {
    pub name: String,
    pub grid: TriangularGrid,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse `.tmap` text. The name falls back to "Unnamed Maze".
pub fn parse_map_text(content: &str) -> Result<LoadedMap, MapError> {
    let grid = TriangularGrid::from_map(content)?;
    let name = content
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix('#'))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unnamed Maze".to_string());
    Ok(LoadedMap { name, grid })
}

pub fn load_map_file(path: &Path) -> Result<LoadedMap, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_map_text(&content).map_err(|source| LevelError::Map {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loaded map {:?} from {}", map.name, path.display());
    Ok(map)
}

/// Write `grid` as a `.tmap` file with a name header. Creates parent
/// directories as needed.
pub fn export_map_file(grid: &TriangularGrid, path: &Path, name: &str) -> Result<(), LevelError> {
    let io_err = |source| LevelError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = format!("# {}\n{}\n", name, grid.export_to_map());
    std::fs::write(path, content).map_err(io_err)?;
    info!("exported map {:?} to {}", name, path.display());
    Ok(())
}

/// `.tmap` files in `dir`, sorted by file name. Missing dir = empty list.
pub fn scan_maps(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };
    let mut maps: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == MAP_EXTENSION))
        .collect();
    maps.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    maps
}

/// The map after `current` in `dir`, wrapping to the first. With no
/// current map (or one no longer listed) the first map is picked.
pub fn next_map_in(dir: &Path, current: Option<&Path>) -> Option<PathBuf> {
    let maps = scan_maps(dir);
    let next = current
        .and_then(|cur| maps.iter().position(|p| p == cur))
        .map_or(0, |i| (i + 1) % maps.len());
    maps.get(next).cloned()
}

/// First unused `maze_NNN.tmap` in `dir`.
pub fn next_export_path(dir: &Path) -> PathBuf {
    (1..)
        .map(|n| dir.join(format!("maze_{n:03}.{MAP_EXTENSION}")))
        .find(|p| !p.exists())
        .unwrap_or_else(|| dir.join(format!("maze.{MAP_EXTENSION}")))
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback map
// ══════════════════════════════════════════════════════════════

const BUILTIN_MAP: &str = "\
# Prism Hall
m|e|e e|e|m e|m|e m|e|m e|e|e e|e|m e|e|m e|m|m
m|e|e e|e|m e|e|e e|m|e m|e|e e|m|e m|e|m e|e|e
m|e|e e|m|m m|e|e e|e|e e|e|e e|e|e e|e|m e|m|e
m|e|e e|e|m e|m|e m|e|m e|e|e e|e|m e|e|m e|m|m
";

pub fn builtin_map() -> Result<LoadedMap, MapError> {
    parse_map_text(BUILTIN_MAP)
}
