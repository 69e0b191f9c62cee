/// Save and load sessions: 4 slot system with full snapshots.
///
/// A snapshot stores everything needed to resume exactly: the grid as map
/// text, both character poses, the turn counter, the game-over flag, the
/// input phase and the seed (when the grid was generated).
///
/// ## File format:
///   TOML, one file per slot (`save_1.toml` .. `save_4.toml`) in the data
///   directory.
///
/// On restore the grid is rebuilt from the map text, so the derived graph
/// is rebuilt too.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::domain::error::MapError;
use crate::domain::graph::GraphNode;
use crate::domain::grid::TriangularGrid;
use super::movement::{MovementSystem, Phase};
use super::world::GameState;

pub const SLOT_COUNT: u8 = 4;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save slot {0} does not exist (use 1-4)")]
    BadSlot(u8),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode snapshot: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("could not decode snapshot: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("snapshot map is invalid: {0}")]
    Map(#[from] MapError),
    #[error("snapshot is inconsistent: {0}")]
    InvalidSnapshot(String),
}

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: u32,
    pub game_over: bool,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    pub map: String,
    pub player: GraphNode,
    pub enemy: GraphNode,
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn slot_filename(slot: u8) -> String {
    format!("save_{}.toml", slot)
}

pub fn slot_path(dir: &Path, slot: u8) -> Result<PathBuf, SaveError> {
    if !(1..=SLOT_COUNT).contains(&slot) {
        return Err(SaveError::BadSlot(slot));
    }
    Ok(dir.join(slot_filename(slot)))
}

// ══════════════════════════════════════════════════════════════
// Snapshot capture / restore (GameState ↔ Snapshot)
// ══════════════════════════════════════════════════════════════

pub fn capture_snapshot(state: &GameState, movement: &MovementSystem) -> Snapshot {
    Snapshot {
        turn: state.turn(),
        game_over: state.is_game_over(),
        phase: movement.phase(),
        seed: state.seed().map(str::to_owned),
        map: state.export_map(),
        player: state.player().pose(),
        enemy: state.enemy().pose(),
    }
}

/// Rebuild a session from a snapshot. Fails without touching anything if
/// the map is malformed or a character is off the grid.
pub fn restore_snapshot(snap: &Snapshot) -> Result<(GameState, MovementSystem), SaveError> {
    let grid = TriangularGrid::from_map(&snap.map)?;
    for (who, node) in [("player", &snap.player), ("enemy", &snap.enemy)] {
        if !grid.contains(node.row, node.col) {
            return Err(SaveError::InvalidSnapshot(format!(
                "{who} at ({}, {}) is outside the grid",
                node.row, node.col
            )));
        }
    }

    let mut state = GameState::new(grid);
    state.restore(snap.player, snap.enemy, snap.turn, snap.game_over, snap.seed.clone());
    let mut movement = MovementSystem::new();
    movement.set_phase(snap.phase);
    Ok((state, movement))
}

// ══════════════════════════════════════════════════════════════
// Slot operations (F5-F12)
// ══════════════════════════════════════════════════════════════

pub fn save_slot_in(dir: &Path, slot: u8, snap: &Snapshot) -> Result<(), SaveError> {
    let path = slot_path(dir, slot)?;
    let content = toml::to_string(snap)?;
    std::fs::write(&path, content).map_err(|source| SaveError::Io { path: path.clone(), source })?;
    info!("saved turn {} to {}", snap.turn, path.display());
    Ok(())
}

pub fn load_slot_in(dir: &Path, slot: u8) -> Result<Snapshot, SaveError> {
    let path = slot_path(dir, slot)?;
    let content = std::fs::read_to_string(&path)
        .map_err(|source| SaveError::Io { path: path.clone(), source })?;
    let snap: Snapshot = toml::from_str(&content)?;
    info!("loaded turn {} from {}", snap.turn, path.display());
    Ok(snap)
}

/// Save to a numbered slot (1-4) in the data directory.
pub fn save_slot(slot: u8, snap: &Snapshot) -> Result<(), SaveError> {
    save_slot_in(&config::data_dir(), slot, snap)
}

/// Load from a numbered slot (1-4) in the data directory.
pub fn load_slot(slot: u8) -> Result<Snapshot, SaveError> {
    load_slot_in(&config::data_dir(), slot)
}

/// Check if a numbered slot has data.
pub fn has_slot(slot: u8) -> bool {
    slot_path(&config::data_dir(), slot).is_ok_and(|p| p.exists())
}
