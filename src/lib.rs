/// Triangular-grid maze: a player steps between mirror-walled triangles
/// while an enemy hunts them with A* over the pose graph.

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
