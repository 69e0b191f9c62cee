/// GameState: one running session.
///
/// ## Ownership
///
/// The state owns the grid, the graph derived from it and both characters.
/// Nothing is global: callers construct a `GameState` and pass it around.
///
/// ## Derived graph
///
/// `graph` is rebuilt from `grid` every time the grid is replaced. Side
/// states never change mid-session, so the cache stays valid until then.
///
/// ## Game over
///
/// Once `game_over` is set, rotations, moves and pursuit steps are ignored.
/// They return the current pose and change nothing.

use log::{debug, info, warn};

use crate::domain::ai;
use crate::domain::entity::{Character, CharacterKind, MoveDirection, Rotation};
use crate::domain::error::{ActionError, GridError, MapError};
use crate::domain::graph::{GraphNode, GridGraph};
use crate::domain::grid::TriangularGrid;
use crate::domain::side::Side;

/// Parameters for procedural generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GridParams {
    pub rows: usize,
    pub cols: usize,
    pub mirror_density: f64,
    pub seed: Option<String>,
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams { rows: 6, cols: 12, mirror_density: 0.6, seed: None }
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    grid: TriangularGrid,
    graph: GridGraph,
    player: Character,
    enemy: Character,
    turn_counter: u32,
    game_over: bool,
    /// Seed that reproduces the current grid; `None` for loaded maps.
    seed: Option<String>,
}

// ── Construction ──

impl GameState {
    pub fn new(grid: TriangularGrid) -> Self {
        let mut state = GameState {
            grid: TriangularGrid::default(),
            graph: GridGraph::default(),
            player: Character::new(CharacterKind::Player, 0, 0, Side::Left),
            enemy: Character::new(CharacterKind::Enemy, 0, 0, Side::Right),
            turn_counter: 0,
            game_over: false,
            seed: None,
        };
        state.set_grid(grid);
        state
    }

    /// Generate a grid and start a session on it.
    pub fn generate(params: &GridParams) -> Result<Self, GridError> {
        let mut state = GameState::new(TriangularGrid::default());
        state.initialize_grid(params)?;
        Ok(state)
    }

    /// Install `grid`, rebuild the graph and reset the session: player at
    /// `(0, 0)` facing left, enemy at the last triangle facing right.
    pub fn set_grid(&mut self, grid: TriangularGrid) {
        self.graph = GridGraph::build(&grid);
        let (last_row, last_col) = grid.last_coords();
        self.grid = grid;
        self.player = Character::new(CharacterKind::Player, 0, 0, Side::Left);
        self.enemy = Character::new(CharacterKind::Enemy, last_row, last_col, Side::Right);
        self.turn_counter = 0;
        self.game_over = false;
        self.seed = None;
        debug!(
            "graph rebuilt: {} nodes, {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
    }

    /// Generate a fresh grid from `params` and reset the session.
    pub fn initialize_grid(&mut self, params: &GridParams) -> Result<(), GridError> {
        let generated = TriangularGrid::generate_random_grid(
            params.rows,
            params.cols,
            params.mirror_density,
            params.seed.as_deref(),
        )?;
        self.set_grid(generated.grid);
        self.seed = Some(generated.seed);
        Ok(())
    }

    /// Replace the grid from map text. On error the session is untouched.
    pub fn load_map(&mut self, text: &str) -> Result<(), MapError> {
        let grid = TriangularGrid::from_map(text)?;
        info!("loaded map: {} rows, {} triangles", grid.num_rows(), grid.triangle_count());
        self.set_grid(grid);
        Ok(())
    }

    pub fn export_map(&self) -> String {
        self.grid.export_to_map()
    }

    /// Reinstate saved poses and counters on the current grid.
    pub(crate) fn restore(
        &mut self,
        player: GraphNode,
        enemy: GraphNode,
        turn_counter: u32,
        game_over: bool,
        seed: Option<String>,
    ) {
        self.player.set_pose(player);
        self.enemy.set_pose(enemy);
        self.turn_counter = turn_counter;
        self.game_over = game_over;
        self.seed = seed;
    }
}

// ── Queries ──

impl GameState {
    pub fn grid(&self) -> &TriangularGrid {
        &self.grid
    }

    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    pub fn player(&self) -> &Character {
        &self.player
    }

    pub fn enemy(&self) -> &Character {
        &self.enemy
    }

    pub fn character(&self, kind: CharacterKind) -> &Character {
        match kind {
            CharacterKind::Player => &self.player,
            CharacterKind::Enemy => &self.enemy,
        }
    }

    fn character_mut(&mut self, kind: CharacterKind) -> &mut Character {
        match kind {
            CharacterKind::Player => &mut self.player,
            CharacterKind::Enemy => &mut self.enemy,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn_counter
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }
}

// ── Commands ──

impl GameState {
    /// Rotate a character in place. Does not advance the turn.
    pub fn rotate_character(
        &mut self,
        kind: CharacterKind,
        rotation: Rotation,
    ) -> Result<GraphNode, ActionError> {
        if self.game_over {
            return Ok(self.character(kind).pose());
        }
        let grid = &self.grid;
        let c = match kind {
            CharacterKind::Player => &mut self.player,
            CharacterKind::Enemy => &mut self.enemy,
        };
        c.rotate(grid, rotation)
    }

    /// Move a character through its faced side. Does not advance the turn.
    pub fn move_character(
        &mut self,
        kind: CharacterKind,
        direction: MoveDirection,
    ) -> Result<GraphNode, ActionError> {
        if self.game_over {
            return Ok(self.character(kind).pose());
        }
        let grid = &self.grid;
        let c = match kind {
            CharacterKind::Player => &mut self.player,
            CharacterKind::Enemy => &mut self.enemy,
        };
        c.move_forward(grid, direction)
    }

    /// Place a character directly, bypassing movement rules.
    pub fn teleport(&mut self, kind: CharacterKind, node: GraphNode) -> Result<(), ActionError> {
        if !self.grid.contains(node.row, node.col) {
            return Err(ActionError::OffGrid { row: node.row, col: node.col });
        }
        self.character_mut(kind).set_pose(node);
        Ok(())
    }

    pub(crate) fn advance_turn(&mut self) {
        self.turn_counter += 1;
    }

    /// Sets `game_over` when player and enemy share a triangle. Returns
    /// `true` only on the call that ends the game.
    pub fn check_collision(&mut self) -> bool {
        if self.game_over || !self.player.same_cell(&self.enemy) {
            return false;
        }
        self.game_over = true;
        info!(
            "caught at ({}, {}) on turn {}",
            self.player.row, self.player.col, self.turn_counter
        );
        true
    }

    /// Up to `ai::PATH_LOOKAHEAD` nodes toward `end`, excluding `start`.
    /// Empty when no path exists.
    pub fn find_path_astar(&self, start: &GraphNode, end: &GraphNode) -> Vec<GraphNode> {
        ai::pursuit_steps(&self.graph, start, end)
    }

    /// Move the enemy one node along its path to the player. Returns the new
    /// pose, or `None` when the enemy waits.
    pub fn enemy_pursuit_step(&mut self) -> Option<GraphNode> {
        if self.game_over {
            return None;
        }
        let from = self.enemy.pose();
        let goal = self.player.pose();
        let path = self.find_path_astar(&from, &goal);
        match path.first() {
            Some(&next) => {
                self.enemy.set_pose(next);
                debug!("enemy {from} -> {next}");
                Some(next)
            }
            None => {
                if from != goal {
                    warn!("no path from {from} to {goal}; enemy waits");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::side::SideState;

    fn open_state(rows: usize, cols: usize) -> GameState {
        GameState::new(TriangularGrid::new(rows, cols).unwrap())
    }

    #[test]
    fn starting_positions() {
        let state = open_state(4, 8);
        assert_eq!(state.player().pose(), GraphNode::new(0, 0, Side::Left));
        assert_eq!(state.enemy().pose(), GraphNode::new(3, 7, Side::Right));
        assert_eq!(state.turn(), 0);
        assert!(!state.is_game_over());
        assert_eq!(state.graph().node_count(), 96);
    }

    #[test]
    fn generate_records_seed() {
        let params = GridParams { rows: 3, cols: 5, mirror_density: 0.3, seed: Some("s1".into()) };
        let state = GameState::generate(&params).unwrap();
        assert_eq!(state.seed(), Some("s1"));
        assert_eq!(state.grid().triangle_count(), 15);
        assert_eq!(state.enemy().pose(), GraphNode::new(2, 4, Side::Right));
    }

    #[test]
    fn generate_rejects_empty_dimensions() {
        let params = GridParams { rows: 0, ..GridParams::default() };
        assert!(GameState::generate(&params).is_err());
    }

    #[test]
    fn rotate_and_move_do_not_count_turns() {
        let mut state = open_state(1, 2);
        state.rotate_character(CharacterKind::Player, Rotation::Clockwise).unwrap();
        assert_eq!(state.player().orientation, Side::Right);
        state.move_character(CharacterKind::Player, MoveDirection::ForwardLeft).unwrap();
        assert_eq!(state.player().pose(), GraphNode::new(0, 1, Side::Third));
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn blocked_move_reports_error() {
        let mut grid = TriangularGrid::new(1, 2).unwrap();
        grid.set_side_state(0, 0, Side::Right, SideState::Mirror).unwrap();
        let mut state = GameState::new(grid);
        state.rotate_character(CharacterKind::Player, Rotation::Clockwise).unwrap();
        assert_eq!(
            state.move_character(CharacterKind::Player, MoveDirection::ForwardRight),
            Err(ActionError::Mirror { side: Side::Right })
        );
        assert_eq!(state.player().pose(), GraphNode::new(0, 0, Side::Right));
    }

    #[test]
    fn pursuit_closes_distance_on_open_grid() {
        let state = open_state(4, 8);
        let start = state.enemy().pose();
        let goal = state.player().pose();
        let path = state.find_path_astar(&start, &goal);
        assert!(!path.is_empty());
        assert!(path.len() <= ai::PATH_LOOKAHEAD);
        let last = path[path.len() - 1];
        assert!(last.manhattan(&goal) < start.manhattan(&goal));
    }

    #[test]
    fn pursuit_step_applies_first_node_only() {
        let mut state = open_state(4, 8);
        let path = state.find_path_astar(&state.enemy().pose(), &state.player().pose());
        let moved = state.enemy_pursuit_step();
        assert_eq!(moved, path.first().copied());
        assert_eq!(Some(state.enemy().pose()), moved);
    }

    #[test]
    fn unreachable_player_means_enemy_waits() {
        let mut grid = TriangularGrid::new(1, 4).unwrap();
        grid.set_side_state(0, 1, Side::Right, SideState::Mirror).unwrap();
        let mut state = GameState::new(grid);
        let before = state.enemy().pose();
        assert_eq!(state.enemy_pursuit_step(), None);
        assert_eq!(state.enemy().pose(), before);
    }

    #[test]
    fn collision_triggers_exactly_once() {
        let mut state = open_state(2, 4);
        state.teleport(CharacterKind::Enemy, GraphNode::new(0, 0, Side::Third)).unwrap();
        assert!(state.check_collision());
        assert!(state.is_game_over());
        assert!(!state.check_collision());
        assert!(!state.check_collision());
        assert!(state.is_game_over());
    }

    #[test]
    fn no_collision_in_different_cells() {
        let mut state = open_state(2, 4);
        assert!(!state.check_collision());
        assert!(!state.is_game_over());
    }

    #[test]
    fn game_over_freezes_positions() {
        let mut state = open_state(1, 4);
        state.teleport(CharacterKind::Enemy, GraphNode::new(0, 0, Side::Right)).unwrap();
        assert!(state.check_collision());
        let player = state.player().pose();
        let enemy = state.enemy().pose();
        assert_eq!(state.rotate_character(CharacterKind::Player, Rotation::Clockwise), Ok(player));
        assert_eq!(state.move_character(CharacterKind::Enemy, MoveDirection::ForwardLeft), Ok(enemy));
        assert_eq!(state.enemy_pursuit_step(), None);
        assert_eq!(state.player().pose(), player);
        assert_eq!(state.enemy().pose(), enemy);
    }

    #[test]
    fn teleport_off_grid_is_rejected() {
        let mut state = open_state(2, 2);
        assert!(state.teleport(CharacterKind::Player, GraphNode::new(2, 0, Side::Left)).is_err());
    }

    #[test]
    fn load_map_resets_session() {
        let mut state = open_state(2, 2);
        state.advance_turn();
        state.load_map("e|e|m e|m|e").unwrap();
        assert_eq!(state.turn(), 0);
        assert_eq!(state.enemy().pose(), GraphNode::new(0, 1, Side::Right));
        assert_eq!(state.export_map(), "e|e|m e|m|e");
        assert!(state.load_map("e|e").is_err());
        assert_eq!(state.export_map(), "e|e|m e|m|e");
    }
}
