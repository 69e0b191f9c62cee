/// TriangularGrid: owns every triangle of the maze.
///
/// ## Storage
///
/// Triangles live in one flat `Vec` (the arena). Row `r` occupies
/// `row_offsets[r] .. row_offsets[r] + row_lengths[r]`, so `(row, col)`
/// resolves to an index in O(1). Rows may have different lengths (maps can
/// be jagged); generated grids are rectangular.
///
/// ## Edge invariant
///
/// Side state belongs to the edge, not to one triangle's view of it. Every
/// mutator writes both halves: `set_side_state` on `(r, c, side)` also writes
/// `side.corresponding()` on the neighbor across `side`.
///
/// ## Map format
///
/// One line per row, whitespace-separated `L|R|T` tokens, each field `e`
/// (empty) or `m` (mirror). Lines starting with `#` are comments.

use std::collections::VecDeque;

use log::{debug, info, warn};
use rand::seq::SliceRandom;

use super::error::{GridError, MapError};
use super::side::{Side, SideState};
use super::rng::SeededRng;
use super::triangle::Triangle;

/// An internal edge, named from the lower-indexed triangle's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Edge {
    pub row: usize,
    pub col: usize,
    pub side: Side,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriangularGrid {
    triangles: Vec<Triangle>,
    row_offsets: Vec<usize>,
    row_lengths: Vec<usize>,
}

// ══════════════════════════════════════════════════════════════
// Construction
// ══════════════════════════════════════════════════════════════

impl TriangularGrid {
    /// Blank rectangular grid, every side `Empty`.
    pub fn new(num_rows: usize, triangles_per_row: usize) -> Result<Self, GridError> {
        if num_rows == 0 || triangles_per_row == 0 {
            return Err(GridError::EmptyDimensions { rows: num_rows, cols: triangles_per_row });
        }
        Ok(Self::with_row_lengths(&vec![triangles_per_row; num_rows]))
    }

    /// Replace this grid with a blank `num_rows x triangles_per_row` one.
    pub fn initialize(&mut self, num_rows: usize, triangles_per_row: usize) -> Result<(), GridError> {
        *self = Self::new(num_rows, triangles_per_row)?;
        Ok(())
    }

    /// Build a (possibly jagged) grid with all sides `Empty` and wire the
    /// neighbor indices. Callers guarantee every length is non-zero.
    fn with_row_lengths(lengths: &[usize]) -> Self {
        let mut triangles = Vec::with_capacity(lengths.iter().sum());
        let mut row_offsets = Vec::with_capacity(lengths.len());
        for (row, &len) in lengths.iter().enumerate() {
            row_offsets.push(triangles.len());
            for col in 0..len {
                triangles.push(Triangle::new(row, col));
            }
        }
        let mut grid = TriangularGrid {
            triangles,
            row_offsets,
            row_lengths: lengths.to_vec(),
        };
        grid.wire_neighbors();
        grid
    }

    fn wire_neighbors(&mut self) {
        for i in 0..self.triangles.len() {
            for side in Side::ALL {
                let across = self.triangles[i]
                    .adjacent_coords(side)
                    .filter(|&(r, c)| self.contains(r, c));
                self.triangles[i].set_neighbor(side, across);
            }
        }
    }

    /// Parse map text into a new grid. Nothing is built unless the whole
    /// text parses. Afterwards every edge is reconciled: if either half is a
    /// mirror, both become mirrors.
    pub fn from_map(text: &str) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<[SideState; 3]>> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = rows.len();
            let mut parsed = Vec::new();
            for (col, token) in line.split_whitespace().enumerate() {
                let fields: Vec<&str> = token.split('|').collect();
                if fields.len() != 3 {
                    return Err(MapError::FieldCount { row, col, found: fields.len() });
                }
                let mut sides = [SideState::Empty; 3];
                for (slot, field) in sides.iter_mut().zip(&fields) {
                    *slot = SideState::from_token(field).map_err(|_| MapError::InvalidSideState {
                        row,
                        col,
                        token: token.to_string(),
                    })?;
                }
                parsed.push(sides);
            }
            rows.push(parsed);
        }

        if rows.is_empty() {
            return Err(MapError::Empty);
        }

        let lengths: Vec<usize> = rows.iter().map(Vec::len).collect();
        let mut grid = Self::with_row_lengths(&lengths);
        for (row, parsed) in rows.iter().enumerate() {
            for (col, sides) in parsed.iter().enumerate() {
                let idx = grid.row_offsets[row] + col;
                for side in Side::ALL {
                    grid.triangles[idx].set_side_local(side, sides[side.index()]);
                }
            }
        }
        grid.reconcile_edges();
        Ok(grid)
    }

    /// Load map text in place. On error the current grid is left untouched.
    pub fn initialize_from_map(&mut self, text: &str) -> Result<(), MapError> {
        *self = Self::from_map(text)?;
        Ok(())
    }

    /// "Wall wins": an edge that is a mirror on either half becomes a mirror
    /// on both.
    fn reconcile_edges(&mut self) {
        for edge in self.internal_edges() {
            let Some(mine) = self.side_state(edge.row, edge.col, edge.side) else { continue };
            let Some((nr, nc)) = self.neighbor_coords(edge.row, edge.col, edge.side) else { continue };
            let Some(theirs) = self.side_state(nr, nc, edge.side.corresponding()) else { continue };
            if mine != theirs {
                if let Some(idx) = self.index_of(edge.row, edge.col) {
                    self.set_edge(idx, edge.side, SideState::Mirror);
                }
            }
        }
    }

    /// Map text: one line per row, tokens separated by single spaces, no
    /// trailing newline.
    pub fn export_to_map(&self) -> String {
        (0..self.num_rows())
            .map(|row| {
                self.row(row)
                    .iter()
                    .map(Triangle::to_token)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ══════════════════════════════════════════════════════════════
// Queries
// ══════════════════════════════════════════════════════════════

impl TriangularGrid {
    pub fn num_rows(&self) -> usize {
        self.row_lengths.len()
    }

    /// Triangles in `row`; 0 for rows outside the grid.
    pub fn row_length(&self, row: usize) -> usize {
        self.row_lengths.get(row).copied().unwrap_or(0)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        col < self.row_length(row)
    }

    /// Arena index of `(row, col)`.
    #[inline]
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if self.contains(row, col) {
            Some(self.row_offsets[row] + col)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&Triangle> {
        self.index_of(row, col).map(|i| &self.triangles[i])
    }

    pub fn row(&self, row: usize) -> &[Triangle] {
        match self.row_offsets.get(row) {
            Some(&start) => &self.triangles[start..start + self.row_lengths[row]],
            None => &[],
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }

    pub fn side_state(&self, row: usize, col: usize, side: Side) -> Option<SideState> {
        self.get(row, col).map(|t| t.side_state(side))
    }

    pub fn neighbor_coords(&self, row: usize, col: usize, side: Side) -> Option<(usize, usize)> {
        self.get(row, col).and_then(|t| t.neighbor(side))
    }

    /// The triangle across `side` of `(row, col)`.
    pub fn neighbor(&self, row: usize, col: usize, side: Side) -> Option<&Triangle> {
        self.neighbor_coords(row, col, side)
            .and_then(|(r, c)| self.get(r, c))
    }

    /// The maximal `(row, col)`: last column of the last row.
    pub fn last_coords(&self) -> (usize, usize) {
        let last_row = self.num_rows().saturating_sub(1);
        (last_row, self.row_length(last_row).saturating_sub(1))
    }

    /// Every edge shared by two triangles, each listed once.
    pub fn internal_edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (i, t) in self.triangles.iter().enumerate() {
            for side in Side::ALL {
                if let Some((r, c)) = t.neighbor(side) {
                    if self.index_of(r, c).is_some_and(|j| j > i) {
                        edges.push(Edge { row: t.row, col: t.col, side });
                    }
                }
            }
        }
        edges
    }

    /// Every side with no neighbor.
    pub fn boundary_sides(&self) -> Vec<Edge> {
        self.triangles
            .iter()
            .flat_map(|t| {
                Side::ALL
                    .into_iter()
                    .filter(|&side| t.is_boundary(side))
                    .map(|side| Edge { row: t.row, col: t.col, side })
            })
            .collect()
    }

    /// Boundary sides currently `Empty` (maze exits).
    pub fn open_boundary_sides(&self) -> Vec<Edge> {
        self.boundary_sides()
            .into_iter()
            .filter(|e| self.side_state(e.row, e.col, e.side) == Some(SideState::Empty))
            .collect()
    }

    /// Open internal edges plus open boundary sides.
    pub fn open_edge_count(&self) -> usize {
        let internal = self
            .internal_edges()
            .iter()
            .filter(|e| self.side_state(e.row, e.col, e.side) == Some(SideState::Empty))
            .count();
        internal + self.open_boundary_sides().len()
    }

    /// Can every triangle reach every other through `Empty` edges?
    pub fn is_connected(&self) -> bool {
        if self.triangles.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.triangles.len()];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut reached = 1;

        while let Some(i) = queue.pop_front() {
            let t = &self.triangles[i];
            for side in Side::ALL {
                if !t.side_state(side).is_passable() {
                    continue;
                }
                let Some(j) = t.neighbor(side).and_then(|(r, c)| self.index_of(r, c)) else {
                    continue;
                };
                if !seen[j] {
                    seen[j] = true;
                    reached += 1;
                    queue.push_back(j);
                }
            }
        }
        reached == self.triangles.len()
    }
}

// ══════════════════════════════════════════════════════════════
// Mutation
// ══════════════════════════════════════════════════════════════

impl TriangularGrid {
    /// Set one edge. The neighbor's matching side is written too, so both
    /// triangles always agree.
    pub fn set_side_state(
        &mut self,
        row: usize,
        col: usize,
        side: Side,
        state: SideState,
    ) -> Result<(), GridError> {
        let idx = self.index_of(row, col).ok_or(GridError::NoTriangle { row, col })?;
        self.set_edge(idx, side, state);
        Ok(())
    }

    fn set_edge(&mut self, idx: usize, side: Side, state: SideState) {
        self.triangles[idx].set_side_local(side, state);
        if let Some(j) = self.triangles[idx]
            .neighbor(side)
            .and_then(|(r, c)| self.index_of(r, c))
        {
            self.triangles[j].set_side_local(side.corresponding(), state);
        }
    }

    /// Set every side of every triangle (edges stay consistent trivially).
    pub fn set_all_sides(&mut self, state: SideState) {
        for t in &mut self.triangles {
            for side in Side::ALL {
                t.set_side_local(side, state);
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Procedural generation
// ══════════════════════════════════════════════════════════════

/// A generated grid plus the seed that reproduces it.
#[derive(Clone, Debug)]
pub struct GeneratedGrid {
    pub grid: TriangularGrid,
    pub seed: String,
}

impl TriangularGrid {
    /// Feasible `mirror_density` band for this grid's shape: the fraction of
    /// internal edges that may stay mirrors while a spanning tree is open.
    pub fn density_bounds(&self) -> (f64, f64) {
        let internal = self.internal_edges().len();
        if internal == 0 {
            return (0.0, 0.0);
        }
        let tree = self.triangle_count().saturating_sub(1) as f64;
        (0.0, (1.0 - tree / internal as f64).max(0.0))
    }

    /// Generate a connected maze with exactly one exit.
    ///
    /// Shapes that cannot be connected even with every side open fail with
    /// [`GridError::Disconnected`].
    ///
    /// 1. every side starts as a mirror
    /// 2. randomized depth-first carve from the center triangle (spanning tree)
    /// 3. one random boundary side opens as the exit
    /// 4. extra internal edges open until the density target is met
    ///
    /// All randomness comes from one [`SeededRng`]. Without a seed a fresh one
    /// is drawn and returned so the maze can be replayed.
    pub fn generate_random_grid(
        num_rows: usize,
        cols: usize,
        density: f64,
        seed: Option<&str>,
    ) -> Result<GeneratedGrid, GridError> {
        let mut grid = Self::new(num_rows, cols)?;
        // Single-column grids only pair rows up; three or more rows split.
        if !grid.is_connected() {
            return Err(GridError::Disconnected { rows: num_rows, cols });
        }
        let seed = seed.map(str::to_owned).unwrap_or_else(SeededRng::random_seed);
        let mut rng = SeededRng::from_seed_str(&seed);

        grid.set_all_sides(SideState::Mirror);
        grid.carve_spanning_tree(&mut rng);

        let boundary = grid.boundary_sides();
        if let Some(exit) = boundary.choose(&mut rng).copied() {
            grid.set_side_state(exit.row, exit.col, exit.side, SideState::Empty)?;
            debug!("exit at ({}, {}) {}", exit.row, exit.col, exit.side);
        }

        let internal = grid.internal_edges();
        let (lo, hi) = grid.density_bounds();
        let clamped = if density.is_nan() { hi } else { density.clamp(lo, hi) };
        if clamped != density {
            warn!(
                "mirror density {density} outside feasible range [{lo:.3}, {hi:.3}] for {num_rows}x{cols}, using {clamped:.3}"
            );
        }

        let mirrors_wanted = (clamped * internal.len() as f64).round() as usize;
        let target_open = (internal.len() - mirrors_wanted.min(internal.len()) + 1)
            .max(grid.triangle_count())
            .min(internal.len() + 1);

        let mut closed: Vec<Edge> = internal
            .into_iter()
            .filter(|e| grid.side_state(e.row, e.col, e.side) == Some(SideState::Mirror))
            .collect();
        closed.shuffle(&mut rng);

        let mut open = grid.open_edge_count();
        for edge in closed {
            if open >= target_open {
                break;
            }
            grid.set_side_state(edge.row, edge.col, edge.side, SideState::Empty)?;
            open += 1;
        }

        info!(
            "generated {num_rows}x{cols} maze (seed {seed:?}, density {clamped:.3}, {open} open edges)"
        );
        Ok(GeneratedGrid { grid, seed })
    }

    fn carve_spanning_tree(&mut self, rng: &mut SeededRng) {
        let start_row = self.num_rows() / 2;
        let Some(start) = self.index_of(start_row, self.row_length(start_row) / 2) else {
            return;
        };
        let mut visited = vec![false; self.triangles.len()];
        visited[start] = true;
        let mut stack = vec![start];

        while let Some(&i) = stack.last() {
            let t = &self.triangles[i];
            let unvisited: Vec<(Side, usize)> = Side::ALL
                .into_iter()
                .filter_map(|side| {
                    t.neighbor(side)
                        .and_then(|(r, c)| self.index_of(r, c))
                        .filter(|&j| !visited[j])
                        .map(|j| (side, j))
                })
                .collect();

            match unvisited.choose(rng).copied() {
                Some((side, j)) => {
                    self.set_edge(i, side, SideState::Empty);
                    visited[j] = true;
                    stack.push(j);
                }
                None => {
                    stack.pop();
                }
            }
        }
    }
}
