/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Maze layout
///
/// Every grid row becomes two terminal lines: a base line carrying the
/// horizontal (third) sides, then the row line carrying the slanted sides
/// and the characters. One more base line closes the last row.
///
///   ```text
///        ───
///   /<@ \ X /
///    ───
///   ```
///
/// Each triangle spans `CELL_W` columns: its left slant, then three interior
/// columns. Open boundary sides (exits) are drawn as `*`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::grid::TriangularGrid;
use crate::domain::side::{Side, SideState};
use crate::sim::movement::Phase;
use crate::sim::world::GameState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap matches the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn from_char(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Self::BASE_BG }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg));
        }
    }
}

// ── Maze glyphs ──

/// Terminal columns per triangle.
const CELL_W: usize = 4;

const MIRROR_FG: Color = Color::Rgb { r: 120, g: 200, b: 255 };
const EXIT_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const PLAYER_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const ENEMY_FG: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const DIM_FG: Color = Color::Rgb { r: 110, g: 110, b: 130 };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
}

impl Glyph {
    const SPACE: Glyph = Glyph { ch: ' ', fg: Color::White };
}

fn side_glyph(grid: &TriangularGrid, row: usize, col: usize, side: Side, mirror: char) -> Glyph {
    let Some(tri) = grid.get(row, col) else { return Glyph::SPACE };
    match tri.side_state(side) {
        SideState::Mirror => Glyph { ch: mirror, fg: MIRROR_FG },
        SideState::Empty if tri.is_boundary(side) => Glyph { ch: '*', fg: EXIT_FG },
        SideState::Empty => Glyph::SPACE,
    }
}

/// The triangle whose third side lies on base line `line` at `col`.
fn base_owner(grid: &TriangularGrid, line: usize, col: usize) -> Option<(usize, usize)> {
    let below = grid.get(line, col).filter(|t| !t.points_up());
    let above = line
        .checked_sub(1)
        .and_then(|r| grid.get(r, col))
        .filter(|t| t.points_up());
    below.or(above).map(|t| (t.row, t.col))
}

fn facing_glyph(orientation: Side, points_up: bool) -> (usize, char) {
    match orientation {
        Side::Left => (1, '<'),
        Side::Right => (3, '>'),
        Side::Third if points_up => (3, 'v'),
        Side::Third => (3, '^'),
    }
}

/// Lay out the maze as lines of glyphs, top to bottom.
fn maze_lines(state: &GameState) -> Vec<Vec<Glyph>> {
    let grid = state.grid();
    let rows = grid.num_rows();
    let mut lines = Vec::with_capacity(rows * 2 + 1);

    for line in 0..=rows {
        // Base line
        let len = grid.row_length(line).max(line.checked_sub(1).map_or(0, |r| grid.row_length(r)));
        let mut base = vec![Glyph::SPACE; len * CELL_W + 1];
        for col in 0..len {
            if let Some((r, c)) = base_owner(grid, line, col) {
                let g = side_glyph(grid, r, c, Side::Third, '─');
                if g.ch == '─' {
                    base[col * CELL_W + 1..col * CELL_W + CELL_W].fill(g);
                } else {
                    base[col * CELL_W + 2] = g;
                }
            }
        }
        lines.push(base);

        if line == rows {
            break;
        }

        // Row line
        let len = grid.row_length(line);
        let mut cells = vec![Glyph::SPACE; len * CELL_W + 1];
        for (col, tri) in grid.row(line).iter().enumerate() {
            let (left, right) = if tri.points_up() { ('/', '\\') } else { ('\\', '/') };
            cells[col * CELL_W] = side_glyph(grid, line, col, Side::Left, left);
            if col + 1 == len {
                cells[col * CELL_W + CELL_W] = side_glyph(grid, line, col, Side::Right, right);
            }
        }

        let player = state.player();
        let enemy = state.enemy();
        if enemy.row == line && enemy.col < len {
            cells[enemy.col * CELL_W + 2] = Glyph { ch: 'X', fg: ENEMY_FG };
        }
        if player.row == line && player.col < len {
            let x = player.col * CELL_W;
            let mark = if player.same_cell(enemy) { '#' } else { '@' };
            cells[x + 2] = Glyph { ch: mark, fg: PLAYER_FG };
            let points_up = grid.get(player.row, player.col).is_some_and(|t| t.points_up());
            let (dx, arrow) = facing_glyph(player.orientation, points_up);
            cells[x + dx] = Glyph { ch: arrow, fg: PLAYER_FG };
        }
        lines.push(cells);
    }
    lines
}

// ── Renderer ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;

const HELP: &str = " ←→ turn  ↑ MOVEMENT  ↓ ROTATION  R new  M next map  X export  F5-F8 save  F9-F12 load  Q quit";

/// Everything one frame shows.
pub struct View<'a> {
    pub state: &'a GameState,
    pub phase: Phase,
    pub title: &'a str,
    pub message: &'a str,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose(view);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, view: &View) {
        let state = view.state;
        let player = state.player();

        // ── HUD row ──
        let hud = format!(
            " TRIMAZE  Turn:{:<4}  {:<8}  Facing:{:<5}  {}",
            state.turn(),
            view.phase.name(),
            player.orientation.name(),
            view.title,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White);

        // ── Maze ──
        let lines = maze_lines(state);
        for (dy, line) in lines.iter().enumerate() {
            for (dx, g) in line.iter().enumerate() {
                if g.ch != ' ' {
                    self.front.set(MAP_COL + dx, MAP_ROW + dy, Cell::from_char(g.ch, g.fg));
                }
            }
        }

        // ── Status ──
        let mut y = MAP_ROW + lines.len() + 1;
        if state.is_game_over() {
            self.front.put_str(MAP_COL, y, "✕ CAUGHT!  Press R for a new maze", ENEMY_FG);
            y += 1;
        }
        if !view.message.is_empty() {
            self.front.put_str(MAP_COL, y, view.message, Color::White);
        }

        // ── Help line (pinned to the bottom) ──
        let help_row = self.front.height.saturating_sub(1).max(y + 1);
        self.front.put_str(0, help_row, HELP, DIM_FG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &[Glyph]) -> String {
        line.iter().map(|g| g.ch).collect::<String>().trim_end().to_string()
    }

    #[test]
    fn open_strip_shows_exits_and_characters() {
        let state = GameState::new(TriangularGrid::new(1, 2).unwrap());
        let lines: Vec<String> = maze_lines(&state).iter().map(|l| text(l)).collect();
        assert_eq!(lines, vec!["      *", "*<@   X *", "  *"]);
    }

    #[test]
    fn mirrors_draw_slants_and_bases() {
        let mut grid = TriangularGrid::new(1, 2).unwrap();
        grid.set_all_sides(SideState::Mirror);
        let state = GameState::new(grid);
        let lines: Vec<String> = maze_lines(&state).iter().map(|l| text(l)).collect();
        assert_eq!(lines, vec!["     ───", "/<@ \\ X /", " ───"]);
        assert_eq!(maze_lines(&state)[1][0].fg, MIRROR_FG);
    }

    #[test]
    fn layout_has_two_lines_per_row_plus_one() {
        let state = GameState::new(TriangularGrid::new(3, 5).unwrap());
        let lines = maze_lines(&state);
        assert_eq!(lines.len(), 7);
        assert!(lines.iter().all(|l| l.len() == 5 * CELL_W + 1));
    }

    #[test]
    fn facing_arrow_follows_orientation() {
        assert_eq!(facing_glyph(Side::Left, true), (1, '<'));
        assert_eq!(facing_glyph(Side::Right, false), (3, '>'));
        assert_eq!(facing_glyph(Side::Third, true), (3, 'v'));
        assert_eq!(facing_glyph(Side::Third, false), (3, '^'));
    }

    #[test]
    fn shared_triangle_is_marked() {
        let mut state = GameState::new(TriangularGrid::new(1, 2).unwrap());
        let at = state.enemy().pose();
        state
            .teleport(crate::domain::entity::CharacterKind::Player, at)
            .unwrap();
        let row = text(&maze_lines(&state)[1]);
        assert!(row.contains('#'));
        assert!(!row.contains('X'));
    }
}
