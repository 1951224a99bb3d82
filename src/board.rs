//! Board occupancy, full game state, legal-move generation, and move
//! execution (spec components D, E, F).
//!
//! The board stores die *indices*, never references to dice — all
//! lookups go through `Game::dice`. That keeps copying, undo, and
//! serialization trivial and avoids any aliasing between board cells and
//! die objects.

use serde::{Deserialize, Serialize};

use crate::die::{Color, Die, Direction};
use crate::engine::Strategy;
use crate::error::KbxError;
use crate::moves::{Move, RelativeMove, POSSIBLE_MOVES};

pub const KING_WHITE: usize = 4;
pub const KING_BLACK: usize = 13;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PlayMode {
    HumanHuman,
    HumanAi,
    AiHuman,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Evaluating,
    Cancelled,
    Finished,
}

/// The full, mutable state of one game in progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// 9x9 grid of die indices, `grid[x][y]`. `None` means empty.
    pub grid: [[Option<usize>; 9]; 9],
    pub dice: [Die; 18],
    pub mode: PlayMode,
    pub ai_depth: u32,
    pub strategy: Strategy,
    pub next_player: Color,
    #[serde(skip)]
    pub phase: Phase,
    /// Top of stack = most recently executed move.
    pub move_stack: Vec<Move>,
    /// Parallel to `move_stack`: the index of the die killed by that
    /// move, or `None`.
    pub death_stack: Vec<Option<usize>>,
    pub move_stack_pending: Vec<Move>,
    pub death_stack_pending: Vec<Option<usize>>,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(PlayMode::HumanHuman, 2, Strategy::default())
    }
}

/// Initial orientations for White's back row, x = 0..=8.
const WHITE_SETUP: [u8; 9] = [19, 1, 5, 22, 24, 22, 5, 1, 19];
/// Initial orientations for Black's back row, x = 0..=8.
const BLACK_SETUP: [u8; 9] = [17, 3, 7, 23, 24, 23, 7, 3, 17];

impl Game {
    pub fn new(mode: PlayMode, ai_depth: u32, strategy: Strategy) -> Game {
        let mut game = Game {
            grid: [[None; 9]; 9],
            dice: std::array::from_fn(|_| Die::new(0, 0, Color::None, DEAD_PLACEHOLDER)),
            mode,
            ai_depth,
            strategy,
            next_player: Color::White,
            phase: Phase::Idle,
            move_stack: Vec::new(),
            death_stack: Vec::new(),
            move_stack_pending: Vec::new(),
            death_stack_pending: Vec::new(),
        };
        game.setup();
        game
    }

    fn setup(&mut self) {
        self.grid = [[None; 9]; 9];
        for x in 0..9usize {
            self.dice[x] = Die::new(x as i32, 0, Color::White, WHITE_SETUP[x]);
            self.grid[x][0] = Some(x);
            self.dice[x + 9] = Die::new(x as i32, 8, Color::Black, BLACK_SETUP[x]);
            self.grid[x][8] = Some(x + 9);
        }
        self.next_player = Color::White;
    }

    /// Return the game to its initial position, clearing all stacks.
    pub fn reset(&mut self) {
        self.move_stack.clear();
        self.death_stack.clear();
        self.move_stack_pending.clear();
        self.death_stack_pending.clear();
        self.phase = Phase::Idle;
        self.setup();
    }

    /// Mark the game as finished. Mirrors the original engine's
    /// `Game::setFinished`: the decision that the game is over belongs to
    /// the caller (a winner has already been observed via `winner()`),
    /// not to the engine itself.
    pub fn set_finished(&mut self) {
        self.phase = Phase::Finished;
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        (0..9).contains(&x) && (0..9).contains(&y)
    }

    /// Cells visited while walking `rel` from `(x, y)`, in traversal
    /// order, the last of which is the target square. `first_x`
    /// decides whether the x-leg or the y-leg is walked first.
    fn walk(x: i32, y: i32, rel: &RelativeMove) -> Vec<(i32, i32)> {
        let mut cells = Vec::with_capacity((rel.dx.abs() + rel.dy.abs()) as usize);
        let (mut cx, mut cy) = (x, y);
        let x_dir = if rel.dx < 0 { -1 } else { 1 };
        let y_dir = if rel.dy < 0 { -1 } else { 1 };
        let (first_steps, first_dx, first_dy, second_steps, second_dx, second_dy) = if rel.first_x
        {
            (rel.dx.abs(), x_dir, 0, rel.dy.abs(), 0, y_dir)
        } else {
            (rel.dy.abs(), 0, y_dir, rel.dx.abs(), x_dir, 0)
        };
        for _ in 0..first_steps {
            cx += first_dx;
            cy += first_dy;
            cells.push((cx, cy));
        }
        for _ in 0..second_steps {
            cx += second_dx;
            cy += second_dy;
            cells.push((cx, cy));
        }
        cells
    }

    /// Direction of a single unit step along the x axis.
    fn x_direction(dx: i32) -> Direction {
        if dx < 0 {
            Direction::West
        } else {
            Direction::East
        }
    }

    /// Direction of a single unit step along the y axis.
    fn y_direction(dy: i32) -> Direction {
        if dy < 0 {
            Direction::South
        } else {
            Direction::North
        }
    }

    /// Whether `Move { die_index, rel }` satisfies every rule in the
    /// legal-move generator (spec.md §4.E).
    pub fn is_legal(&self, die_index: usize, rel: &RelativeMove) -> bool {
        if die_index >= 18 {
            return false;
        }
        let die = &self.dice[die_index];
        if die.color != self.next_player {
            return false;
        }
        let (tx, ty) = (die.x + rel.dx, die.y + rel.dy);
        if !Self::in_bounds(tx, ty) {
            return false;
        }
        let path = Self::walk(die.x, die.y, rel);
        let (intermediate, target) = path.split_at(path.len() - 1);
        for &(ix, iy) in intermediate {
            if self.grid[ix as usize][iy as usize].is_some() {
                return false;
            }
        }
        let (tx2, ty2) = target[0];
        debug_assert_eq!((tx2, ty2), (tx, ty));
        match self.grid[tx as usize][ty as usize] {
            None => true,
            Some(occupant) => self.dice[occupant].color != die.color,
        }
    }

    /// All legal moves for one die.
    pub fn legal_moves_for(&self, die_index: usize) -> Result<Vec<Move>, KbxError> {
        if die_index >= 18 {
            return Err(KbxError::InvalidDieIndex(die_index));
        }
        let value = self.dice[die_index].value() as usize;
        let moves = POSSIBLE_MOVES[value]
            .iter()
            .filter(|rel| self.is_legal(die_index, rel))
            .map(|rel| Move::new(die_index, *rel))
            .collect();
        Ok(moves)
    }

    /// All legal moves for every die of `color`.
    pub fn legal_moves_for_color(&self, color: Color) -> Vec<Move> {
        let (from, to) = match color {
            Color::White => (0, 9),
            Color::Black => (9, 18),
            Color::None => (0, 0),
        };
        let mut moves = Vec::new();
        for d in from..to {
            if let Ok(mut m) = self.legal_moves_for(d) {
                moves.append(&mut m);
            }
        }
        moves
    }

    /// Apply `mv`, killing any occupant of the target square. When
    /// `record` is true this clears the redo stacks and pushes `mv`
    /// (and the victim, if any) onto the undo stacks.
    ///
    /// This is a contract between caller and engine: `mv` must have
    /// been produced or validated by the legal-move generator. Calling
    /// it otherwise is an invariant violation (spec.md §7 category 1/2).
    pub fn make_move(&mut self, mv: &Move, record: bool) -> Result<Option<usize>, KbxError> {
        if mv.die_index >= 18 {
            return Err(KbxError::InvalidDieIndex(mv.die_index));
        }
        let (sx, sy) = (self.dice[mv.die_index].x, self.dice[mv.die_index].y);
        self.grid[sx as usize][sy as usize] = None;

        let rel = &mv.rel;
        let x_dir = Self::x_direction(rel.dx);
        let y_dir = Self::y_direction(rel.dy);
        let (first_steps, first_dir, second_steps, second_dir) = if rel.first_x {
            (rel.dx.abs(), x_dir, rel.dy.abs(), y_dir)
        } else {
            (rel.dy.abs(), y_dir, rel.dx.abs(), x_dir)
        };
        for _ in 0..first_steps {
            self.dice[mv.die_index].roll_one_step(first_dir);
        }
        for _ in 0..second_steps {
            self.dice[mv.die_index].roll_one_step(second_dir);
        }

        let (tx, ty) = (self.dice[mv.die_index].x, self.dice[mv.die_index].y);
        if !Self::in_bounds(tx, ty) {
            return Err(KbxError::InvalidCoordinate { x: tx, y: ty });
        }
        let victim = self.grid[tx as usize][ty as usize];
        if let Some(v) = victim {
            self.dice[v].kill();
        }

        if record {
            self.move_stack_pending.clear();
            self.death_stack_pending.clear();
            self.move_stack.push(*mv);
            self.death_stack.push(victim);
        }

        self.grid[tx as usize][ty as usize] = Some(mv.die_index);
        self.next_player = self.next_player.inverse();
        Ok(victim)
    }

    fn revive(&mut self, die_index: usize) {
        self.dice[die_index].revive();
        let die = &self.dice[die_index];
        self.grid[die.x as usize][die.y as usize] = Some(die_index);
    }

    /// Undo a move that was applied with `record = false` (a search
    /// simulation), without touching the undo/redo stacks. Used by the
    /// negamax search to back out of a line it has finished exploring.
    pub fn undo_unrecorded(&mut self, mv: &Move, victim: Option<usize>) {
        let inverted = mv.invert();
        let _ = self.make_move(&inverted, false);
        if let Some(v) = victim {
            self.revive(v);
        }
    }

    /// Undo the most recent recorded move, reviving any victim. Returns
    /// the inverted move that was actually replayed, or `None` if there
    /// is nothing to undo (spec.md §7 category 3 — a normal return, not
    /// an error).
    pub fn undo_move(&mut self) -> Option<Move> {
        let back_move = self.move_stack.pop()?;
        let victim = self.death_stack.pop().flatten();
        self.move_stack_pending.push(back_move);
        self.death_stack_pending.push(victim);
        let inverted = back_move.invert();
        self.make_move(&inverted, false).ok()?;
        if let Some(v) = victim {
            self.revive(v);
        }
        Some(inverted)
    }

    /// Redo the most recently undone move. Returns the move that was
    /// replayed, or `None` if there is nothing to redo.
    pub fn redo_move(&mut self) -> Option<Move> {
        let re_move = self.move_stack_pending.pop()?;
        let victim = self.death_stack_pending.pop().flatten();
        self.move_stack.push(re_move);
        self.death_stack.push(victim);
        self.make_move(&re_move, false).ok()?;
        Some(re_move)
    }

    /// The die that moved last, if any.
    pub fn last_active_die(&self) -> Option<usize> {
        self.move_stack.last().map(|m| m.die_index)
    }

    /// The die captured by the last move, if any.
    pub fn last_victim(&self) -> Option<usize> {
        self.death_stack.last().copied().flatten()
    }

    /// The winner, or `Color::None` if the game is undecided.
    pub fn winner(&self) -> Color {
        if self.dice[KING_WHITE].got_killed() {
            return Color::Black;
        }
        if self.dice[KING_BLACK].got_killed() {
            return Color::White;
        }
        let white_king = &self.dice[KING_WHITE];
        if white_king.x == 4 && white_king.y == 8 {
            return Color::White;
        }
        let black_king = &self.dice[KING_BLACK];
        if black_king.x == 4 && black_king.y == 0 {
            return Color::Black;
        }
        Color::None
    }
}

/// Placeholder orientation used only while `Game::dice` is being
/// allocated before `setup()` overwrites every entry.
const DEAD_PLACEHOLDER: u8 = 25;
