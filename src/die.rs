//! Die orientations, the 26-entry rolling table, and single-die state.
//!
//! The table is lifted verbatim from the original engine: every entry
//! describes one physical orientation of a cube (which face is up) and
//! where rolling it one step in each cardinal direction takes it. Index 24
//! is the king's die — it always shows 1 and never changes orientation.
//! Index 25 is the "killed" sentinel, worth 0.

use serde::{Deserialize, Serialize};

/// One of the two players. `None` is a neutral sentinel (no winner yet).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
    None,
}

impl Color {
    /// White <-> Black; `None` is a fixed point.
    pub fn inverse(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            Color::None => Color::None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step on the board: (dx, dy).
    fn unit(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Column in the orientation table: value, north, south, east, west.
    fn table_column(self) -> usize {
        match self {
            Direction::North => 1,
            Direction::South => 2,
            Direction::East => 3,
            Direction::West => 4,
        }
    }
}

/// King orientation: always shows 1, never reorients.
pub const KING_ORIENTATION: u8 = 24;
/// Dead orientation: shows 0.
pub const DEAD_ORIENTATION: u8 = 25;

/// Columns: value, north, south, east, west.
///
/// Reproduced verbatim from the reference engine's die-state table. The
/// initial orientation (index 0) is "1 up, 6 down, 2 south, 5 north, 3
/// east, 4 west".
pub const ORIENTATION_TABLE: [[u8; 5]; 26] = [
    [1, 4, 16, 12, 8],
    [1, 9, 14, 5, 19],
    [1, 18, 6, 11, 15],
    [1, 13, 10, 17, 7],
    [2, 20, 0, 13, 9],
    [2, 11, 12, 22, 1],
    [2, 2, 21, 10, 14],
    [2, 15, 8, 3, 23],
    [3, 7, 19, 0, 21],
    [3, 23, 1, 4, 18],
    [3, 3, 22, 16, 6],
    [3, 17, 5, 20, 2],
    [4, 5, 17, 21, 0],
    [4, 22, 3, 18, 4],
    [4, 1, 23, 6, 16],
    [4, 19, 7, 2, 20],
    [5, 0, 20, 14, 10],
    [5, 12, 11, 23, 3],
    [5, 21, 2, 9, 13],
    [5, 8, 15, 1, 22],
    [6, 16, 4, 15, 11],
    [6, 6, 18, 8, 12],
    [6, 10, 13, 19, 5],
    [6, 14, 9, 7, 17],
    [1, 24, 24, 24, 24],
    [0, 25, 25, 25, 25],
];

/// The top value shown by orientation `state`.
pub fn top_value(state: u8) -> u8 {
    ORIENTATION_TABLE[state as usize][0]
}

/// The orientation reached by rolling `state` one step in `direction`.
pub fn roll(state: u8, direction: Direction) -> u8 {
    ORIENTATION_TABLE[state as usize][direction.table_column()]
}

/// A single die on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Die {
    pub x: i32,
    pub y: i32,
    pub color: Color,
    /// Orientation held just before the most recent `kill`. Only
    /// meaningful while the die is dead; `-1` means "never killed".
    pub former: i32,
    pub current: u8,
}

impl Die {
    pub fn new(x: i32, y: i32, color: Color, current: u8) -> Die {
        Die {
            x,
            y,
            color,
            former: -1,
            current,
        }
    }

    /// Current top value, or 0 if dead.
    pub fn value(&self) -> u8 {
        top_value(self.current)
    }

    pub fn got_killed(&self) -> bool {
        self.current == DEAD_ORIENTATION
    }

    /// Tumble one step in `direction`: re-orient and translate.
    pub fn roll_one_step(&mut self, direction: Direction) {
        self.current = roll(self.current, direction);
        let (dx, dy) = direction.unit();
        self.x += dx;
        self.y += dy;
    }

    /// Remember the current orientation and go to the dead sentinel.
    pub fn kill(&mut self) {
        self.former = self.current as i32;
        self.current = DEAD_ORIENTATION;
    }

    /// Restore the orientation held before the most recent `kill`.
    pub fn revive(&mut self) {
        self.current = self.former as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_self_consistent() {
        let dirs = [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ];
        for i in 0..24u8 {
            for &d in &dirs {
                let rolled = roll(i, d);
                let back = roll(rolled, d.opposite());
                assert_eq!(back, i, "orientation {i} direction {d:?} not invertible");
            }
        }
    }

    #[test]
    fn king_orientation_is_fixed() {
        for &d in &[
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ] {
            assert_eq!(roll(KING_ORIENTATION, d), KING_ORIENTATION);
        }
        assert_eq!(top_value(KING_ORIENTATION), 1);
    }

    #[test]
    fn dead_orientation_is_fixed_and_worthless() {
        for &d in &[
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ] {
            assert_eq!(roll(DEAD_ORIENTATION, d), DEAD_ORIENTATION);
        }
        assert_eq!(top_value(DEAD_ORIENTATION), 0);
    }

    #[test]
    fn kill_then_revive_restores_orientation() {
        let mut d = Die::new(0, 0, Color::White, 19);
        assert!(!d.got_killed());
        d.kill();
        assert!(d.got_killed());
        assert_eq!(d.value(), 0);
        d.revive();
        assert!(!d.got_killed());
        assert_eq!(d.current, 19);
    }

    #[test]
    fn color_inverse_is_involutive() {
        assert_eq!(Color::White.inverse(), Color::Black);
        assert_eq!(Color::Black.inverse(), Color::White);
        assert_eq!(Color::None.inverse(), Color::None);
    }

    #[test]
    fn roll_one_step_updates_position_and_value() {
        // Initial state 19 is White die 0's starting orientation, value 5.
        let mut d = Die::new(0, 0, Color::White, 19);
        assert_eq!(d.value(), 5);
        d.roll_one_step(Direction::North);
        assert_eq!((d.x, d.y), (0, 1));
    }
}
