//! Move algebra: relative moves, absolute moves, and the precomputed
//! per-value catalog of theoretically possible relative moves.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// A move relative to a die's current square.
///
/// `first_x` controls traversal order when both `dx` and `dy` are
/// nonzero: `true` means the die crosses `|dx|` squares in x first, then
/// `|dy|` in y; `false` reverses the order. Manhattan length `|dx| +
/// |dy|` always equals the moving die's top value.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RelativeMove {
    pub dx: i32,
    pub dy: i32,
    pub first_x: bool,
}

impl RelativeMove {
    pub fn new(dx: i32, dy: i32, first_x: bool) -> RelativeMove {
        RelativeMove { dx, dy, first_x }
    }

    /// The move that undoes this one: negate both offsets and flip
    /// traversal order.
    pub fn invert(&self) -> RelativeMove {
        RelativeMove::new(-self.dx, -self.dy, !self.first_x)
    }
}

/// An absolute move: which die, and how it moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Move {
    pub die_index: usize,
    pub rel: RelativeMove,
}

impl Move {
    pub fn new(die_index: usize, rel: RelativeMove) -> Move {
        Move { die_index, rel }
    }

    pub fn invert(&self) -> Move {
        Move::new(self.die_index, self.rel.invert())
    }
}

/// Number of theoretically possible relative moves per die value
/// (index 0 is unused — dice never show 0 while alive).
pub const MOVE_COUNT_FOR_VALUE: [usize; 7] = [0, 4, 12, 20, 28, 36, 44];

lazy_static! {
    /// All theoretically possible relative moves per die value, computed
    /// once. Index 0 is an empty placeholder.
    pub static ref POSSIBLE_MOVES: [Vec<RelativeMove>; 7] = init_possible_moves();
}

fn init_possible_moves() -> [Vec<RelativeMove>; 7] {
    let mut moves: [Vec<RelativeMove>; 7] = [
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    ];
    for value in 1..=6i32 {
        let list = &mut moves[value as usize];
        // Straight moves, no turning.
        list.push(RelativeMove::new(value, 0, true));
        list.push(RelativeMove::new(-value, 0, true));
        list.push(RelativeMove::new(0, value, false));
        list.push(RelativeMove::new(0, -value, false));
        // L-shaped moves: one turn, every split of the value between
        // the two legs, every sign combination, both traversal orders.
        for i in 1..value {
            let j = value - i;
            list.push(RelativeMove::new(i, j, true));
            list.push(RelativeMove::new(-i, j, true));
            list.push(RelativeMove::new(i, j, false));
            list.push(RelativeMove::new(-i, j, false));
            list.push(RelativeMove::new(i, -j, true));
            list.push(RelativeMove::new(-i, -j, true));
            list.push(RelativeMove::new(i, -j, false));
            list.push(RelativeMove::new(-i, -j, false));
        }
    }
    moves
}
