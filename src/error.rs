//! Engine error type.
//!
//! Category 1 (invariant violation) and category 4 (serialization error)
//! from the spec's error-handling design (spec.md §7). Category 2 (illegal
//! move) is a special case of category 1: calling `make_move` with a move
//! that was not produced or validated by the legal-move generator is a
//! contract violation. Category 3 (empty undo/redo) is a normal return,
//! not an error, and has no variant here.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KbxError {
    #[error("die index {0} out of range (expected 0..=17)")]
    InvalidDieIndex(usize),

    #[error("board coordinate ({x}, {y}) out of range (expected 0..=8)")]
    InvalidCoordinate { x: i32, y: i32 },

    #[error("unknown key '{0}' while deserializing")]
    UnknownKey(String),

    #[error("malformed numeric value for key '{key}': '{value}'")]
    MalformedNumber { key: String, value: String },

    #[error("unexpected end of input while deserializing")]
    UnexpectedEof,
}
