//! Fanorona rule engine.
//!
//! Fanorona is a Malagasy strategy game played on the intersections of a
//! 5-row grid (5 or 9 columns). Pieces slide along the lines of the board
//! graph; capturing is mandatory when possible and happens by *approach*
//! (moving toward a line of enemy pieces) or *withdrawal* (moving away from
//! one), after which the same piece may keep capturing in a chain.
//!
//! This crate provides the complete rule engine:
//!
//! - [`CellState`]: the three-valued cell symbol
//! - [`Direction`] / [`CaptureKind`] / [`Move`]: the action model
//! - [`Board`]: state, legal-move generation and move execution
//! - [`EncodedPosition`]: the fixed-shape tensor view consumed by
//!   policy/value evaluators
//!
//! Search and players live in downstream crates; everything here is pure
//! game logic with no I/O.

pub mod action;
pub mod board;
pub mod cell;
pub mod encoder;

#[cfg(test)]
mod tests;

pub use action::{CaptureKind, Direction, Move};
pub use board::{Board, BoardError, Outcome};
pub use cell::CellState;
pub use encoder::EncodedPosition;

/// Number of rows on every Fanorona board.
pub const ROWS: usize = 5;

/// Widest supported board (fanorona-9).
pub const MAX_COLS: usize = 9;

/// Row extent of the flat action space.
pub const X_MAX: usize = 5;

/// Column extent of the flat action space. One wider than any real board;
/// kept at 10 for wire compatibility with existing evaluator weights.
pub const Y_MAX: usize = 10;

/// Number of direction codes (keypad 1..=9).
pub const DIR_COUNT: usize = 9;

/// Number of capture codes (-1..=2, shifted to 0..=3).
pub const TAR_COUNT: usize = 4;

/// Size of the flat action index space shared by both board widths.
pub const ACTION_SPACE: usize = X_MAX * Y_MAX * DIR_COUNT * TAR_COUNT;

/// How many past positions the board remembers for the encoder.
pub const HISTORY_LEN: usize = 4;

/// Number of feature planes in an encoded position.
pub const PLANE_COUNT: usize = 2 + 2 * HISTORY_LEN + 1;
