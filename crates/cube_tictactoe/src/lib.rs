//! Pure game logic for 3x3x3 ("3D") tic-tac-toe.
//!
//! - [`Board`]: 27 cells addressed by [`Coord`] `(layer, row, col)`
//! - [`WIN_LINES`]: the 49 straight lines of three through the cube
//! - [`check_winner`], [`is_full`], [`best_completing_move`]: rules
//! - [`choose_move`]: heuristic AI parameterised by [`Difficulty`]
//!
//! Nothing here performs I/O or keeps state between calls.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod ai;
mod lines;
mod phases;
mod rules;
mod types;

pub use ai::{Difficulty, choose_move};
pub use lines::{LINE_COUNT, WIN_LINES, WinLine, win_lines};
pub use phases::Outcome;
pub use rules::{Win, best_completing_move, check_winner, is_full};
pub use types::{Board, CELL_COUNT, Cell, Coord, CoordOutOfRange, Mark, SIDE};
