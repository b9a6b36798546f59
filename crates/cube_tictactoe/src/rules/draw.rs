//! Draw detection.

use crate::types::{Board, Cell};
use tracing::instrument;

/// Checks if the board is full (all 27 cells occupied).
///
/// A full board is only a draw when [`check_winner`](super::check_winner)
/// finds nothing; the last move can fill the board and complete a line.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| *c != Cell::Empty)
}
