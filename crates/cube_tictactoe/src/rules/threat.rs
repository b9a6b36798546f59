//! Finding the cell that completes a line.
//!
//! Used both offensively (complete my own line) and defensively (block the
//! opponent's line) by the AI.

use crate::lines::{WIN_LINES, WinLine};
use crate::types::{Board, Cell, Coord, Mark};
use tracing::{debug, instrument};

/// Returns the first empty cell (in line-table order) that would give `mark`
/// three in a row.
#[instrument(skip(board))]
pub fn best_completing_move(board: &Board, mark: Mark) -> Option<Coord> {
    let found = WIN_LINES
        .iter()
        .find_map(|line| completing_cell(board, mark, line));
    debug!(?found, "Scanned lines for completing move");
    found
}

/// The empty cell of `line` if the other two hold `mark`.
fn completing_cell(board: &Board, mark: Mark, line: &WinLine) -> Option<Coord> {
    let mut owned = 0;
    let mut empty = None;

    for coord in line.cells() {
        match board.get(coord) {
            Cell::Empty if empty.is_none() => empty = Some(coord),
            Cell::Occupied(m) if m == mark => owned += 1,
            _ => return None,
        }
    }

    if owned == 2 { empty } else { None }
}
