//! Win detection over the 49-line table.

use crate::lines::{WIN_LINES, WinLine};
use crate::types::{Board, Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A completed line and the mark that completed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Win {
    /// The winning mark.
    pub mark: Mark,
    /// The line of three.
    pub line: WinLine,
}

/// Checks if there is a winner on the board.
///
/// Scans the line table in order and returns the first line whose three
/// cells hold the same mark.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Win> {
    WIN_LINES.iter().find_map(|line| {
        let [a, b, c] = line.cells().map(|coord| board.get(coord));
        match a {
            Cell::Occupied(mark) if a == b && b == c => Some(Win { mark, line: *line }),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn at(layer: u8, row: u8, col: u8) -> Coord {
        Coord::new(layer, row, col).unwrap()
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_winner_vertical_through_center() {
        let board = Board::new()
            .apply_mark(at(0, 1, 1), Mark::A)
            .apply_mark(at(1, 1, 1), Mark::A)
            .apply_mark(at(2, 1, 1), Mark::A);
        let win = check_winner(&board).unwrap();
        assert_eq!(win.mark, Mark::A);
        assert_eq!(win.line.to_arrays(), [[0, 1, 1], [1, 1, 1], [2, 1, 1]]);
    }

    #[test]
    fn test_winner_space_diagonal() {
        let board = Board::new()
            .apply_mark(at(0, 2, 2), Mark::B)
            .apply_mark(at(1, 1, 1), Mark::B)
            .apply_mark(at(2, 0, 0), Mark::B);
        assert_eq!(check_winner(&board).map(|w| w.mark), Some(Mark::B));
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let board = Board::new()
            .apply_mark(at(0, 0, 0), Mark::A)
            .apply_mark(at(0, 0, 1), Mark::B)
            .apply_mark(at(0, 0, 2), Mark::A);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_first_line_in_table_order_reported() {
        // Completes both the layer-0 top row and the layer-0 left column.
        let board = Board::new()
            .apply_mark(at(0, 0, 0), Mark::A)
            .apply_mark(at(0, 0, 1), Mark::A)
            .apply_mark(at(0, 0, 2), Mark::A)
            .apply_mark(at(0, 1, 0), Mark::A)
            .apply_mark(at(0, 2, 0), Mark::A);
        let win = check_winner(&board).unwrap();
        assert_eq!(win.line.to_arrays(), [[0, 0, 0], [0, 0, 1], [0, 0, 2]]);
    }
}
