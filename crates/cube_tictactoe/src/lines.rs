//! The table of winning lines through the cube.
//!
//! A winning line is any three collinear cells. In a 3x3x3 cube there are
//! exactly 49 of them:
//!
//! | family | count |
//! |---|---|
//! | rows within a layer | 9 |
//! | columns within a layer | 9 |
//! | diagonals within a layer | 6 |
//! | verticals through the layers | 9 |
//! | row-plane diagonals through the layers | 6 |
//! | column-plane diagonals through the layers | 6 |
//! | space diagonals through the centre | 4 |
//!
//! The table order is fixed; [`check_winner`](crate::check_winner) and
//! [`best_completing_move`](crate::best_completing_move) report the first
//! match in this order.

use crate::types::Coord;
use serde::{Deserialize, Serialize};

/// Number of winning lines in the cube.
pub const LINE_COUNT: usize = 49;

/// Three collinear cells, ordered from one end of the line to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinLine {
    cells: [Coord; 3],
}

impl WinLine {
    const fn raw(a: [u8; 3], b: [u8; 3], c: [u8; 3]) -> Self {
        Self {
            cells: [
                Coord::raw(a[0], a[1], a[2]),
                Coord::raw(b[0], b[1], b[2]),
                Coord::raw(c[0], c[1], c[2]),
            ],
        }
    }

    /// Creates a line from three coordinates if they are distinct and
    /// collinear with a constant step.
    pub fn new(cells: [Coord; 3]) -> Option<Self> {
        let line = Self { cells };
        line.is_straight().then_some(line)
    }

    /// The three cells of the line.
    pub fn cells(&self) -> [Coord; 3] {
        self.cells
    }

    /// Checks whether `coord` lies on this line.
    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    /// Cells as `[[layer, row, col]; 3]`.
    pub fn to_arrays(&self) -> [[u8; 3]; 3] {
        self.cells.map(Coord::to_array)
    }

    fn is_straight(&self) -> bool {
        let [a, b, c] = self.cells.map(|p| p.to_array().map(i16::from));
        let step1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let step2 = [c[0] - b[0], c[1] - b[1], c[2] - b[2]];
        step1 == step2 && step1 != [0, 0, 0]
    }
}

impl std::fmt::Display for WinLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.cells;
        write!(f, "{a}-{b}-{c}")
    }
}

/// Every winning line, in table order.
pub const WIN_LINES: [WinLine; LINE_COUNT] = build_lines();

/// Returns the winning line table.
pub fn win_lines() -> &'static [WinLine; LINE_COUNT] {
    &WIN_LINES
}

const fn build_lines() -> [WinLine; LINE_COUNT] {
    let mut lines = [WinLine::raw([0, 0, 0], [0, 0, 0], [0, 0, 0]); LINE_COUNT];
    let mut n = 0;

    // Rows within each layer
    let mut layer = 0;
    while layer < 3 {
        let mut row = 0;
        while row < 3 {
            lines[n] = WinLine::raw([layer, row, 0], [layer, row, 1], [layer, row, 2]);
            n += 1;
            row += 1;
        }
        layer += 1;
    }

    // Columns within each layer
    let mut layer = 0;
    while layer < 3 {
        let mut col = 0;
        while col < 3 {
            lines[n] = WinLine::raw([layer, 0, col], [layer, 1, col], [layer, 2, col]);
            n += 1;
            col += 1;
        }
        layer += 1;
    }

    // Diagonals within each layer
    let mut layer = 0;
    while layer < 3 {
        lines[n] = WinLine::raw([layer, 0, 0], [layer, 1, 1], [layer, 2, 2]);
        lines[n + 1] = WinLine::raw([layer, 0, 2], [layer, 1, 1], [layer, 2, 0]);
        n += 2;
        layer += 1;
    }

    // Verticals through the layers
    let mut row = 0;
    while row < 3 {
        let mut col = 0;
        while col < 3 {
            lines[n] = WinLine::raw([0, row, col], [1, row, col], [2, row, col]);
            n += 1;
            col += 1;
        }
        row += 1;
    }

    // Diagonals through the layers, varying row
    let mut col = 0;
    while col < 3 {
        lines[n] = WinLine::raw([0, 0, col], [1, 1, col], [2, 2, col]);
        lines[n + 1] = WinLine::raw([0, 2, col], [1, 1, col], [2, 0, col]);
        n += 2;
        col += 1;
    }

    // Diagonals through the layers, varying column
    let mut row = 0;
    while row < 3 {
        lines[n] = WinLine::raw([0, row, 0], [1, row, 1], [2, row, 2]);
        lines[n + 1] = WinLine::raw([0, row, 2], [1, row, 1], [2, row, 0]);
        n += 2;
        row += 1;
    }

    // Space diagonals
    lines[n] = WinLine::raw([0, 0, 0], [1, 1, 1], [2, 2, 2]);
    lines[n + 1] = WinLine::raw([0, 0, 2], [1, 1, 1], [2, 2, 0]);
    lines[n + 2] = WinLine::raw([0, 2, 0], [1, 1, 1], [2, 0, 2]);
    lines[n + 3] = WinLine::raw([0, 2, 2], [1, 1, 1], [2, 0, 0]);
    n += 4;

    assert!(n == LINE_COUNT);
    lines
}
