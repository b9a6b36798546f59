//! Core domain types for 3x3x3 tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells along each axis of the cube.
pub const SIDE: u8 = 3;

/// Total number of cells in the cube.
pub const CELL_COUNT: usize = 27;

/// Mark placed by a player.
///
/// `A` always opens a fresh game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Mark {
    /// First player's mark.
    #[display("A")]
    A,
    /// Second player's mark.
    #[display("B")]
    B,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::A => Mark::B,
            Mark::B => Mark::A,
        }
    }

    /// Wire token for this mark.
    pub fn token(self) -> &'static str {
        match self {
            Mark::A => "A",
            Mark::B => "B",
        }
    }

    /// Parses a wire token. Anything other than `"A"` or `"B"` is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "A" => Some(Mark::A),
            "B" => Some(Mark::B),
            _ => None,
        }
    }
}

/// A single cell of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Cell claimed by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }
}

/// A cell coordinate `(layer, row, col)`, each component in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    layer: u8,
    row: u8,
    col: u8,
}

impl Coord {
    /// The centre of the cube, `(1, 1, 1)`.
    pub const CENTER: Coord = Coord::raw(1, 1, 1);

    /// Creates a coordinate, returning `None` if any component is out of range.
    pub fn new(layer: u8, row: u8, col: u8) -> Option<Self> {
        (layer < SIDE && row < SIDE && col < SIDE).then_some(Self::raw(layer, row, col))
    }

    pub(crate) const fn raw(layer: u8, row: u8, col: u8) -> Self {
        Self { layer, row, col }
    }

    /// Layer component (vertical stack).
    pub fn layer(self) -> u8 {
        self.layer
    }

    /// Row component within a layer.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column component within a row.
    pub fn col(self) -> u8 {
        self.col
    }

    /// Components as `[layer, row, col]`.
    pub fn to_array(self) -> [u8; 3] {
        [self.layer, self.row, self.col]
    }

    /// Flat index in `0..27`, layer-major.
    pub fn index(self) -> usize {
        usize::from(self.layer) * 9 + usize::from(self.row) * 3 + usize::from(self.col)
    }

    /// Inverse of [`Coord::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= CELL_COUNT {
            return None;
        }
        // index < 27, so every component fits in u8
        Some(Self::raw(
            (index / 9) as u8,
            (index / 3 % 3) as u8,
            (index % 3) as u8,
        ))
    }

    /// All 27 coordinates in layer-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..CELL_COUNT).filter_map(Self::from_index)
    }
}

impl TryFrom<[u8; 3]> for Coord {
    type Error = CoordOutOfRange;

    fn try_from([layer, row, col]: [u8; 3]) -> Result<Self, Self::Error> {
        Coord::new(layer, row, col).ok_or(CoordOutOfRange([layer, row, col]))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.layer, self.row, self.col)
    }
}

/// A coordinate component was outside `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Coordinate {:?} is outside the 3x3x3 cube", _0)]
pub struct CoordOutOfRange(pub [u8; 3]);

impl std::error::Error for CoordOutOfRange {}

/// The 3x3x3 board.
///
/// Boards are values: every move produces a new board rather than mutating
/// the one held by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Builds a board from cells in layer-major order.
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Returns the cell at `coord`.
    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.index()]
    }

    /// Checks if the cell at `coord` is empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord) == Cell::Empty
    }

    /// All cells in layer-major order.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Returns a new board with `coord` set to `mark`.
    ///
    /// The cell must be empty; callers validate this first. Overwriting a
    /// claimed cell is a logic error and trips a debug assertion.
    #[instrument(skip(self))]
    pub fn apply_mark(&self, coord: Coord, mark: Mark) -> Board {
        debug_assert!(self.is_empty(coord), "cell {coord} is already occupied");
        let mut next = *self;
        next.cells[coord.index()] = Cell::Occupied(mark);
        next
    }

    /// Coordinates of every empty cell, layer-major.
    pub fn empty_cells(&self) -> Vec<Coord> {
        Coord::all().filter(|&c| self.is_empty(c)).collect()
    }

    /// Number of claimed cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// Formats the board as three side-by-side layers.
    pub fn display(&self) -> String {
        let mut out = String::from("layer 0   layer 1   layer 2\n");
        for row in 0..SIDE {
            for layer in 0..SIDE {
                for col in 0..SIDE {
                    let symbol = match self.get(Coord::raw(layer, row, col)) {
                        Cell::Empty => ".",
                        Cell::Occupied(mark) => mark.token(),
                    };
                    out.push_str(symbol);
                    if col < SIDE - 1 {
                        out.push('|');
                    }
                }
                if layer < SIDE - 1 {
                    out.push_str("     ");
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_covers_cube() {
        let all: Vec<_> = Coord::all().collect();
        assert_eq!(all.len(), CELL_COUNT);
        for (i, c) in all.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        assert_eq!(Coord::from_index(27), None);
    }

    #[test]
    fn test_out_of_range_coord_rejected() {
        assert_eq!(Coord::new(3, 0, 0), None);
        assert!(Coord::try_from([0, 0, 5]).is_err());
        assert_eq!(Coord::try_from([1, 1, 1]), Ok(Coord::CENTER));
    }

    #[test]
    fn test_apply_mark_leaves_original_untouched() {
        let board = Board::new();
        let next = board.apply_mark(Coord::CENTER, Mark::A);
        assert!(board.is_empty(Coord::CENTER));
        assert_eq!(next.get(Coord::CENTER), Cell::Occupied(Mark::A));
        assert_eq!(next.occupied_count(), 1);
        assert_eq!(next.empty_cells().len(), 26);
    }

    #[test]
    fn test_mark_tokens() {
        assert_eq!(Mark::from_token(Mark::A.token()), Some(Mark::A));
        assert_eq!(Mark::from_token("b"), None);
        assert_eq!(Mark::B.opponent(), Mark::A);
    }
}
