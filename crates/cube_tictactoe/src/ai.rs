//! Heuristic move selection.
//!
//! Three named strategies, chosen by [`Difficulty`]:
//!
//! - **Hard**: win if possible, else block, else take the centre, else random.
//! - **Medium**: a coin flip between hard's win/block step and a random cell.
//! - **Easy**: any empty cell, uniformly.
//!
//! All strategies are pure functions of the board and the supplied RNG.

use crate::rules::best_completing_move;
use crate::types::{Board, Coord, Mark};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// AI strength.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Random play.
    Easy,
    /// Plays smart half of the time.
    #[default]
    Medium,
    /// Always wins or blocks when it can.
    Hard,
}

/// Picks a move for `mark` against `opponent`.
///
/// Returns `None` only when the board has no empty cell.
#[instrument(skip(board, rng))]
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    mark: Mark,
    difficulty: Difficulty,
    opponent: Mark,
    rng: &mut R,
) -> Option<Coord> {
    let choice = match difficulty {
        Difficulty::Easy => easy(board, rng),
        Difficulty::Medium => medium(board, mark, opponent, rng),
        Difficulty::Hard => hard(board, mark, opponent, rng),
    };
    debug!(?choice, "AI chose move");
    choice
}

fn easy<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Coord> {
    board.empty_cells().choose(rng).copied()
}

fn medium<R: Rng + ?Sized>(
    board: &Board,
    mark: Mark,
    opponent: Mark,
    rng: &mut R,
) -> Option<Coord> {
    if rng.gen_bool(0.5)
        && let Some(coord) = win_or_block(board, mark, opponent)
    {
        return Some(coord);
    }
    easy(board, rng)
}

fn hard<R: Rng + ?Sized>(board: &Board, mark: Mark, opponent: Mark, rng: &mut R) -> Option<Coord> {
    win_or_block(board, mark, opponent)
        .or_else(|| board.is_empty(Coord::CENTER).then_some(Coord::CENTER))
        .or_else(|| easy(board, rng))
}

fn win_or_block(board: &Board, mark: Mark, opponent: Mark) -> Option<Coord> {
    best_completing_move(board, mark).or_else(|| best_completing_move(board, opponent))
}
