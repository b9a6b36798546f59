//! Game outcome.

use crate::rules::Win;
use crate::types::Mark;
use serde::{Deserialize, Serialize};

/// Outcome of the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// No line completed and cells remain.
    #[default]
    InProgress,
    /// A mark completed a line.
    Won(Win),
    /// Board filled with no line.
    Draw,
}

impl Outcome {
    /// Returns true while moves are still accepted.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Won(win) => Some(win.mark),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    /// Returns the winning line if there is one.
    pub fn win(&self) -> Option<&Win> {
        match self {
            Outcome::Won(win) => Some(win),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "In progress"),
            Outcome::Won(win) => write!(f, "Mark {} wins along {}", win.mark, win.line),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
