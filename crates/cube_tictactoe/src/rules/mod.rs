//! Game rules for 3x3x3 tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart from
//! board storage so the session layer can compose them in a fixed order:
//! a win is checked before a draw.

pub mod draw;
pub mod threat;
pub mod win;

pub use draw::is_full;
pub use threat::best_completing_move;
pub use win::{Win, check_winner};
