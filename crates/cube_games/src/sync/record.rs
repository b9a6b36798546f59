//! The shared game record exchanged through the realtime channel.

use cube_tictactoe::{Board, Coord, Mark, WinLine};

/// Outcome as published on the wire.
///
/// Wins carry the winner's display name rather than a mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A player completed `line`.
    Win {
        /// Display name of the winner.
        winner_name: String,
        /// The completed line.
        line: WinLine,
    },
    /// Board filled with no line.
    Draw,
}

/// Complete session state as published to a room.
///
/// Every change republishes the whole record; there is no move stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteGameRecord {
    /// The board.
    pub board: Board,
    /// Mark whose turn it is.
    pub active_mark: Mark,
    /// Host's display name (plays A).
    pub player_a_name: String,
    /// Guest's display name (plays B); empty until someone joins.
    pub player_b_name: String,
    /// Whether the second player has claimed B.
    pub peer_joined: bool,
    /// `None` while the game is in progress.
    pub outcome: Option<RecordOutcome>,
    /// Most recent move, for highlighting only.
    pub last_move: Option<Coord>,
}

impl RemoteGameRecord {
    /// Initial record published by a host: empty board, nobody joined.
    pub fn opening(host_name: impl Into<String>) -> Self {
        Self {
            board: Board::new(),
            active_mark: Mark::A,
            player_a_name: host_name.into(),
            player_b_name: String::new(),
            peer_joined: false,
            outcome: None,
            last_move: None,
        }
    }
}
