//! Errors raised at the online boundary (channel, rooms, entitlement).
//!
//! None of these reach the session state machine; the runtime turns them into
//! a status line via [`SyncError::status_message`].

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong while talking to the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SyncErrorKind {
    /// No live connection to the channel.
    #[display("Connection error")]
    ChannelUnavailable,
    /// Nothing is published under the room code.
    #[display("Game not found")]
    RoomNotFound,
    /// The room already has its second player.
    #[display("Game already has two players")]
    RoomFull,
    /// Player name was blank.
    #[display("Please enter your name")]
    MissingName,
    /// Room code was blank.
    #[display("Please enter a game code")]
    MissingRoomCode,
    /// Room code was not six letters or digits.
    #[display("Invalid game code: {}", _0)]
    InvalidRoomCode(String),
    /// The identity may not play online.
    #[display("{}", if *signed_in { "Subscribe to play online" } else { "Sign in to play online" })]
    EntitlementDenied {
        /// Whether an identity was present at all.
        signed_in: bool,
    },
    /// The channel reported a failure.
    #[display("Transport error: {}", _0)]
    Transport(String),
}

/// Online boundary error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Sync error: {} at {}:{}", kind, file, line)]
pub struct SyncError {
    /// Error category.
    pub kind: SyncErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SyncError {
    /// Creates a new sync error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: SyncErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates a transport error from any displayable failure.
    #[track_caller]
    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::new(SyncErrorKind::Transport(message.to_string()))
    }

    /// User-facing text for the status line.
    pub fn status_message(&self) -> String {
        self.kind.to_string()
    }
}
