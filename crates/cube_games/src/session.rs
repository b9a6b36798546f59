//! Per-game session state: mode, players, board and the running score.

use crate::sync::{RecordOutcome, RemoteGameRecord, RoomCode};
use cube_tictactoe::{Board, Coord, Difficulty, Mark, Outcome, Win};
use derive_getters::Getters;
use tracing::{debug, instrument};

/// Shown in place of the guest's name until someone joins.
pub const WAITING_NAME: &str = "Waiting...";

/// How moves reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GameMode {
    /// Two people sharing one view.
    #[display("local")]
    Local,
    /// Human (A) against the computer (B).
    #[display("ai ({})", _0)]
    Ai(Difficulty),
    /// Two clients sharing a room record.
    #[display("online")]
    Online,
}

/// Where the controller is in the menu/game cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum Phase {
    /// No session.
    #[default]
    Menu,
    /// Host has opened a room and nobody has joined yet.
    WaitingForPeer,
    /// Moves are accepted.
    Playing,
    /// The result is on screen before the game-over view.
    ShowingOutcome,
    /// Round finished; play again or leave.
    GameOver,
}

/// Round results since the session was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters)]
pub struct ScoreTally {
    /// Rounds won by A.
    a_wins: u32,
    /// Rounds won by B.
    b_wins: u32,
    /// Drawn rounds.
    draws: u32,
}

impl ScoreTally {
    /// Counts a finished round. In-progress outcomes are ignored.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Won(win) => match win.mark {
                Mark::A => self.a_wins += 1,
                Mark::B => self.b_wins += 1,
            },
            Outcome::Draw => self.draws += 1,
            Outcome::InProgress => {}
        }
    }

    /// Rounds counted so far.
    pub fn rounds(&self) -> u32 {
        self.a_wins + self.b_wins + self.draws
    }
}

/// One game between two named players.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session {
    /// How moves arrive.
    mode: GameMode,
    /// Current board.
    board: Board,
    /// Mark to move next. Not flipped by a winning move.
    active_mark: Mark,
    /// Display name for A.
    player_a_name: String,
    /// Display name for B; empty online until the guest joins.
    player_b_name: String,
    /// This client's mark online; `None` otherwise.
    local_mark: Option<Mark>,
    /// Result so far.
    outcome: Outcome,
    /// Room this session is bound to, online only.
    room_code: Option<RoomCode>,
    /// Whether the guest has claimed B.
    peer_joined: bool,
    /// Most recent move.
    last_move: Option<Coord>,
}

impl Session {
    /// Fresh local two-player session.
    pub fn local(names: &[String; 2]) -> Self {
        Self::fresh(GameMode::Local, names[0].clone(), names[1].clone(), None, None)
    }

    /// Fresh session against the AI, which plays B.
    pub fn against_ai(difficulty: Difficulty, names: &[String; 2]) -> Self {
        Self::fresh(
            GameMode::Ai(difficulty),
            names[0].clone(),
            names[1].clone(),
            None,
            None,
        )
    }

    /// Host side of an online room.
    pub fn hosting(room: RoomCode, host_name: impl Into<String>) -> Self {
        Self::fresh(
            GameMode::Online,
            host_name.into(),
            String::new(),
            Some(Mark::A),
            Some(room),
        )
    }

    /// Guest side of an online room, seeded from the record that was joined.
    pub fn joined(room: RoomCode, record: &RemoteGameRecord) -> Self {
        let mut session = Self::fresh(
            GameMode::Online,
            record.player_a_name.clone(),
            record.player_b_name.clone(),
            Some(Mark::B),
            Some(room),
        );
        session.peer_joined = true;
        session
    }

    fn fresh(
        mode: GameMode,
        player_a_name: String,
        player_b_name: String,
        local_mark: Option<Mark>,
        room_code: Option<RoomCode>,
    ) -> Self {
        Self {
            mode,
            board: Board::new(),
            active_mark: Mark::A,
            player_a_name,
            player_b_name,
            local_mark,
            outcome: Outcome::InProgress,
            room_code,
            peer_joined: false,
            last_move: None,
        }
    }

    /// Display name for `mark`.
    pub fn name_of(&self, mark: Mark) -> &str {
        match mark {
            Mark::A => &self.player_a_name,
            Mark::B if self.player_b_name.is_empty() => WAITING_NAME,
            Mark::B => &self.player_b_name,
        }
    }

    /// Whether this session is driven by a shared room record.
    pub fn is_online(&self) -> bool {
        self.mode == GameMode::Online
    }

    /// Difficulty when playing the AI.
    pub fn difficulty(&self) -> Option<Difficulty> {
        match self.mode {
            GameMode::Ai(difficulty) => Some(difficulty),
            _ => None,
        }
    }

    pub(crate) fn place(&mut self, coord: Coord, outcome: Outcome) {
        self.board = self.board.apply_mark(coord, self.active_mark);
        self.last_move = Some(coord);
        if outcome.is_in_progress() {
            self.active_mark = self.active_mark.opponent();
        }
        self.outcome = outcome;
    }

    /// Clears the board for another round; names and room are kept.
    pub(crate) fn reset_round(&mut self) {
        self.board = Board::new();
        self.active_mark = Mark::A;
        self.outcome = Outcome::InProgress;
        self.last_move = None;
    }

    /// Overwrites the shared fields from a remote record.
    #[instrument(skip(self, record))]
    pub(crate) fn overwrite_from(&mut self, record: &RemoteGameRecord) {
        self.board = record.board;
        self.active_mark = record.active_mark;
        self.player_a_name = record.player_a_name.clone();
        if !record.player_b_name.is_empty() {
            self.player_b_name = record.player_b_name.clone();
        }
        self.peer_joined = self.peer_joined || record.peer_joined;
        self.last_move = record.last_move;
        self.outcome = self.resolve_outcome(record.outcome.as_ref());
        debug!(outcome = %self.outcome, "Applied remote record");
    }

    /// Maps a wire outcome onto marks.
    ///
    /// The winner is read from the board under the line; if the line is
    /// empty there, the winner's name decides.
    fn resolve_outcome(&self, outcome: Option<&RecordOutcome>) -> Outcome {
        match outcome {
            None => Outcome::InProgress,
            Some(RecordOutcome::Draw) => Outcome::Draw,
            Some(RecordOutcome::Win { winner_name, line }) => {
                let mark = line
                    .cells()
                    .iter()
                    .find_map(|&c| self.board.get(c).mark())
                    .unwrap_or(if *winner_name == self.player_a_name {
                        Mark::A
                    } else {
                        Mark::B
                    });
                Outcome::Won(Win { mark, line: *line })
            }
        }
    }

    /// The session as a publishable record.
    pub fn to_record(&self) -> RemoteGameRecord {
        let outcome = match &self.outcome {
            Outcome::InProgress => None,
            Outcome::Draw => Some(RecordOutcome::Draw),
            Outcome::Won(win) => Some(RecordOutcome::Win {
                winner_name: self.name_of(win.mark).to_string(),
                line: win.line,
            }),
        };
        RemoteGameRecord {
            board: self.board,
            active_mark: self.active_mark,
            player_a_name: self.player_a_name.clone(),
            player_b_name: self.player_b_name.clone(),
            peer_joined: self.peer_joined,
            outcome,
            last_move: self.last_move,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_tictactoe::{WIN_LINES, check_winner};

    fn names() -> [String; 2] {
        ["Ann".to_string(), "Bob".to_string()]
    }

    #[test]
    fn test_tally_counts_finished_rounds_only() {
        let mut tally = ScoreTally::default();
        tally.record(&Outcome::InProgress);
        tally.record(&Outcome::Draw);
        tally.record(&Outcome::Won(Win {
            mark: Mark::B,
            line: WIN_LINES[0],
        }));
        assert_eq!(*tally.b_wins(), 1);
        assert_eq!(*tally.draws(), 1);
        assert_eq!(tally.rounds(), 2);
    }

    #[test]
    fn test_winning_place_keeps_active_mark() {
        let mut session = Session::local(&names());
        for coord in WIN_LINES[0].cells() {
            let board = session.board().apply_mark(coord, Mark::A);
            let outcome = check_winner(&board).map_or(Outcome::InProgress, Outcome::Won);
            // Force A to move every time.
            session.active_mark = Mark::A;
            session.place(coord, outcome);
        }
        assert_eq!(*session.active_mark(), Mark::A);
        assert_eq!(session.outcome().winner(), Some(Mark::A));
    }

    #[test]
    fn test_record_names_winner_and_resolves_back() {
        let room = RoomCode::parse("abc123").unwrap();
        let mut host = Session::hosting(room.clone(), "Ann");
        let line = WIN_LINES[5];
        host.active_mark = Mark::B;
        for coord in line.cells() {
            host.board = host.board.apply_mark(coord, Mark::B);
        }
        host.player_b_name = "Bob".to_string();
        host.outcome = Outcome::Won(Win { mark: Mark::B, line });

        let record = host.to_record();
        assert_eq!(
            record.outcome,
            Some(RecordOutcome::Win {
                winner_name: "Bob".to_string(),
                line
            })
        );

        let mut guest = Session::joined(room, &record);
        guest.overwrite_from(&record);
        assert_eq!(guest.outcome().winner(), Some(Mark::B));
    }

    #[test]
    fn test_unresolvable_board_falls_back_to_winner_name() {
        let room = RoomCode::parse("abc123").unwrap();
        let mut record = RemoteGameRecord::opening("Ann");
        record.outcome = Some(RecordOutcome::Win {
            winner_name: "Ann".to_string(),
            line: WIN_LINES[0],
        });
        let mut session = Session::hosting(room, "Ann");
        session.overwrite_from(&record);
        assert_eq!(session.outcome().winner(), Some(Mark::A));
    }

    #[test]
    fn test_guest_name_placeholder() {
        let session = Session::hosting(RoomCode::parse("QWERTY").unwrap(), "Ann");
        assert_eq!(session.name_of(Mark::B), WAITING_NAME);
    }
}
