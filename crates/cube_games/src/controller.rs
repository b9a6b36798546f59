//! The game session state machine.
//!
//! [`GameController`] is the single owner of the current [`Session`]. Every
//! input (a click, an AI turn, a remote snapshot, a timer) goes through one of
//! its methods, which updates the session synchronously and returns the
//! [`Effect`]s the caller must carry out: publishing to the room, or arming a
//! timer. Timers carry a [`Ticket`]; a ticket from an earlier session or round
//! is ignored when it fires.

use crate::config::GameConfig;
use crate::session::{GameMode, Phase, ScoreTally, Session};
use crate::sync::{RemoteGameRecord, RoomCode};
use cube_tictactoe::{Coord, Difficulty, Mark, Outcome, check_winner, choose_move, is_full};
use derive_more::Display;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// The AI always plays the second mark.
pub const AI_MARK: Mark = Mark::B;

/// Epoch stamp for deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("ticket#{}", _0)]
pub struct Ticket(u64);

/// Who submitted a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveSource {
    /// A click in this client's view.
    Human,
    /// The computer opponent.
    Ai,
}

/// Why a move was refused. The session is unchanged after any rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveRejection {
    /// No game is being played.
    #[display("No game in progress")]
    NotPlaying,
    /// The round already has a result.
    #[display("Game is over")]
    GameOver,
    /// The target cell is taken.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(Coord),
    /// It is the other side's turn; carries the mark that is to move.
    #[display("Wait for your opponent's move")]
    OutOfTurn(Mark),
}

impl std::error::Error for MoveRejection {}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the room record with this one.
    Publish(RemoteGameRecord),
    /// Call [`GameController::run_ai_turn`] with `ticket` after `delay`.
    ScheduleAiMove {
        /// Stamp to hand back.
        ticket: Ticket,
        /// Pause before the AI plays.
        delay: Duration,
    },
    /// Call [`GameController::finish_outcome_display`] with `ticket` after `delay`.
    ScheduleOutcomeDisplay {
        /// Stamp to hand back.
        ticket: Ticket,
        /// How long the result stays on screen.
        delay: Duration,
    },
}

/// Owns the session and drives every transition.
#[derive(Debug)]
pub struct GameController {
    config: GameConfig,
    phase: Phase,
    session: Option<Session>,
    tally: ScoreTally,
    epoch: u64,
    status: String,
    rng: StdRng,
}

impl GameController {
    /// Creates a controller at the menu with an entropy-seeded RNG.
    #[instrument(skip(config))]
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a controller with a fixed seed for reproducible AI play.
    #[instrument(skip(config))]
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            config,
            phase: Phase::Menu,
            session: None,
            tally: ScoreTally::default(),
            epoch: 0,
            status: String::new(),
            rng,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Results since the session started.
    pub fn tally(&self) -> &ScoreTally {
        &self.tally
    }

    /// Status line for the view.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Configuration in use.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Stamp for work scheduled now.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.epoch)
    }

    /// The session as a room record, online only.
    pub fn record(&self) -> Option<RemoteGameRecord> {
        self.session
            .as_ref()
            .filter(|s| s.is_online())
            .map(Session::to_record)
    }

    /// Whether `coord` lies on the winning line.
    pub fn is_winning_cell(&self, coord: Coord) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.outcome().win())
            .is_some_and(|win| win.line.contains(coord))
    }

    /// Starts a two-player game on this client.
    #[instrument(skip(self))]
    pub fn start_local(&mut self) {
        let session = Session::local(self.config.local_names());
        info!("Starting local game");
        self.begin(session, Phase::Playing);
    }

    /// Starts a game against the AI; the human plays A and moves first.
    #[instrument(skip(self))]
    pub fn start_ai(&mut self, difficulty: Difficulty) {
        let session = Session::against_ai(difficulty, self.config.ai_names());
        info!(%difficulty, "Starting game against AI");
        self.begin(session, Phase::Playing);
    }

    /// Enters a freshly created room as host. The opening record is already
    /// published; play starts once a guest is seen.
    #[instrument(skip(self), fields(room = %room))]
    pub fn host_online(&mut self, room: RoomCode, host_name: &str) {
        info!("Hosting online game");
        self.begin(Session::hosting(room, host_name), Phase::WaitingForPeer);
    }

    /// Enters a room as guest from the record this client just claimed.
    #[instrument(skip(self, record), fields(room = %room))]
    pub fn join_online(&mut self, room: RoomCode, record: &RemoteGameRecord) -> Vec<Effect> {
        info!(host = %record.player_a_name, "Joining online game");
        self.begin(Session::joined(room, record), Phase::Playing);
        self.apply_remote(record)
    }

    fn begin(&mut self, session: Session, phase: Phase) {
        self.epoch += 1;
        self.tally = ScoreTally::default();
        self.session = Some(session);
        self.phase = phase;
        self.refresh_status();
    }

    /// Validates and applies a move.
    ///
    /// Rejections leave board, turn and outcome untouched; only the status
    /// line may change.
    #[instrument(skip(self), fields(%coord))]
    pub fn submit_move(
        &mut self,
        coord: Coord,
        source: MoveSource,
    ) -> Result<Vec<Effect>, MoveRejection> {
        let rejection = self.check_move(coord, source);
        let Some(session) = self.session.as_mut() else {
            return Err(MoveRejection::NotPlaying);
        };
        if let Err(rejection) = rejection {
            warn!(%rejection, "Move rejected");
            if let MoveRejection::OutOfTurn(_) = rejection
                && session.is_online()
            {
                self.status = rejection.to_string();
            }
            return Err(rejection);
        }

        let mark = *session.active_mark();
        let board = session.board().apply_mark(coord, mark);
        let outcome = match check_winner(&board) {
            Some(win) => Outcome::Won(win),
            None if is_full(&board) => Outcome::Draw,
            None => Outcome::InProgress,
        };
        session.place(coord, outcome);
        debug!(%mark, %outcome, "Move applied");

        let mut effects = Vec::new();
        if session.is_online() {
            effects.push(Effect::Publish(session.to_record()));
        }
        let ai_to_move = matches!(session.mode(), GameMode::Ai(_))
            && *session.active_mark() == AI_MARK
            && outcome.is_in_progress()
            && source == MoveSource::Human;

        if !outcome.is_in_progress() {
            effects.push(self.enter_outcome(outcome));
        } else {
            self.refresh_status();
        }
        if ai_to_move {
            effects.push(Effect::ScheduleAiMove {
                ticket: self.ticket(),
                delay: self.config.ai_move_delay(),
            });
        }
        Ok(effects)
    }

    fn check_move(&self, coord: Coord, source: MoveSource) -> Result<(), MoveRejection> {
        let Some(session) = self.session.as_ref() else {
            return Err(MoveRejection::NotPlaying);
        };
        if !session.outcome().is_in_progress() {
            return Err(MoveRejection::GameOver);
        }
        if self.phase != Phase::Playing {
            return Err(MoveRejection::NotPlaying);
        }
        if !session.board().is_empty(coord) {
            return Err(MoveRejection::CellOccupied(coord));
        }
        let active = *session.active_mark();
        if source == MoveSource::Human {
            let human_blocked = match session.mode() {
                GameMode::Online => *session.local_mark() != Some(active),
                GameMode::Ai(_) => active == AI_MARK,
                GameMode::Local => false,
            };
            if human_blocked {
                return Err(MoveRejection::OutOfTurn(active));
            }
        }
        Ok(())
    }

    /// Records a finished round and arms the display timer.
    fn enter_outcome(&mut self, outcome: Outcome) -> Effect {
        self.tally.record(&outcome);
        self.phase = Phase::ShowingOutcome;
        self.refresh_status();
        info!(%outcome, "Round finished");
        let delay = if outcome.is_draw() {
            self.config.draw_display()
        } else {
            self.config.win_display()
        };
        Effect::ScheduleOutcomeDisplay {
            ticket: self.ticket(),
            delay,
        }
    }

    /// Plays the AI's move if `ticket` is still current.
    #[instrument(skip(self), fields(%ticket))]
    pub fn run_ai_turn(&mut self, ticket: Ticket) -> Vec<Effect> {
        if ticket != self.ticket() {
            debug!("Discarding stale AI turn");
            return Vec::new();
        }
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let Some(difficulty) = session.difficulty() else {
            return Vec::new();
        };
        if self.phase != Phase::Playing || *session.active_mark() != AI_MARK {
            return Vec::new();
        }

        let board = *session.board();
        let Some(coord) =
            choose_move(&board, AI_MARK, difficulty, AI_MARK.opponent(), &mut self.rng)
        else {
            return Vec::new();
        };
        match self.submit_move(coord, MoveSource::Ai) {
            Ok(effects) => effects,
            Err(rejection) => {
                warn!(%rejection, "AI move was refused");
                Vec::new()
            }
        }
    }

    /// Ends the outcome display if `ticket` is still current.
    #[instrument(skip(self), fields(%ticket))]
    pub fn finish_outcome_display(&mut self, ticket: Ticket) {
        if ticket != self.ticket() || self.phase != Phase::ShowingOutcome {
            debug!("Discarding stale outcome timer");
            return;
        }
        self.phase = Phase::GameOver;
    }

    /// Resets the board for another round, keeping players and tally.
    #[instrument(skip(self))]
    pub fn play_again(&mut self) -> Vec<Effect> {
        if !matches!(
            self.phase,
            Phase::Playing | Phase::ShowingOutcome | Phase::GameOver
        ) {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.reset_round();
        let effects = if session.is_online() {
            vec![Effect::Publish(session.to_record())]
        } else {
            Vec::new()
        };
        self.epoch += 1;
        self.phase = Phase::Playing;
        self.refresh_status();
        info!(rounds = self.tally.rounds(), "Playing again");
        effects
    }

    /// Returns to the menu, dropping the session and tally. Returns the
    /// room that must be torn down, if any.
    #[instrument(skip(self))]
    pub fn back_to_menu(&mut self) -> Option<RoomCode> {
        self.epoch += 1;
        self.phase = Phase::Menu;
        self.tally = ScoreTally::default();
        self.status.clear();
        self.session
            .take()
            .and_then(|session| session.room_code().clone())
    }

    /// Applies a snapshot of the room record.
    ///
    /// Re-applying the record this client just published changes nothing.
    /// An undecided record arriving after a finished round is the peer playing
    /// again and starts a new round here too, even if moves of that round
    /// already landed.
    #[instrument(skip(self, record))]
    pub fn apply_remote(&mut self, record: &RemoteGameRecord) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if !session.is_online() {
            return Vec::new();
        }

        let was_decided = !session.outcome().is_in_progress();
        let peer_restarted = was_decided && record.outcome.is_none();

        session.overwrite_from(record);
        let outcome = *session.outcome();
        let peer_joined = *session.peer_joined();

        if peer_restarted {
            info!("Peer started another round");
            self.epoch += 1;
            self.phase = Phase::Playing;
        } else if self.phase == Phase::WaitingForPeer && peer_joined {
            info!("Opponent joined");
            self.phase = Phase::Playing;
        }

        if !was_decided && !outcome.is_in_progress() && self.phase == Phase::Playing {
            return vec![self.enter_outcome(outcome)];
        }
        self.refresh_status();
        Vec::new()
    }

    /// The room record disappeared: the other client left.
    #[instrument(skip(self))]
    pub fn remote_closed(&mut self) -> Option<RoomCode> {
        if !self.session.as_ref().is_some_and(Session::is_online) {
            return None;
        }
        warn!("Room record was removed");
        let room = self.back_to_menu();
        self.status = "Opponent left the game".to_string();
        room
    }

    /// Sets a transient status message, such as a boundary error.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn refresh_status(&mut self) {
        let Some(session) = self.session.as_ref() else {
            self.status.clear();
            return;
        };
        self.status = match (self.phase, session.outcome()) {
            (Phase::WaitingForPeer, _) => "Waiting for opponent to join...".to_string(),
            (_, Outcome::Won(win)) if session.difficulty().is_some() && win.mark != AI_MARK => {
                "You win!".to_string()
            }
            (_, Outcome::Won(win)) => format!("{} wins!", session.name_of(win.mark)),
            (_, Outcome::Draw) => "It's a draw!".to_string(),
            (_, Outcome::InProgress) => match (session.mode(), *session.active_mark()) {
                (GameMode::Ai(_), mark) if mark != AI_MARK => "Your turn".to_string(),
                (_, mark) => format!("{}'s turn", session.name_of(mark)),
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(l: u8, r: u8, c: u8) -> Coord {
        Coord::new(l, r, c).unwrap()
    }

    #[test]
    fn test_menu_rejects_moves() {
        let mut controller = GameController::with_seed(GameConfig::instant(), 1);
        assert_eq!(
            controller.submit_move(Coord::CENTER, MoveSource::Human),
            Err(MoveRejection::NotPlaying)
        );
    }

    #[test]
    fn test_local_turns_alternate() {
        let mut controller = GameController::with_seed(GameConfig::instant(), 1);
        controller.start_local();
        assert_eq!(controller.status(), "Player 1's turn");

        let effects = controller
            .submit_move(coord(0, 0, 0), MoveSource::Human)
            .unwrap();
        assert!(effects.is_empty());
        assert_eq!(controller.status(), "Player 2's turn");
        let session = controller.session().unwrap();
        assert_eq!(*session.active_mark(), Mark::B);
        assert_eq!(*session.last_move(), Some(coord(0, 0, 0)));
    }

    #[test]
    fn test_stale_ticket_ignored_after_restart() {
        let mut controller = GameController::with_seed(GameConfig::instant(), 1);
        controller.start_ai(Difficulty::Hard);
        let effects = controller
            .submit_move(coord(0, 0, 0), MoveSource::Human)
            .unwrap();
        let Some(Effect::ScheduleAiMove { ticket, .. }) = effects.first().cloned() else {
            panic!("expected AI move to be scheduled, got {effects:?}");
        };

        controller.start_ai(Difficulty::Hard);
        assert!(controller.run_ai_turn(ticket).is_empty());
        assert_eq!(controller.session().unwrap().board().occupied_count(), 0);
    }
}
