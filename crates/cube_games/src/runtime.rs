//! Event loop around a [`GameController`].
//!
//! Inputs, timers and room snapshots are all funnelled into one queue and
//! handled one at a time, so the controller never sees concurrent calls.

use crate::controller::{Effect, GameController, MoveSource, Ticket};
use crate::error::{SyncError, SyncErrorKind};
use crate::sync::{RoomCode, SyncAdapter};
use crate::view::GameView;
use cube_tictactoe::Coord;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Everything the runtime reacts to.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum Event {
    /// The local player picked a cell.
    #[display("CellClicked({})", _0)]
    CellClicked(Coord),
    /// Start another round.
    PlayAgain,
    /// Leave the game.
    BackToMenu,
    /// A deferred AI move is due.
    #[display("AiTurn({})", _0)]
    AiTurn(Ticket),
    /// The outcome display time is up.
    #[display("OutcomeDisplayElapsed({})", _0)]
    OutcomeDisplayElapsed(Ticket),
    /// Shut the loop down.
    Quit,
}

/// Drives one controller, one optional room binding and one view.
pub struct GameRuntime<V> {
    controller: GameController,
    adapter: Option<SyncAdapter>,
    updates: Option<mpsc::UnboundedReceiver<Option<Value>>>,
    view: V,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl<V: GameView> GameRuntime<V> {
    /// Creates a runtime for offline play.
    #[instrument(skip_all)]
    pub fn new(controller: GameController, view: V) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            adapter: None,
            updates: None,
            view,
            events_tx,
            events_rx,
        }
    }

    /// Adds a room binding for online play.
    pub fn with_adapter(mut self, adapter: SyncAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Handle for posting events from input sources.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.events_tx.clone()
    }

    /// The controller, for inspection.
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Starts a local two-player game.
    pub fn start_local(&mut self) {
        self.controller.start_local();
        self.view.render(&self.controller);
    }

    /// Starts a game against the AI.
    pub fn start_ai(&mut self, difficulty: cube_tictactoe::Difficulty) {
        self.controller.start_ai(difficulty);
        self.view.render(&self.controller);
    }

    /// Opens a room and waits in it for a guest.
    #[instrument(skip(self))]
    pub async fn create_room(&mut self, name: &str) -> Result<RoomCode, SyncError> {
        self.leave_room().await;
        let result = match self.adapter.as_mut() {
            Some(adapter) => adapter.create_room(name).await,
            None => Err(SyncError::new(SyncErrorKind::ChannelUnavailable)),
        };
        let handle = match result {
            Ok(handle) => handle,
            Err(e) => return Err(self.report(e)),
        };
        self.controller
            .host_online(handle.code.clone(), &handle.record.player_a_name);
        self.updates = Some(handle.updates);
        self.view.render(&self.controller);
        Ok(handle.code)
    }

    /// Joins a room by code.
    #[instrument(skip(self))]
    pub async fn join_room(&mut self, code: &str, name: &str) -> Result<RoomCode, SyncError> {
        self.leave_room().await;
        let result = match self.adapter.as_mut() {
            Some(adapter) => adapter.join_room(code, name).await,
            None => Err(SyncError::new(SyncErrorKind::ChannelUnavailable)),
        };
        let handle = match result {
            Ok(handle) => handle,
            Err(e) => return Err(self.report(e)),
        };
        let effects = self
            .controller
            .join_online(handle.code.clone(), &handle.record);
        self.updates = Some(handle.updates);
        self.execute(effects).await;
        self.view.render(&self.controller);
        Ok(handle.code)
    }

    fn report(&mut self, error: SyncError) -> SyncError {
        warn!(%error, "Online request failed");
        self.controller.set_status(error.status_message());
        self.view.render(&self.controller);
        error
    }

    /// Handles one event. Returns `false` once the loop should stop.
    #[instrument(skip(self, event), fields(%event))]
    pub async fn handle(&mut self, event: Event) -> bool {
        let effects = match event {
            Event::CellClicked(coord) => self
                .controller
                .submit_move(coord, MoveSource::Human)
                .unwrap_or_else(|rejection| {
                    debug!(%rejection, "Click ignored");
                    Vec::new()
                }),
            Event::PlayAgain => self.controller.play_again(),
            Event::BackToMenu => {
                self.controller.back_to_menu();
                self.leave_room().await;
                Vec::new()
            }
            Event::AiTurn(ticket) => self.controller.run_ai_turn(ticket),
            Event::OutcomeDisplayElapsed(ticket) => {
                self.controller.finish_outcome_display(ticket);
                Vec::new()
            }
            Event::Quit => {
                self.controller.back_to_menu();
                self.leave_room().await;
                self.view.render(&self.controller);
                info!("Runtime stopping");
                return false;
            }
        };
        self.execute(effects).await;
        self.view.render(&self.controller);
        true
    }

    async fn handle_snapshot(&mut self, snapshot: Option<Value>) {
        let Some(adapter) = self.adapter.as_ref() else {
            return;
        };
        let effects = adapter.apply_snapshot(&mut self.controller, snapshot);
        if self.controller.session().is_none() {
            self.leave_room().await;
        }
        self.execute(effects).await;
        self.view.render(&self.controller);
    }

    async fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Publish(record) => {
                    let Some(adapter) = self.adapter.as_ref() else {
                        continue;
                    };
                    if let Err(e) = adapter.publish(&record).await {
                        warn!(error = %e, "Publish failed");
                        self.controller.set_status(e.status_message());
                    }
                }
                Effect::ScheduleAiMove { ticket, delay } => {
                    self.schedule(delay, Event::AiTurn(ticket));
                }
                Effect::ScheduleOutcomeDisplay { ticket, delay } => {
                    self.schedule(delay, Event::OutcomeDisplayElapsed(ticket));
                }
            }
        }
    }

    fn schedule(&self, delay: Duration, event: Event) {
        let tx = self.events_tx.clone();
        if delay.is_zero() {
            if tx.send(event).is_err() {
                debug!("Event queue closed");
            }
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).is_err() {
                debug!("Event queue closed before timer fired");
            }
        });
    }

    async fn leave_room(&mut self) {
        self.updates = None;
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.leave().await;
        }
    }

    /// Handles everything already queued, without waiting for timers.
    ///
    /// Returns the number of items handled.
    pub async fn settle(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if let Ok(event) = self.events_rx.try_recv() {
                self.handle(event).await;
                handled += 1;
                continue;
            }
            let snapshot = match self.updates.as_mut().map(|rx| rx.try_recv()) {
                Some(Ok(snapshot)) => snapshot,
                _ => break,
            };
            self.handle_snapshot(snapshot).await;
            handled += 1;
        }
        handled
    }

    /// Runs until [`Event::Quit`] or until every sender is gone.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        self.view.render(&self.controller);
        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    let Some(event) = event else { break };
                    if !self.handle(event).await {
                        break;
                    }
                }
                snapshot = next_update(&mut self.updates) => {
                    match snapshot {
                        Some(snapshot) => self.handle_snapshot(snapshot).await,
                        None => self.updates = None,
                    }
                }
            }
        }
    }
}

async fn next_update(
    updates: &mut Option<mpsc::UnboundedReceiver<Option<Value>>>,
) -> Option<Option<Value>> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
