//! Presentation seam.
//!
//! A view only draws; input reaches the runtime as [`Event`](crate::Event)s.

use crate::controller::GameController;
use crate::session::Phase;
use cube_tictactoe::Mark;
use std::io::Write;
use tracing::warn;

/// Something that can show the current game.
pub trait GameView {
    /// Redraws from the controller's current state.
    fn render(&mut self, controller: &GameController);
}

/// Plain-text view for terminals.
#[derive(Debug)]
pub struct TextView<W> {
    out: W,
    last_frame: String,
}

impl<W: Write> TextView<W> {
    /// Writes frames to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_frame: String::new(),
        }
    }

    /// The most recent frame.
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }
}

impl TextView<std::io::Stdout> {
    /// A view on standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

/// Formats the controller's state as text.
pub fn frame(controller: &GameController) -> String {
    let mut text = String::new();
    let Some(session) = controller.session() else {
        text.push_str("== Menu ==\n");
        if !controller.status().is_empty() {
            text.push_str(controller.status());
            text.push('\n');
        }
        return text;
    };

    text.push_str(&format!(
        "== {} vs {} ({}) ==\n",
        session.name_of(Mark::A),
        session.name_of(Mark::B),
        session.mode()
    ));
    if let Some(room) = session.room_code() {
        text.push_str(&format!("Game code: {room}\n"));
    }
    text.push_str(&session.board().display());
    if let Some(win) = session.outcome().win() {
        text.push_str(&format!("Winning line: {}\n", win.line));
    }
    let tally = controller.tally();
    text.push_str(&format!(
        "Score: {} {} - {} {} ({} draws)\n",
        session.name_of(Mark::A),
        tally.a_wins(),
        tally.b_wins(),
        session.name_of(Mark::B),
        tally.draws()
    ));
    text.push_str(controller.status());
    text.push('\n');
    if controller.phase() == Phase::GameOver {
        text.push_str("Type 'again' to play again or 'menu' to leave\n");
    }
    text
}

impl<W: Write> GameView for TextView<W> {
    fn render(&mut self, controller: &GameController) {
        let next = frame(controller);
        if next == self.last_frame {
            return;
        }
        if let Err(e) = self.out.write_all(next.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to draw frame");
        }
        self.last_frame = next;
    }
}
