//! Cube Games library - play modes and online sync for 3D tic-tac-toe
//!
//! Builds the playable game on top of the pure rules in `cube_tictactoe`.
//!
//! # Architecture
//!
//! - **Controller**: the session state machine; every move goes through it
//!   whether it came from a click, the AI or a remote snapshot
//! - **Sync**: room codes, the shared record and its wire codec, the realtime
//!   channel seam and the adapter binding a controller to a room
//! - **Entitlement**: the capability check for online play
//! - **Runtime**: one event queue feeding the controller, timers included
//!
//! # Example
//!
//! ```
//! use cube_games::{GameConfig, GameController, MoveSource, Phase};
//! use cube_tictactoe::Coord;
//!
//! let mut controller = GameController::with_seed(GameConfig::instant(), 7);
//! controller.start_local();
//! controller.submit_move(Coord::CENTER, MoveSource::Human).unwrap();
//! assert_eq!(controller.phase(), Phase::Playing);
//! assert_eq!(controller.status(), "Player 2's turn");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod controller;
mod entitlement;
mod error;
mod runtime;
mod session;
pub mod sync;
mod view;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - State machine
pub use controller::{AI_MARK, Effect, GameController, MoveRejection, MoveSource, Ticket};
pub use session::{GameMode, Phase, ScoreTally, Session, WAITING_NAME};

// Crate-level exports - Online play
pub use entitlement::{
    EntitlementGate, GateError, Identity, OpenGate, Plan, Subscription, SubscriptionGate,
    SubscriptionStatus, gate_from_config,
};
pub use error::{SyncError, SyncErrorKind};
pub use sync::{
    InMemoryChannel, RealtimeChannel, RecordOutcome, RemoteGameRecord, RoomCode, RoomHandle,
    SyncAdapter,
};

// Crate-level exports - Runtime and presentation
pub use runtime::{Event, GameRuntime};
pub use view::{GameView, TextView, frame};
