//! Realtime room protocol.
//!
//! Two clients share one record per room and republish all of it on every
//! change. There is no server-side arbitration: whichever write reaches the
//! channel last is the state both clients converge on.

mod adapter;
mod channel;
pub mod codec;
mod memory;
mod record;
mod room;

pub use adapter::{RoomHandle, SyncAdapter};
pub use channel::{RealtimeChannel, Subscription, SubscriptionId};
pub use memory::InMemoryChannel;
pub use record::{RecordOutcome, RemoteGameRecord};
pub use room::{ROOM_CODE_LEN, RoomCode};
