//! Human-shareable room codes.

use crate::error::{SyncError, SyncErrorKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Six uppercase letters or digits naming one shared game record.
///
/// Codes are case-insensitive on input and always stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generates a fresh random code.
    #[instrument(skip(rng))]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Parses user input: trims, uppercases and checks the shape.
    #[instrument]
    pub fn parse(input: &str) -> Result<Self, SyncError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SyncError::new(SyncErrorKind::MissingRoomCode));
        }
        let code = trimmed.to_ascii_uppercase();
        if code.len() != ROOM_CODE_LEN || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(SyncError::new(SyncErrorKind::InvalidRoomCode(trimmed.to_string())));
        }
        Ok(Self(code))
    }

    /// The code as displayed to players.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the shared record for this room.
    pub fn record_key(&self) -> String {
        format!("games/{}", self.0)
    }
}
