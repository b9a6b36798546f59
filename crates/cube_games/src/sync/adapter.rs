//! Binds a [`GameController`] to a room on a [`RealtimeChannel`].

use super::channel::{RealtimeChannel, SubscriptionId};
use super::codec;
use super::record::RemoteGameRecord;
use super::room::RoomCode;
use crate::controller::{Effect, GameController};
use crate::entitlement::{EntitlementGate, Identity};
use crate::error::{SyncError, SyncErrorKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A room this client is now part of.
#[derive(Debug)]
pub struct RoomHandle {
    /// The room.
    pub code: RoomCode,
    /// The record as this client last wrote or read it.
    pub record: RemoteGameRecord,
    /// Snapshots of the room record, starting with the one after `record`.
    pub updates: mpsc::UnboundedReceiver<Option<Value>>,
}

/// One client's connection to the room protocol.
pub struct SyncAdapter {
    channel: Arc<dyn RealtimeChannel>,
    gate: Arc<dyn EntitlementGate>,
    identity: Option<Identity>,
    rng: StdRng,
    joined: Option<(RoomCode, SubscriptionId)>,
}

impl std::fmt::Debug for SyncAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncAdapter")
            .field("identity", &self.identity)
            .field("joined", &self.joined)
            .finish_non_exhaustive()
    }
}

impl SyncAdapter {
    /// Creates an adapter for `identity`.
    pub fn new(
        channel: Arc<dyn RealtimeChannel>,
        gate: Arc<dyn EntitlementGate>,
        identity: Option<Identity>,
    ) -> Self {
        Self {
            channel,
            gate,
            identity,
            rng: StdRng::from_entropy(),
            joined: None,
        }
    }

    /// Uses a fixed seed for room code generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Room currently bound, if any.
    pub fn room(&self) -> Option<&RoomCode> {
        self.joined.as_ref().map(|(code, _)| code)
    }

    async fn admit(&self, name: &str) -> Result<String, SyncError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::new(SyncErrorKind::MissingName));
        }
        if !self.gate.is_entitled(self.identity.as_ref()).await {
            return Err(SyncError::new(SyncErrorKind::EntitlementDenied {
                signed_in: self.identity.is_some(),
            }));
        }
        if !self.channel.is_connected() {
            return Err(SyncError::new(SyncErrorKind::ChannelUnavailable));
        }
        Ok(name.to_string())
    }

    /// Opens a new room hosted by `name`, who plays A.
    #[instrument(skip(self))]
    pub async fn create_room(&mut self, name: &str) -> Result<RoomHandle, SyncError> {
        let name = self.admit(name).await?;
        let code = RoomCode::generate(&mut self.rng);
        let key = code.record_key();
        let record = RemoteGameRecord::opening(name);

        self.channel.publish(&key, codec::encode(&record)).await?;
        let subscription = match self.channel.subscribe(&key).await {
            Ok(subscription) => subscription,
            Err(e) => {
                if let Err(remove) = self.channel.remove(&key).await {
                    warn!(error = %remove, "Failed to remove abandoned room record");
                }
                return Err(e);
            }
        };
        self.joined = Some((code.clone(), subscription.id));
        info!(room = %code, "Room created");

        Ok(RoomHandle {
            code,
            record,
            updates: subscription.updates,
        })
    }

    /// Joins an existing room as B.
    ///
    /// Fails with `RoomNotFound` if nothing is stored under the code and
    /// `RoomFull` if B was already claimed.
    #[instrument(skip(self))]
    pub async fn join_room(&mut self, code: &str, name: &str) -> Result<RoomHandle, SyncError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::new(SyncErrorKind::MissingName));
        }
        let code = RoomCode::parse(code)?;
        let name = self.admit(name).await?;
        let key = code.record_key();

        let mut subscription = self.channel.subscribe(&key).await?;
        let Some(first) = subscription.updates.recv().await else {
            self.release(subscription.id).await;
            return Err(SyncError::transport("Subscription closed before first snapshot"));
        };

        let Some(value) = first else {
            self.release(subscription.id).await;
            warn!(room = %code, "Room not found");
            return Err(SyncError::new(SyncErrorKind::RoomNotFound));
        };
        let mut record = codec::decode(&value).record;
        if record.peer_joined {
            self.release(subscription.id).await;
            warn!(room = %code, "Room already has two players");
            return Err(SyncError::new(SyncErrorKind::RoomFull));
        }

        record.player_b_name = name;
        record.peer_joined = true;
        if let Err(e) = self.channel.publish(&key, codec::encode(&record)).await {
            self.release(subscription.id).await;
            return Err(e);
        }
        self.joined = Some((code.clone(), subscription.id));
        info!(room = %code, host = %record.player_a_name, "Joined room");

        Ok(RoomHandle {
            code,
            record,
            updates: subscription.updates,
        })
    }

    /// Replaces the room record.
    #[instrument(skip(self, record))]
    pub async fn publish(&self, record: &RemoteGameRecord) -> Result<(), SyncError> {
        let Some((code, _)) = &self.joined else {
            debug!("Not in a room, nothing to publish");
            return Ok(());
        };
        if !self.channel.is_connected() {
            return Err(SyncError::new(SyncErrorKind::ChannelUnavailable));
        }
        self.channel
            .publish(&code.record_key(), codec::encode(record))
            .await
    }

    /// Feeds one snapshot into `controller`.
    ///
    /// A missing record means the other side left.
    #[instrument(skip(self, controller, snapshot))]
    pub fn apply_snapshot(
        &self,
        controller: &mut GameController,
        snapshot: Option<Value>,
    ) -> Vec<Effect> {
        match snapshot {
            Some(value) => {
                let decoded = codec::decode(&value);
                debug!(clean = decoded.is_clean(), "Applying snapshot");
                controller.apply_remote(&decoded.record)
            }
            None => {
                controller.remote_closed();
                Vec::new()
            }
        }
    }

    async fn release(&self, id: SubscriptionId) {
        if let Err(e) = self.channel.unsubscribe(id).await {
            warn!(error = %e, %id, "Failed to unsubscribe");
        }
    }

    /// Unsubscribes and deletes the room record. Failures are logged and
    /// otherwise ignored.
    #[instrument(skip(self))]
    pub async fn leave(&mut self) {
        let Some((code, id)) = self.joined.take() else {
            return;
        };
        self.release(id).await;
        if let Err(e) = self.channel.remove(&code.record_key()).await {
            warn!(error = %e, "Failed to remove room record");
        }
        info!(room = %code, "Left room");
    }
}
