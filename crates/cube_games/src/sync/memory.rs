//! In-process [`RealtimeChannel`] with last-writer-wins semantics.

use super::channel::{RealtimeChannel, Subscription, SubscriptionId};
use crate::error::{SyncError, SyncErrorKind};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct Slot {
    value: Option<Value>,
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<Option<Value>>)>,
}

impl Slot {
    fn broadcast(&mut self) {
        let value = self.value.clone();
        self.subscribers.retain(|(_, tx)| tx.send(value.clone()).is_ok());
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone)]
pub struct InMemoryChannel {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    connected: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryChannel {
    /// Creates an empty, connected store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory realtime channel");
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            connected: Arc::new(AtomicBool::new(true)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Simulates losing or regaining the connection.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Current value under `key`.
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.lock()
            .ok()
            .and_then(|slots| slots.get(key).and_then(|slot| slot.value.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Slot>>, SyncError> {
        self.slots.lock().map_err(SyncError::transport)
    }

    fn ensure_connected(&self) -> Result<(), SyncError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(SyncError::new(SyncErrorKind::ChannelUnavailable))
        }
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealtimeChannel for InMemoryChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    #[instrument(skip(self, value))]
    async fn publish(&self, key: &str, value: Value) -> Result<(), SyncError> {
        self.ensure_connected()?;
        let mut slots = self.lock()?;
        let slot = slots.entry(key.to_string()).or_default();
        slot.value = Some(value);
        slot.broadcast();
        debug!(subscribers = slot.subscribers.len(), "Published value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn subscribe(&self, key: &str) -> Result<Subscription, SyncError> {
        self.ensure_connected()?;
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::unbounded_channel();

        let mut slots = self.lock()?;
        let slot = slots.entry(key.to_string()).or_default();
        tx.send(slot.value.clone()).map_err(SyncError::transport)?;
        slot.subscribers.push((id, tx));
        debug!(%id, "Subscribed");

        Ok(Subscription {
            id,
            key: key.to_string(),
            updates: rx,
        })
    }

    #[instrument(skip(self))]
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SyncError> {
        let mut slots = self.lock()?;
        for slot in slots.values_mut() {
            slot.subscribers.retain(|(sub, _)| *sub != id);
        }
        debug!("Unsubscribed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), SyncError> {
        self.ensure_connected()?;
        let mut slots = self.lock()?;
        if let Some(slot) = slots.get_mut(key) {
            slot.value = None;
            slot.broadcast();
        }
        debug!("Removed value");
        Ok(())
    }
}
