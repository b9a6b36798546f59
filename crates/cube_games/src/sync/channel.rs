//! The realtime key-value broadcast channel the online protocol runs on.
//!
//! The channel stores one JSON value per key and pushes every new value to
//! all subscribers of that key, including the writer. Writes replace the
//! whole value; the last write wins.

use crate::error::SyncError;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// Identifies one subscription so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("sub-{}", _0)]
pub struct SubscriptionId(pub u64);

/// A live subscription to one key.
///
/// `updates` yields the current value straight away, then every later value.
/// `None` means nothing is stored under the key (never written, or removed).
#[derive(Debug)]
pub struct Subscription {
    /// Handle for [`RealtimeChannel::unsubscribe`].
    pub id: SubscriptionId,
    /// Key being watched.
    pub key: String,
    /// Value stream.
    pub updates: mpsc::UnboundedReceiver<Option<Value>>,
}

/// A pub/sub document store.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Whether a live connection exists.
    fn is_connected(&self) -> bool;

    /// Replaces the value under `key` and notifies subscribers.
    async fn publish(&self, key: &str, value: Value) -> Result<(), SyncError>;

    /// Watches `key`.
    async fn subscribe(&self, key: &str) -> Result<Subscription, SyncError>;

    /// Stops a subscription. Unknown ids are ignored.
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SyncError>;

    /// Deletes the value under `key` and notifies subscribers with `None`.
    async fn remove(&self, key: &str) -> Result<(), SyncError>;
}
