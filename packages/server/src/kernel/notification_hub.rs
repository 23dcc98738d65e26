//! In-process pub/sub for notifications.
//!
//! One broadcast channel per recipient. The events manager publishes here
//! after persisting notification rows; live consumers (a websocket or SSE
//! endpoint in the surrounding app) subscribe by user id.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::common::UserId;
use crate::kernel::events::NotificationEvent;

/// Thread-safe, cloneable. Keyed by recipient.
#[derive(Clone)]
pub struct NotificationHub {
    channels: Arc<RwLock<HashMap<UserId, broadcast::Sender<NotificationEvent>>>>,
    capacity: usize,
}

impl NotificationHub {
    /// Create a new hub with default capacity (256 notifications per recipient).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Deliver an event to one recipient. No-op if nobody is listening.
    pub async fn publish(&self, recipient: UserId, event: &NotificationEvent) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&recipient) {
            // Ignore send errors (no active receivers)
            let _ = tx.send(event.clone());
        }
    }

    /// Subscribe to a recipient's notifications. Creates the channel if needed.
    pub async fn subscribe(&self, recipient: UserId) -> broadcast::Receiver<NotificationEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(recipient)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop channels whose subscribers have all gone away.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
