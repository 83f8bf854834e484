//! Cross-view change notifications.
//!
//! Every write to the shared store that actually changes a value is published
//! here as a [`ChangeNotification`]. Views subscribe (optionally filtered by
//! key) and re-read whatever state they need; the notification is a hint, not
//! a diff, so dropping one under load only costs a refresh.

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::store::StoreKey;

const BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub key: StoreKey,
    pub new_value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeNotification>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, notification: ChangeNotification) {
        // No receivers is normal before any view has subscribed.
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.sender.subscribe(),
            keys: None,
        }
    }

    pub fn subscribe_keys(&self, keys: &[StoreKey]) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.sender.subscribe(),
            keys: Some(keys.to_vec()),
        }
    }
}

pub struct ChangeSubscription {
    receiver: broadcast::Receiver<ChangeNotification>,
    keys: Option<Vec<StoreKey>>,
}

impl ChangeSubscription {
    fn wants(&self, notification: &ChangeNotification) -> bool {
        match &self.keys {
            Some(keys) => keys.contains(&notification.key),
            None => true,
        }
    }

    /// Next pending notification for this subscriber, without waiting.
    pub fn try_next(&mut self) -> Option<ChangeNotification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) if self.wants(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "change subscriber lagged behind");
                    continue;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain everything queued so far.
    pub fn drain(&mut self) -> Vec<ChangeNotification> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next notification. Returns `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<ChangeNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if self.wants(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change subscriber lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
