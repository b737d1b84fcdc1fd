use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{Notification, NotificationError};
use crate::services::email::Notifier;
use crate::services::worker::{DeliveryStats, NotificationWorker};

/// Producer side of the notification queue. Cloning shares the same worker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<Notification>,
    stats: Arc<DeliveryStats>,
}

impl NotificationDispatcher {
    /// Spawns a worker delivering through `notifier`, each attempt bounded by `timeout`.
    pub fn spawn(notifier: Arc<dyn Notifier>, timeout: Duration) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = NotificationWorker::new(notifier, receiver, timeout);
        let stats = worker.stats();
        let handle = tokio::spawn(worker.run());

        (Self { sender, stats }, handle)
    }

    /// Dispatcher with no worker behind it; every message is dropped.
    pub fn detached() -> Self {
        let (sender, _receiver) = mpsc::unbounded_channel();
        Self { sender, stats: Arc::new(DeliveryStats::default()) }
    }

    /// Counters of the worker behind this dispatcher.
    pub fn stats(&self) -> Arc<DeliveryStats> {
        Arc::clone(&self.stats)
    }

    pub fn try_dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sender
            .send(notification)
            .map_err(|_| NotificationError::QueueClosed)
    }

    /// Enqueues without waiting for delivery. Failures are logged and dropped.
    pub fn dispatch(&self, notification: Notification) {
        let id = notification.id;
        let label = notification.label();

        match self.try_dispatch(notification) {
            Ok(()) => debug!("Queued {} notification {}", label, id),
            Err(e) => warn!("Dropping {} notification {}: {}", label, id, e),
        }
    }
}
