use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::{Notification, NotificationError};
use crate::services::email::Notifier;

#[derive(Debug, Default)]
pub struct DeliveryStats {
    pub delivered: AtomicU64,
    pub failed: AtomicU64,
}

impl DeliveryStats {
    pub fn snapshot(&self) -> DeliverySnapshot {
        DeliverySnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliverySnapshot {
    pub delivered: u64,
    pub failed: u64,
}

/// Consumes queued notifications and makes one bounded delivery attempt for each.
pub struct NotificationWorker {
    notifier: Arc<dyn Notifier>,
    receiver: mpsc::UnboundedReceiver<Notification>,
    timeout: Duration,
    stats: Arc<DeliveryStats>,
}

impl NotificationWorker {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        receiver: mpsc::UnboundedReceiver<Notification>,
        timeout: Duration,
    ) -> Self {
        Self {
            notifier,
            receiver,
            timeout,
            stats: Arc::new(DeliveryStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<DeliveryStats> {
        Arc::clone(&self.stats)
    }

    /// Runs until every dispatcher has been dropped and the queue is drained.
    pub async fn run(mut self) {
        info!("Notification worker started");

        while let Some(notification) = self.receiver.recv().await {
            match self.process(&notification).await {
                Ok(()) => {
                    self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!("Email failed for {} notification {}: {}", notification.label(), notification.id, e);
                }
            }
        }

        info!("Notification worker stopped");
    }

    #[instrument(skip(self, notification), fields(notification_id = %notification.id, kind = notification.label()))]
    async fn process(&self, notification: &Notification) -> Result<(), NotificationError> {
        debug!("Delivering notification to {}", notification.recipient_email);

        match timeout(self.timeout, self.notifier.deliver(notification)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout {
                timeout_seconds: self.timeout.as_secs(),
            }),
        }
    }
}
