use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Mail transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Mail API rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Delivery timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("Notification queue is closed")]
    QueueClosed,
}
