use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::{Notification, NotificationError};

/// Delivery transport for patient notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Used when no mail API is configured: the message is only logged.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError> {
        let message = notification.render();
        info!("Email service not configured. Email to {}: {}", message.to, message.subject);
        debug!("Email body:\n{}", message.body);
        Ok(())
    }
}

/// Sends rendered messages to an HTTP mail relay.
pub struct EmailApiNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl EmailApiNotifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
        }
    }
}

#[async_trait]
impl Notifier for EmailApiNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationError> {
        let message = notification.render();

        let mut request = self.client
            .post(&self.api_url)
            .json(&json!({
                "from": self.from,
                "to": message.to,
                "subject": message.subject,
                "text": message.body,
            }));

        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected { status: status.as_u16(), body });
        }

        info!("Email sent to: {}", message.to);
        Ok(())
    }
}

/// Picks the mail relay when configured, otherwise the logging fallback.
pub fn notifier_from_config(config: &AppConfig) -> std::sync::Arc<dyn Notifier> {
    if config.is_mail_configured() {
        std::sync::Arc::new(EmailApiNotifier::new(config))
    } else {
        std::sync::Arc::new(LogNotifier)
    }
}
