//! Notification Gateway

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde_json::json;

use crate::domain::notifications::{errors::NotificationError, records::OutboxMessage};

/// Delivers notifications to companies and operators.
#[automock]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, message: &OutboxMessage) -> Result<(), NotificationError>;
}

/// Posts notifications to an HTTP endpoint owned by the messaging service.
#[derive(Debug, Clone)]
pub struct HttpNotificationGateway {
    url: String,
    http: Client,
}

impl HttpNotificationGateway {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    async fn send(&self, message: &OutboxMessage) -> Result<(), NotificationError> {
        let body = json!({
            "id": message.uuid,
            "kind": message.kind,
            "shortlist_request": message.request,
            "payload": message.payload,
        });

        let response = self
            .http
            .post(&self.url)
            .header("Idempotency-Key", message.uuid.to_string())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(NotificationError::UnexpectedResponse(format!(
                "notification request failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}
