//! WhatsApp Cloud API gateway.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::payload::{self, Content, OutboundMessage};
use super::{DeliveryError, DeliveryGateway, MessageId};
use crate::config::{MenuConfig, MessagesConfig, WhatsAppConfig};
use crate::models::BpRange;
use crate::utils::PhoneNumber;

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

/// Sends messages through the Graph API `/{phone_number_id}/messages` endpoint.
///
/// Owns its own pooled HTTP client with the configured request timeout.
#[derive(Clone)]
pub struct WhatsAppGateway {
    client: reqwest::Client,
    url: String,
    access_token: String,
    menu: Arc<MenuConfig>,
    messages: Arc<MessagesConfig>,
}

impl WhatsAppGateway {
    pub fn new(
        config: &WhatsAppConfig,
        menu: Arc<MenuConfig>,
        messages: Arc<MessagesConfig>,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("bp-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.messages_url(),
            access_token: config.access_token.clone(),
            menu,
            messages,
        })
    }

    async fn post(&self, to: &PhoneNumber, content: Content) -> Result<MessageId, DeliveryError> {
        let message = OutboundMessage::new(to, content);
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => DeliveryError::Provider {
                    status: status.as_u16(),
                    code: envelope.error.code,
                    kind: envelope.error.kind,
                    message: envelope.error.message,
                    trace_id: envelope.error.fbtrace_id,
                },
                Err(_) => DeliveryError::InvalidResponse(format!("HTTP {status}: {body}")),
            };
            tracing::warn!(to = %to, error = %error, "WhatsApp send rejected");
            return Err(error);
        }

        let parsed: SendResponse = serde_json::from_str(&body)
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;
        let id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| DeliveryError::InvalidResponse("missing message id".to_string()))?;

        tracing::debug!(to = %to, message_id = %id, "WhatsApp message accepted");
        Ok(id)
    }
}

#[async_trait]
impl DeliveryGateway for WhatsAppGateway {
    async fn send_text(&self, to: &PhoneNumber, body: &str) -> Result<MessageId, DeliveryError> {
        self.post(to, payload::text(body)).await
    }

    async fn send_bucket_menu(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError> {
        self.post(to, payload::bucket_menu(&self.menu, &self.messages))
            .await
    }

    async fn send_range_buttons(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError> {
        self.post(to, payload::range_buttons(&self.menu, &self.messages))
            .await
    }

    async fn send_range_menu(
        &self,
        to: &PhoneNumber,
        range: BpRange,
    ) -> Result<MessageId, DeliveryError> {
        self.post(to, payload::range_menu(&self.menu, &self.messages, range))
            .await
    }

    async fn send_subscription_prompt(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError> {
        self.post(to, payload::subscription_prompt(&self.menu, &self.messages))
            .await
    }

    fn name(&self) -> &'static str {
        "whatsapp"
    }
}
