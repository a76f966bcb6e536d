//! Outbound messaging boundary.
//!
//! The dispatcher only cares whether a send produced a provider message id or
//! failed with some detail; it never branches on provider error codes.

mod payload;
mod whatsapp;

pub use payload::{Content, Interactive, OutboundMessage};
pub use whatsapp::WhatsAppGateway;

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BpRange, DeliveryResult};
use crate::utils::PhoneNumber;

/// Provider-assigned identifier of an accepted message (`wamid.…`).
pub type MessageId = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The provider answered with a structured error body.
    #[error("provider rejected message: {message} (code {code}, type {kind}, status {status})")]
    Provider {
        status: u16,
        code: i64,
        kind: String,
        message: String,
        trace_id: Option<String>,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but could not be understood.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(error: reqwest::Error) -> Self {
        DeliveryError::Transport(error.to_string())
    }
}

/// Capability to address one phone number with text or interactive menus.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    async fn send_text(&self, to: &PhoneNumber, body: &str) -> Result<MessageId, DeliveryError>;

    /// List menu with every configured bucket.
    async fn send_bucket_menu(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError>;

    /// Low/high buttons.
    async fn send_range_buttons(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError>;

    /// List menu with the buckets of one range.
    async fn send_range_menu(
        &self,
        to: &PhoneNumber,
        range: BpRange,
    ) -> Result<MessageId, DeliveryError>;

    /// Opt-in button that keeps the caregiver's conversation window open.
    async fn send_subscription_prompt(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError>;

    fn name(&self) -> &'static str;
}

/// Runs one send on its own task and folds every way it can go wrong,
/// including a panic inside the gateway, into a [`DeliveryResult`].
pub async fn send_isolated<F>(send: F) -> DeliveryResult
where
    F: Future<Output = Result<MessageId, DeliveryError>> + Send + 'static,
{
    match tokio::spawn(send).await {
        Ok(Ok(message_id)) => DeliveryResult::Sent { message_id },
        Ok(Err(error)) => DeliveryResult::Failed {
            error: error.to_string(),
        },
        Err(join_error) => DeliveryResult::Failed {
            error: format!("send task aborted: {join_error}"),
        },
    }
}
