//! Menus sent to the senior on schedule, on demand, or when they type text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::gateway::{DeliveryError, DeliveryGateway, MessageId};
use crate::config::MenuStyle;
use crate::utils::PhoneNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    /// Single list with every bucket.
    BucketMenu,
    /// Low/high buttons followed by a per-range list.
    RangeButtons,
}

impl From<MenuStyle> for MenuKind {
    fn from(style: MenuStyle) -> Self {
        match style {
            MenuStyle::List => MenuKind::BucketMenu,
            MenuStyle::Range => MenuKind::RangeButtons,
        }
    }
}

#[derive(Clone)]
pub struct MenuPrompter {
    gateway: Arc<dyn DeliveryGateway>,
    senior: PhoneNumber,
    default_kind: MenuKind,
}

impl MenuPrompter {
    pub fn new(gateway: Arc<dyn DeliveryGateway>, senior: PhoneNumber, style: MenuStyle) -> Self {
        Self {
            gateway,
            senior,
            default_kind: style.into(),
        }
    }

    pub fn default_kind(&self) -> MenuKind {
        self.default_kind
    }

    pub async fn send(&self, kind: MenuKind) -> Result<MessageId, DeliveryError> {
        let result = match kind {
            MenuKind::BucketMenu => self.gateway.send_bucket_menu(&self.senior).await,
            MenuKind::RangeButtons => self.gateway.send_range_buttons(&self.senior).await,
        };
        match &result {
            Ok(id) => tracing::info!(kind = ?kind, message_id = %id, "Menu sent to senior"),
            Err(e) => tracing::error!(kind = ?kind, error = %e, "Failed to send menu to senior"),
        }
        result
    }

    pub async fn send_default(&self) -> Result<MessageId, DeliveryError> {
        self.send(self.default_kind).await
    }
}
