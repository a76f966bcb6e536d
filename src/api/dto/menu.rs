use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::MenuKind;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MenuRequest {
    /// Defaults to the configured menu style
    #[serde(default)]
    pub kind: Option<MenuKind>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    pub kind: MenuKind,
    pub message_id: String,
}
