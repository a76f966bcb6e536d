//! WhatsApp webhook endpoints.
//!
//! `GET /webhook` answers the subscription handshake; `POST /webhook`
//! acknowledges immediately and processes the payload in the background so
//! the provider never retries because of slow downstream sends.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::WEBHOOK_TAG;
use crate::api::middleware::token_matches;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

pub fn webhook_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(verify_webhook, receive_webhook))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// GET /webhook - subscription verification
///
/// Echoes `hub.challenge` when the mode is `subscribe` and the token matches.
#[utoipa::path(
    get,
    path = "/webhook",
    tag = WEBHOOK_TAG,
    params(VerifyParams),
    responses(
        (status = 200, description = "Challenge echoed", body = String),
        (status = 403, description = "Verification failed", body = crate::api::dto::ErrorResponse)
    )
)]
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> AppResult<String> {
    let expected = &state.settings.whatsapp.verify_token;
    match (params.mode.as_deref(), params.verify_token.as_deref()) {
        (Some("subscribe"), Some(token)) if token_matches(token, expected) => {
            tracing::info!("Webhook verified");
            Ok(params.challenge.unwrap_or_default())
        }
        (mode, _) => {
            tracing::warn!(mode = ?mode, "Webhook verification failed");
            Err(AppError::Forbidden {
                message: "Webhook verification failed".to_string(),
            })
        }
    }
}

/// Checks `sha256=<hex>` against the HMAC-SHA256 of the raw body.
pub fn verify_signature(secret: &str, header: Option<&str>, body: &[u8]) -> AppResult<()> {
    let signature = header
        .and_then(|h| h.strip_prefix("sha256="))
        .ok_or_else(|| AppError::unauthorized("Missing webhook signature"))?;
    let expected =
        hex::decode(signature).map_err(|_| AppError::unauthorized("Malformed webhook signature"))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|e| {
        AppError::Internal {
            source: anyhow::anyhow!("invalid webhook secret: {e}"),
        }
    })?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| AppError::unauthorized("Invalid webhook signature"))
}

/// POST /webhook - inbound messages and status updates
#[utoipa::path(
    post,
    path = "/webhook",
    tag = WEBHOOK_TAG,
    request_body(content = Object, description = "WhatsApp Cloud API notification"),
    responses(
        (status = 200, description = "Accepted for processing", body = String),
        (status = 401, description = "Signature check failed", body = crate::api::dto::ErrorResponse)
    )
)]
async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, &'static str)> {
    if let Some(secret) = state.settings.whatsapp.app_secret.as_deref() {
        let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if let Err(e) = verify_signature(secret, header, &body) {
            tracing::warn!(error = %e, "Rejected webhook with bad signature");
            return Err(e);
        }
    }

    let processor = state.services.webhooks.clone();
    state.services.background.spawn("webhook", async move {
        let summary = processor.process_raw(&body).await?;
        tracing::debug!(
            messages = summary.dispositions.len(),
            statuses = summary.statuses,
            "Webhook processed"
        );
        Ok::<_, serde_json::Error>(())
    });

    Ok((StatusCode::OK, "EVENT_RECEIVED"))
}
