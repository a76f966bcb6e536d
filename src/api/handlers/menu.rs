//! Manual menu trigger.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::MENU_TAG;
use crate::api::dto::{MenuRequest, MenuResponse};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn menu_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(send_menu))
}

/// POST /api/menu - send a menu to the senior now
#[utoipa::path(
    post,
    path = "/menu",
    tag = MENU_TAG,
    request_body = MenuRequest,
    responses(
        (status = 200, description = "Menu accepted by the provider", body = MenuResponse),
        (status = 401, description = "Missing or invalid token", body = crate::api::dto::ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = crate::api::dto::ErrorResponse),
        (status = 502, description = "Provider rejected the menu", body = crate::api::dto::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn send_menu(
    State(state): State<AppState>,
    payload: Option<Json<MenuRequest>>,
) -> AppResult<Json<MenuResponse>> {
    let prompter = &state.services.prompter;
    let kind = payload
        .and_then(|Json(request)| request.kind)
        .unwrap_or_else(|| prompter.default_kind());

    let message_id = prompter.send(kind).await.map_err(|e| AppError::Upstream {
        service: state.services.gateway.name().to_string(),
        message: e.to_string(),
    })?;

    Ok(Json(MenuResponse { kind, message_id }))
}
