//! Bounded deletion of recorded events.
//!
//! Both endpoints take the same inclusive day range so an operator can
//! preview exactly what a purge would remove.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ADMIN_TAG;
use crate::api::dto::{DateRangeQuery, PurgePreviewResponse, PurgeResponse};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::ValidatedQuery;

pub fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(preview_purge))
        .routes(routes!(purge_events))
}

/// GET /api/admin/events/preview - events a purge would delete
#[utoipa::path(
    get,
    path = "/events/preview",
    tag = ADMIN_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Events in range", body = PurgePreviewResponse),
        (status = 400, description = "Invalid range", body = crate::api::dto::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn preview_purge(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DateRangeQuery>,
) -> AppResult<Json<PurgePreviewResponse>> {
    let (start, end) = query.range()?.bounds(&state.services.timezone)?;
    let recorder = &state.services.recorder;

    let events = recorder.between(start, end).await?;
    let total = recorder.count().await?;

    Ok(Json(PurgePreviewResponse {
        from: query.from,
        to: query.to,
        count: events.len(),
        events,
        total,
    }))
}

/// DELETE /api/admin/events - delete events in range
#[utoipa::path(
    delete,
    path = "/events",
    tag = ADMIN_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Deleted events", body = PurgeResponse),
        (status = 400, description = "Invalid range", body = crate::api::dto::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn purge_events(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DateRangeQuery>,
) -> AppResult<Json<PurgeResponse>> {
    let (start, end) = query.range()?.bounds(&state.services.timezone)?;
    let recorder = &state.services.recorder;

    let events = recorder.purge(start, end).await?;
    let remaining = recorder.count().await?;
    tracing::warn!(
        from = %query.from,
        to = %query.to,
        deleted = events.len(),
        remaining,
        "Events purged by operator"
    );

    Ok(Json(PurgeResponse {
        from: query.from,
        to: query.to,
        deleted: events.len(),
        events,
        remaining,
    }))
}
