//! Read-only views over recorded events.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::EVENTS_TAG;
use crate::api::dto::{DailyAveragesQuery, EventsQuery, StatisticsQuery};
use crate::error::AppResult;
use crate::models::StoredEvent;
use crate::services::{DailyAverage, Statistics};
use crate::state::AppState;
use crate::utils::ValidatedQuery;

pub fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_events))
        .routes(routes!(statistics))
        .routes(routes!(daily_averages))
}

/// GET /api/events - most recent events first
#[utoipa::path(
    get,
    path = "/events",
    tag = EVENTS_TAG,
    params(EventsQuery),
    responses(
        (status = 200, description = "Recorded events", body = Vec<StoredEvent>),
        (status = 400, description = "Invalid query", body = crate::api::dto::ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_events(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EventsQuery>,
) -> AppResult<Json<Vec<StoredEvent>>> {
    let events = state.services.recorder.recent(query.limit as usize).await?;
    Ok(Json(events))
}

/// GET /api/statistics - delivery and reading aggregates
#[utoipa::path(
    get,
    path = "/statistics",
    tag = EVENTS_TAG,
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Aggregates over the window", body = Statistics)
    ),
    security(("bearerAuth" = []))
)]
async fn statistics(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<StatisticsQuery>,
) -> AppResult<Json<Statistics>> {
    Ok(Json(state.services.reports.statistics(query.days).await?))
}

/// GET /api/daily-averages - per-day averages, newest first
#[utoipa::path(
    get,
    path = "/daily-averages",
    tag = EVENTS_TAG,
    params(DailyAveragesQuery),
    responses(
        (status = 200, description = "Daily averages", body = Vec<DailyAverage>)
    ),
    security(("bearerAuth" = []))
)]
async fn daily_averages(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DailyAveragesQuery>,
) -> AppResult<Json<Vec<DailyAverage>>> {
    Ok(Json(state.services.reports.daily_averages(query.days).await?))
}
