//! Health check endpoint handlers.
//!
//! Liveness never touches dependencies. Readiness pings the database when
//! one is configured; without one the relay runs on the in-memory recorder
//! and reports itself degraded but ready.

use std::collections::HashMap;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::db::ping;
use crate::state::AppState;

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Basic health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state).await;
    let in_flight = state.services.background.len();
    let background = ComponentHealth::new(
        HealthStatus::Healthy,
        format!("{in_flight} tasks in flight"),
    );

    let status = match database.status {
        HealthStatus::Unhealthy => HealthStatus::Unhealthy,
        other => other,
    };

    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database);
    checks.insert("background".to_string(), background);

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Timestamp::now().to_string(),
        checks,
    };

    let code = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (code, Json(response))
}

/// Readiness probe endpoint.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_database(&state).await.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe endpoint.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let Some(pool) = &state.db_pool else {
        return ComponentHealth::new(
            HealthStatus::Degraded,
            format!(
                "No database configured, events kept by the {} recorder",
                state.services.recorder.name()
            ),
        );
    };

    let start = Instant::now();
    let result = ping(pool).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => ComponentHealth::new(HealthStatus::Healthy, "Connected").timed(elapsed),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            ComponentHealth::new(HealthStatus::Unhealthy, format!("Connection failed: {e}"))
                .timed(elapsed)
        }
    }
}
