//! Bearer token authentication for the operator surface.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

/// Constant-time comparison of a presented token with the configured one.
pub fn token_matches(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

/// Rejects requests without `Authorization: Bearer <admin_token>`.
///
/// # Errors
/// Returns 401 Unauthorized if the header is missing, malformed, or carries
/// the wrong token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })?;

    if !token_matches(token.trim(), &state.settings.security.admin_token) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid bearer token");
        return Err(AppError::unauthorized("Invalid bearer token"));
    }

    Ok(next.run(request).await)
}
