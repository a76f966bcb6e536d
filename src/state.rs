//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::api::middleware::RateLimiter;
use crate::config::Settings;
use crate::db::AsyncDbPool;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since everything inside is `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Direct pool access for health checks; `None` without a database
    pub db_pool: Option<AsyncDbPool>,
    pub settings: Arc<Settings>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(services: Services, db_pool: Option<AsyncDbPool>, settings: Arc<Settings>) -> Self {
        let rate_limiter = RateLimiter::new(&settings.rate_limit);
        Self {
            services,
            db_pool,
            settings,
            rate_limiter,
        }
    }
}
