//! Fixed-window request limiting per client IP.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::config::settings::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Windows are pruned once this many clients are tracked.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    enabled: bool,
    max_requests: u32,
    window: Duration,
    windows: Arc<DashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            windows: Arc::new(DashMap::new()),
        }
    }

    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    /// Counts one request. `Err` carries the time until the window resets.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), Duration> {
        if !self.enabled {
            return Ok(());
        }
        if self.windows.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut window = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            return Err(self
                .window
                .saturating_sub(now.saturating_duration_since(window.started)));
        }
        window.count += 1;
        Ok(())
    }

    fn prune(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }
}

/// Applies [`RateLimiter`] keyed by the peer address. Requests without
/// connection info (in-process calls) share one bucket.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(retry_after) = state.rate_limiter.check(client) {
        tracing::warn!(client = %client, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
        return Err(AppError::TooManyRequests { retry_after });
    }

    Ok(next.run(request).await)
}
