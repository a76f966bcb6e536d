//! Middleware components for request processing.
//!
//! This module contains middleware for logging, request ID tracking,
//! error handling, bearer authentication and rate limiting.

mod auth;
mod error_handler;
mod logging;
mod rate_limit;
mod request_id;

pub use auth::{auth_middleware, token_matches};
pub use error_handler::{error_to_status_code, global_error_handler};
pub use logging::logging_middleware;
pub use rate_limit::{RateLimiter, rate_limit_middleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
