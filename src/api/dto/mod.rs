//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `error` - Common error response DTOs
//! - `health` - Health probe responses
//! - `events` - Event listing and reporting queries
//! - `admin` - Event purge requests and results
//! - `menu` - Manual menu trigger

mod admin;
mod error;
mod events;
mod health;
mod menu;

pub use admin::{DateRangeQuery, PurgePreviewResponse, PurgeResponse};
pub use error::ErrorResponse;
pub use events::{DailyAveragesQuery, EventsQuery, StatisticsQuery};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use menu::{MenuRequest, MenuResponse};
