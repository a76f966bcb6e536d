//! Bounded event purge.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppResult;
use crate::models::{DayRange, StoredEvent};

/// Inclusive calendar days in the configured time zone, `YYYY-MM-DD`.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    #[param(value_type = String, format = Date, example = "2024-03-01")]
    pub from: Date,
    #[param(value_type = String, format = Date, example = "2024-03-31")]
    pub to: Date,
}

impl DateRangeQuery {
    pub fn range(&self) -> AppResult<DayRange> {
        DayRange::new(self.from, self.to)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgePreviewResponse {
    #[schema(value_type = String, format = Date)]
    pub from: Date,
    #[schema(value_type = String, format = Date)]
    pub to: Date,
    /// Events the purge would delete
    pub count: usize,
    pub events: Vec<StoredEvent>,
    /// Events currently stored in total
    pub total: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResponse {
    #[schema(value_type = String, format = Date)]
    pub from: Date,
    #[schema(value_type = String, format = Date)]
    pub to: Date,
    pub deleted: usize,
    pub events: Vec<StoredEvent>,
    /// Events left after the purge
    pub remaining: u64,
}
