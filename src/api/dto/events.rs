//! Query parameters for event listings and reports.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

fn default_limit() -> u32 {
    50
}

fn default_window() -> u32 {
    30
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Maximum number of events, newest first
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500, message = "limit must be between 1 and 500"))]
    #[param(default = 50, minimum = 1, maximum = 500)]
    pub limit: u32,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatisticsQuery {
    /// Window in days, counted back from now
    #[serde(default = "default_window")]
    #[validate(range(min = 1, max = 366, message = "days must be between 1 and 366"))]
    #[param(default = 30, minimum = 1, maximum = 366)]
    pub days: u32,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyAveragesQuery {
    /// Number of calendar days including today
    #[serde(default = "default_days")]
    #[validate(range(min = 1, max = 90, message = "days must be between 1 and 90"))]
    #[param(default = 7, minimum = 1, maximum = 90)]
    pub days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_absent() {
        let query: EventsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);
        let query: StatisticsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.days, 30);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_bounds_are_enforced() {
        assert!(EventsQuery { limit: 501 }.validate().is_err());
        assert!(DailyAveragesQuery { days: 0 }.validate().is_err());
        assert!(DailyAveragesQuery { days: 90 }.validate().is_ok());
    }
}
