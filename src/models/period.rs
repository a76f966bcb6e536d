use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;

use crate::error::{AppError, AppResult};

/// Inclusive span of calendar days in some time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub from: Date,
    pub to: Date,
}

impl DayRange {
    pub fn new(from: Date, to: Date) -> AppResult<Self> {
        if from > to {
            return Err(AppError::Validation {
                field: "from".to_string(),
                reason: format!("start date {from} is after end date {to}"),
            });
        }
        Ok(Self { from, to })
    }

    /// Half-open instant bounds: start of `from` up to start of the day
    /// after `to`.
    pub fn bounds(&self, tz: &TimeZone) -> AppResult<(Timestamp, Timestamp)> {
        let start = self.from.to_zoned(tz.clone())?.timestamp();
        let end = self.to.tomorrow()?.to_zoned(tz.clone())?.timestamp();
        Ok((start, end))
    }

    pub fn days(&self) -> i32 {
        (self.to - self.from).get_days() + 1
    }
}
