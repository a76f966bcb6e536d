use thiserror::Error;

use crate::error::AppError;
use crate::services::DeliveryError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Job execution timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid cron expression '{expression}': {message}")]
    InvalidCronExpression { expression: String, message: String },

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    App(#[from] AppError),
}

pub type JobResult<T> = Result<T, JobError>;
