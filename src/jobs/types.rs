use async_trait::async_trait;
use jiff::Timestamp;
use uuid::Uuid;

use crate::jobs::error::JobResult;

/// Per-run context passed to tasks
#[derive(Debug, Clone)]
pub struct JobContext {
    pub execution_id: Uuid,
    pub job_name: &'static str,
    pub started_at: Timestamp,
}

impl JobContext {
    pub fn new(job_name: &'static str) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            job_name,
            started_at: Timestamp::now(),
        }
    }
}

/// Trait that all job tasks must implement
#[async_trait]
pub trait JobTask: Send + Sync + std::fmt::Debug {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    /// Execute the task
    async fn execute(&self, ctx: JobContext) -> JobResult<()>;

    /// Optional description
    fn description(&self) -> Option<String> {
        None
    }
}
