use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};
use uuid::Uuid;

use crate::config::settings::ScheduleConfig;
use crate::jobs::error::{JobError, JobResult};
use crate::jobs::tasks::{DailyReportTask, SendMenuTask};
use crate::jobs::types::{JobContext, JobTask};
use crate::services::Services;

/// Upper bound for a single run; a run that overshoots is abandoned.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs `task` once under `timeout`, logging start and outcome.
pub async fn run_task(task: &dyn JobTask, timeout: Duration) -> JobResult<()> {
    let ctx = JobContext::new(task.name());
    let execution_id = ctx.execution_id;
    let started = Instant::now();
    tracing::info!(job = task.name(), %execution_id, "Job started");

    let result = match tokio::time::timeout(timeout, task.execute(ctx)).await {
        Ok(result) => result,
        Err(_) => Err(JobError::Timeout(timeout.as_secs())),
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => tracing::info!(job = task.name(), %execution_id, duration_ms, "Job finished"),
        Err(e) => tracing::error!(
            job = task.name(),
            %execution_id,
            duration_ms,
            error = %e,
            "Job failed"
        ),
    }
    result
}

/// Wrapper around tokio-cron-scheduler. Cron expressions have six fields
/// (seconds first) and are evaluated in UTC.
pub struct JobScheduler {
    scheduler: Arc<Mutex<TokioCronScheduler>>,
    timeout: Duration,
    registered: Vec<(&'static str, Uuid)>,
}

impl JobScheduler {
    pub async fn new() -> JobResult<Self> {
        let scheduler = TokioCronScheduler::new()
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))?;

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            timeout: DEFAULT_JOB_TIMEOUT,
            registered: Vec::new(),
        })
    }

    /// Builds a scheduler with the tasks enabled in `config`.
    pub async fn from_config(config: &ScheduleConfig, services: &Services) -> JobResult<Self> {
        let mut scheduler = Self::new().await?;

        if config.enabled {
            let task = SendMenuTask::with_default_kind(services.prompter.clone());
            scheduler.register(&config.menu_cron, Arc::new(task)).await?;
        }
        if config.report_enabled {
            let task = DailyReportTask::new(services.reports.clone());
            scheduler.register(&config.report_cron, Arc::new(task)).await?;
        }

        Ok(scheduler)
    }

    /// Schedule `task` on `cron`.
    pub async fn register(&mut self, cron: &str, task: Arc<dyn JobTask>) -> JobResult<Uuid> {
        let name = task.name();
        let timeout = self.timeout;

        let cron_job = Job::new_async(cron, move |_uuid, _lock| {
            let task = Arc::clone(&task);
            Box::pin(async move {
                // Failures are already logged by run_task.
                let _ = run_task(task.as_ref(), timeout).await;
            })
        })
        .map_err(|e| JobError::InvalidCronExpression {
            expression: cron.to_string(),
            message: e.to_string(),
        })?;

        let id = self
            .scheduler
            .lock()
            .await
            .add(cron_job)
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))?;

        tracing::info!(job = name, cron, job_id = %id, "Job scheduled");
        self.registered.push((name, id));
        Ok(id)
    }

    /// Names of the scheduled jobs, in registration order.
    pub fn job_names(&self) -> Vec<&'static str> {
        self.registered.iter().map(|(name, _)| *name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub async fn start(&self) -> JobResult<()> {
        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))?;
        tracing::info!(jobs = ?self.job_names(), "Scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    pub async fn stop(&self) -> JobResult<()> {
        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))?;
        Ok(())
    }
}
