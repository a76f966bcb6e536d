use std::fmt;

use async_trait::async_trait;

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::types::{JobContext, JobTask};
use crate::services::ReportService;

/// Sends the evening summary to everyone on the recipient list.
#[derive(Clone)]
pub struct DailyReportTask {
    reports: ReportService,
}

impl DailyReportTask {
    pub fn new(reports: ReportService) -> Self {
        Self { reports }
    }
}

impl fmt::Debug for DailyReportTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyReportTask").finish_non_exhaustive()
    }
}

#[async_trait]
impl JobTask for DailyReportTask {
    fn name(&self) -> &'static str {
        "daily_report"
    }

    /// Fails only when no recipient received the report.
    async fn execute(&self, ctx: JobContext) -> JobResult<()> {
        let delivery = self.reports.send_daily_report().await?;
        let sent = delivery.deliveries.iter().filter(|d| d.success).count();

        if sent == 0 && !delivery.deliveries.is_empty() {
            return Err(JobError::ExecutionFailed(format!(
                "daily report reached none of {} recipients",
                delivery.deliveries.len()
            )));
        }

        tracing::debug!(execution_id = %ctx.execution_id, sent, "Daily report task finished");
        Ok(())
    }

    fn description(&self) -> Option<String> {
        Some("Send today's readings and recent statistics".to_string())
    }
}
