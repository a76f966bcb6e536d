use std::fmt;

use async_trait::async_trait;

use crate::jobs::error::JobResult;
use crate::jobs::types::{JobContext, JobTask};
use crate::services::{MenuKind, MenuPrompter};

/// Sends the reading menu to the senior.
#[derive(Clone)]
pub struct SendMenuTask {
    prompter: MenuPrompter,
    kind: MenuKind,
}

impl SendMenuTask {
    pub fn new(prompter: MenuPrompter, kind: MenuKind) -> Self {
        Self { prompter, kind }
    }

    /// Uses the style configured for the prompter.
    pub fn with_default_kind(prompter: MenuPrompter) -> Self {
        let kind = prompter.default_kind();
        Self::new(prompter, kind)
    }
}

impl fmt::Debug for SendMenuTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendMenuTask").field("kind", &self.kind).finish()
    }
}

#[async_trait]
impl JobTask for SendMenuTask {
    fn name(&self) -> &'static str {
        "send_menu"
    }

    async fn execute(&self, ctx: JobContext) -> JobResult<()> {
        let message_id = self.prompter.send(self.kind).await?;
        tracing::info!(
            execution_id = %ctx.execution_id,
            kind = ?self.kind,
            message_id = %message_id,
            "Scheduled menu sent"
        );
        Ok(())
    }

    fn description(&self) -> Option<String> {
        Some(format!("Send the {:?} menu to the senior", self.kind))
    }
}
