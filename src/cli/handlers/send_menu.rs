//! One-shot menu delivery, for cron setups outside the server.

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::jobs::{DEFAULT_JOB_TIMEOUT, JobTask, SendMenuTask, run_task};
use crate::services::{DeliveryGateway, MenuKind, MenuPrompter, WhatsAppGateway};

pub struct SendMenuCommandHandler {
    config: Settings,
}

impl SendMenuCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self, kind: Option<MenuKind>) -> anyhow::Result<()> {
        let gateway = WhatsAppGateway::new(
            &self.config.whatsapp,
            Arc::new(self.config.menu.clone()),
            Arc::new(self.config.messages.clone()),
        )?;
        self.send_with(Arc::new(gateway), kind).await
    }

    async fn send_with(
        &self,
        gateway: Arc<dyn DeliveryGateway>,
        kind: Option<MenuKind>,
    ) -> anyhow::Result<()> {
        let recipients = self.config.recipients.resolve()?;
        let prompter = MenuPrompter::new(
            gateway,
            recipients.senior.clone(),
            self.config.schedule.menu_style,
        );
        let task = match kind {
            Some(kind) => SendMenuTask::new(prompter, kind),
            None => SendMenuTask::with_default_kind(prompter),
        };

        run_task(&task as &dyn JobTask, DEFAULT_JOB_TIMEOUT).await?;
        println!("✓ Menu sent to {}", recipients.senior.display());
        Ok(())
    }
}
