//! Serve command handler

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server, or with `dry_run` only prints what it would run.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            for line in self.validate_only()? {
                println!("{line}");
            }
            return Ok(());
        }
        Server::new(self.config).run().await
    }

    /// Validates the configuration and describes the resulting deployment.
    pub fn validate_only(&self) -> AppResult<Vec<String>> {
        self.config.validate()?;
        let recipients = self.config.recipients.resolve()?;
        let schedule = &self.config.schedule;

        let storage = if self.config.database.is_enabled() {
            format!(
                "PostgreSQL (pool {}-{}, auto_migrate={})",
                self.config.database.min_connections,
                self.config.database.max_connections,
                self.config.database.auto_migrate
            )
        } else {
            "in-memory (no database.url)".to_string()
        };

        let mut lines = vec![
            "✓ Configuration is valid".to_string(),
            format!("✓ Server would bind to: {}", self.config.server.address()),
            format!("✓ Event storage: {storage}"),
            format!(
                "✓ Senior {} relays to {} caregiver(s)",
                recipients.senior.display(),
                recipients.caregivers.len()
            ),
            format!(
                "✓ Webhook signature check: {}",
                if self.config.whatsapp.app_secret.is_some() { "on" } else { "off" }
            ),
        ];
        if schedule.enabled {
            lines.push(format!("✓ Menu schedule: {} (UTC)", schedule.menu_cron));
        }
        if schedule.report_enabled {
            lines.push(format!("✓ Daily report: {} (UTC)", schedule.report_cron));
        }
        lines.push("Dry run completed successfully".to_string());
        Ok(lines)
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::valid_settings;

    #[test]
    fn test_dry_run_describes_deployment() {
        let handler = ServeCommandHandler::new(valid_settings());
        let lines = handler.validate_only().unwrap();

        assert!(lines.iter().any(|l| l.contains("in-memory")));
        assert!(lines.iter().any(|l| l.contains("+37120000000") && l.contains("2 caregiver")));
        assert!(!lines.iter().any(|l| l.contains("Menu schedule")));
    }

    #[test]
    fn test_dry_run_invalid_config() {
        let mut config = valid_settings();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config);

        assert!(handler.validate_only().is_err());
    }

    #[tokio::test]
    async fn test_execute_dry_run_does_not_bind() {
        let handler = ServeCommandHandler::new(valid_settings());
        assert!(handler.execute(true).await.is_ok());
    }
}
