//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, SendMenuCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;

/// Runs the command selected in `cli`; no subcommand means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            if let Some(steps) = rollback.filter(|s| *s > 10) {
                tracing::warn!(steps, "Rolling back many migrations at once");
            }
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await?;
            Ok(())
        }
        Some(Commands::SendMenu { kind }) => {
            SendMenuCommandHandler::new(settings)
                .execute(kind.map(Into::into))
                .await
        }
    }
}
