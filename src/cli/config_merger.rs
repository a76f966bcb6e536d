//! Applies CLI overrides on top of file and environment configuration.
//!
//! Precedence, lowest to highest: config files, `BP_RELAY_*` variables,
//! global flags (`--verbose`/`--quiet`), command flags.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the way `cli` asks for, without
    /// validating it yet; validation runs after the overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match &cli.config {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };
        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Returns the merged settings, validated for the selected command.
    ///
    /// `migrate` only needs a database section; every other command gets the
    /// full validation.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        match &cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                ..
            }) => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
                config.validate()?;
            }
            Some(Commands::Migrate { .. }) => {
                if !config.database.is_enabled() {
                    return Err(ConfigError::validation(
                        "database.url",
                        "A database URL is required to run migrations.",
                    ));
                }
                config.database.validate()?;
                config.logger.validate()?;
            }
            Some(Commands::SendMenu { .. }) | None => config.validate()?,
        }

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
