//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::services::MenuKind;

/// WhatsApp blood-pressure relay
#[derive(Parser, Debug)]
#[command(name = "bp-relay")]
#[command(about = "Relays blood-pressure readings from WhatsApp to caregivers")]
#[command(long_about = "
bp-relay receives WhatsApp Cloud API webhooks from a senior's phone, turns menu
selections into blood-pressure readings and forwards them to every caregiver.
Readings are stored in PostgreSQL when a database is configured.

EXAMPLES:
    # Start the server with layered configuration from ./config
    bp-relay serve

    # Bind to all interfaces on port 8080
    bp-relay serve --host 0.0.0.0 --port 8080

    # Use a single configuration file
    bp-relay --config /etc/bp-relay/relay.toml serve

    # Check configuration without starting the server
    bp-relay --env production serve --dry-run

    # Apply or preview database migrations
    bp-relay migrate
    bp-relay migrate --dry-run

    # Roll back the last migration
    bp-relay migrate --rollback 1

    # Send the reading menu to the senior right now
    bp-relay send-menu --kind range-buttons
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Loads this TOML file instead of the layered files under ./config.
    /// `BP_RELAY_*` environment variables still apply on top.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection (`BP_RELAY_APP_ENV`)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override, takes precedence over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to roll back (1-100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
    /// Send the reading menu to the senior once
    SendMenu {
        /// Menu to send; defaults to `schedule.menu_style`
        #[arg(long, value_enum)]
        kind: Option<MenuKindArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKindArg {
    /// Single list with every bucket
    #[value(name = "bucket-menu", alias = "list")]
    BucketMenu,
    /// Low/high buttons
    #[value(name = "range-buttons", alias = "range")]
    RangeButtons,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<MenuKindArg> for MenuKind {
    fn from(kind: MenuKindArg) -> Self {
        match kind {
            MenuKindArg::BucketMenu => MenuKind::BucketMenu,
            MenuKindArg::RangeButtons => MenuKind::RangeButtons,
        }
    }
}
