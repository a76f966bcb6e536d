//! Configuration validation logic
//!
//! Every section checks its own invariants; `Settings::validate` runs them in
//! order and reports the first failure.

use std::collections::HashSet;

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, LoggerSettings, MenuConfig, MessagesConfig, RateLimitConfig,
    RecipientsConfig, ScheduleConfig, SecurityConfig, ServerConfig, Settings, SubscriptionConfig,
    WhatsAppConfig,
};
use crate::models::BpRange;

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// WhatsApp rejects list messages with more rows than this
const MAX_LIST_ROWS: usize = 10;

/// WhatsApp truncates row titles beyond this many characters
const MAX_ROW_TITLE: usize = 24;

const MIN_ADMIN_TOKEN_LEN: usize = 16;

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// An empty URL is allowed and selects the in-memory recorder.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_enabled() {
            return Ok(());
        }

        if !["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl WhatsAppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("whatsapp.access_token", &self.access_token),
            ("whatsapp.phone_number_id", &self.phone_number_id),
            ("whatsapp.verify_token", &self.verify_token),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::validation(field, "Value is required."));
            }
        }

        if matches!(&self.app_secret, Some(secret) if secret.trim().is_empty()) {
            return Err(ConfigError::validation(
                "whatsapp.app_secret",
                "App secret must not be blank; remove the key to disable signature checks.",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::validation(
                "whatsapp.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "whatsapp.timeout_seconds",
                "Timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl RecipientsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.caregivers.is_empty() {
            return Err(ConfigError::validation(
                "recipients.caregivers",
                "At least one caregiver is required.",
            ));
        }

        let recipients = self.resolve()?;

        let mut seen = HashSet::new();
        for phone in recipients.everyone() {
            if !seen.insert(phone.as_str()) {
                return Err(ConfigError::validation(
                    "recipients",
                    format!("Phone number {} is listed more than once.", phone.display()),
                ));
            }
        }

        Ok(())
    }
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_token.len() < MIN_ADMIN_TOKEN_LEN {
            return Err(ConfigError::validation(
                "security.admin_token",
                format!("Admin token must be at least {MIN_ADMIN_TOKEN_LEN} characters."),
            ));
        }
        Ok(())
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && (self.max_requests == 0 || self.window_seconds == 0) {
            return Err(ConfigError::validation(
                "rate_limit",
                "max_requests and window_seconds must be greater than 0 when enabled.",
            ));
        }
        Ok(())
    }
}

impl SubscriptionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_hours == 0 {
            return Err(ConfigError::validation(
                "subscription.cooldown_hours",
                "Cooldown must be at least one hour.",
            ));
        }
        Ok(())
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        jiff::tz::TimeZone::get(&self.timezone).map_err(|e| {
            ConfigError::validation("schedule.timezone", format!("Unknown time zone: {e}"))
        })?;

        for (field, cron) in [
            ("schedule.menu_cron", &self.menu_cron),
            ("schedule.report_cron", &self.report_cron),
        ] {
            let fields = cron.split_whitespace().count();
            if !(6..=7).contains(&fields) {
                return Err(ConfigError::validation(
                    field,
                    format!("Cron expression '{cron}' must have 6 or 7 fields (seconds first)."),
                ));
            }
        }

        if !(1..=366).contains(&self.report_days) {
            return Err(ConfigError::validation(
                "schedule.report_days",
                "Report window must be between 1 and 366 days.",
            ));
        }

        Ok(())
    }
}

impl MenuConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buckets.is_empty() {
            return Err(ConfigError::validation(
                "menu.buckets",
                "At least one bucket is required.",
            ));
        }

        if self.buckets.len() > MAX_LIST_ROWS {
            return Err(ConfigError::validation(
                "menu.buckets",
                format!("A list menu holds at most {MAX_LIST_ROWS} buckets."),
            ));
        }

        for range in [BpRange::Low, BpRange::High] {
            if self.buckets_in(range).next().is_none() {
                return Err(ConfigError::validation(
                    "menu.buckets",
                    format!("No bucket is assigned to the {range} range."),
                ));
            }
        }

        let mut ids: HashSet<&str> = HashSet::new();
        for id in [&self.range_low_id, &self.range_high_id, &self.subscribe_id] {
            if id.trim().is_empty() || !ids.insert(id) {
                return Err(ConfigError::validation(
                    "menu",
                    format!("Reply identifier '{id}' is blank or duplicated."),
                ));
            }
        }

        for bucket in &self.buckets {
            if bucket.id.trim().is_empty() || !ids.insert(&bucket.id) {
                return Err(ConfigError::validation(
                    "menu.buckets",
                    format!("Bucket identifier '{}' is blank or duplicated.", bucket.id),
                ));
            }
            let title_len = bucket.label.chars().count();
            if title_len == 0 || title_len > MAX_ROW_TITLE {
                return Err(ConfigError::validation(
                    "menu.buckets",
                    format!(
                        "Bucket label '{}' must be 1-{MAX_ROW_TITLE} characters.",
                        bucket.label
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl MessagesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, template) in [
            ("messages.alert", &self.alert),
            ("messages.confirmation", &self.confirmation),
        ] {
            if !template.contains("{value}") {
                return Err(ConfigError::validation(
                    field,
                    "Template must contain the {value} placeholder.",
                ));
            }
        }
        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first error found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.whatsapp.validate()?;
        self.recipients.validate()?;
        self.security.validate()?;
        self.rate_limit.validate()?;
        self.subscription.validate()?;
        self.schedule.validate()?;
        self.menu.validate()?;
        self.messages.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::valid_settings;
    use crate::models::Bucket;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        valid_settings().validate().unwrap();
    }

    #[test]
    fn test_empty_database_url_is_allowed() {
        let config = DatabaseConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_postgres_url_is_rejected() {
        let config = DatabaseConfig {
            url: "mysql://localhost/bp".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "database.url");
    }

    #[test]
    fn test_missing_access_token() {
        let mut settings = valid_settings();
        settings.whatsapp.access_token.clear();
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "whatsapp.access_token"
        );
    }

    #[test]
    fn test_caregiver_required() {
        let mut settings = valid_settings();
        settings.recipients.caregivers.clear();
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "recipients.caregivers"
        );
    }

    #[test]
    fn test_senior_cannot_double_as_caregiver() {
        let mut settings = valid_settings();
        settings.recipients.caregivers[0].phone = settings.recipients.senior.clone();
        assert_eq!(field_of(settings.validate().unwrap_err()), "recipients");
    }

    #[test]
    fn test_short_admin_token() {
        let mut settings = valid_settings();
        settings.security.admin_token = "short".to_string();
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "security.admin_token"
        );
    }

    #[test]
    fn test_bucket_id_collides_with_range_id() {
        let mut menu = MenuConfig::default();
        menu.buckets[0].id = "range_low".to_string();
        assert_eq!(field_of(menu.validate().unwrap_err()), "menu.buckets");
    }

    #[test]
    fn test_too_many_buckets() {
        let mut menu = MenuConfig::default();
        menu.buckets
            .push(Bucket::new("bp_155", "155", BpRange::High, 155));
        assert_eq!(field_of(menu.validate().unwrap_err()), "menu.buckets");
    }

    #[test]
    fn test_each_range_needs_a_bucket() {
        let mut menu = MenuConfig::default();
        menu.buckets.retain(|b| b.range == BpRange::High);
        let err = menu.validate().unwrap_err();
        assert!(err.to_string().contains("low range"));
    }

    #[test]
    fn test_unknown_timezone() {
        let schedule = ScheduleConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert_eq!(
            field_of(schedule.validate().unwrap_err()),
            "schedule.timezone"
        );
    }

    #[test]
    fn test_five_field_cron_is_rejected() {
        let schedule = ScheduleConfig {
            timezone: "UTC".to_string(),
            menu_cron: "0 9-23 * * *".to_string(),
            ..Default::default()
        };
        assert_eq!(
            field_of(schedule.validate().unwrap_err()),
            "schedule.menu_cron"
        );
    }

    #[test]
    fn test_alert_template_needs_placeholder() {
        let messages = MessagesConfig {
            alert: "Давление".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(messages.validate().unwrap_err()), "messages.alert");
    }

    #[test]
    fn test_rate_limit_disabled_skips_bounds() {
        let config = RateLimitConfig {
            enabled: false,
            max_requests: 0,
            window_seconds: 0,
        };
        assert!(config.validate().is_ok());
    }
}
