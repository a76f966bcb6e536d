//! Configuration settings structures for bp-relay
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
use crate::models::{BpRange, Bucket, Caregiver, Recipients};
use crate::utils::PhoneNumber;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "bp-relay".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/bp-relay.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_gateway_timeout() -> u64 {
    10
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_seconds() -> u64 {
    15 * 60
}

fn default_cooldown_hours() -> u64 {
    12
}

fn default_menu_cron() -> String {
    "0 0 9-23 * * *".to_string()
}

fn default_report_cron() -> String {
    "0 0 20 * * *".to_string()
}

fn default_report_days() -> u32 {
    30
}

fn default_timezone() -> String {
    "Europe/Riga".to_string()
}

fn default_range_low_id() -> String {
    "range_low".to_string()
}

fn default_range_high_id() -> String {
    "range_high".to_string()
}

fn default_subscribe_id() -> String {
    "subscribe_yes".to_string()
}

fn default_buckets() -> Vec<Bucket> {
    let high = |id: &str, label: &str, value| Bucket::new(id, label, BpRange::High, value);
    vec![
        Bucket::new("bp_lt110", "<110", BpRange::Low, 110),
        Bucket::new("bp_115", "115", BpRange::Low, 115),
        high("bp_120", "120", 120),
        high("bp_125", "125", 125),
        high("bp_130", "130", 130),
        high("bp_135", "135", 135),
        high("bp_140", "140", 140),
        high("bp_145", "145", 145),
        high("bp_150", "150", 150),
        high("bp_gt160", ">160", 165).critical(),
    ]
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// Diesel database connection configuration.
///
/// An empty `url` runs the relay without PostgreSQL; events are then kept in
/// memory for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Whether to automatically run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

impl DatabaseConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// One of `full`, `compact`, `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert settings into the logger's runtime configuration
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format: LogFormat = self
            .file
            .format
            .parse()
            .map_err(|e: String| ConfigError::validation("logger.file.format".to_string(), e))?;

        Ok(LoggerConfig {
            level: self.level,
            console: ConsoleConfig {
                enabled: self.console.enabled,
                colored: self.console.colored,
            },
            file: FileConfig {
                enabled: self.file.enabled,
                path: PathBuf::from(self.file.path),
                append: self.file.append,
                format,
            },
        })
    }
}

// ============================================================================
// WhatsApp Cloud API Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Permanent or system-user access token
    #[serde(default)]
    pub access_token: String,

    /// Sending phone number id from the Meta app dashboard
    #[serde(default)]
    pub phone_number_id: String,

    /// Secret echoed back during the webhook verification handshake
    #[serde(default)]
    pub verify_token: String,

    /// App secret; when set, inbound webhook bodies must carry a valid
    /// `X-Hub-Signature-256`
    #[serde(default)]
    pub app_secret: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,
}

impl WhatsAppConfig {
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            self.phone_number_id
        )
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            verify_token: String::new(),
            app_secret: None,
            api_version: default_api_version(),
            base_url: default_base_url(),
            timeout_seconds: default_gateway_timeout(),
        }
    }
}

// ============================================================================
// Recipients
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaregiverConfig {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecipientsConfig {
    /// Number of the person reporting readings
    #[serde(default)]
    pub senior: String,

    /// Notified in this order
    #[serde(default)]
    pub caregivers: Vec<CaregiverConfig>,
}

impl RecipientsConfig {
    /// Normalizes every number into the runtime recipient set.
    pub fn resolve(&self) -> Result<Recipients, ConfigError> {
        let senior = PhoneNumber::parse(&self.senior).map_err(|e| {
            ConfigError::validation("recipients.senior".to_string(), e.to_string())
        })?;

        let caregivers = self
            .caregivers
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let phone = PhoneNumber::parse(&c.phone).map_err(|e| {
                    ConfigError::validation(format!("recipients.caregivers[{i}].phone"), e.to_string())
                })?;
                Ok(Caregiver {
                    name: c.name.clone(),
                    phone,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Recipients { senior, caregivers })
    }
}

// ============================================================================
// Security
// ============================================================================

/// What to do with a reading that arrives from a number other than the
/// configured senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderPolicy {
    /// Log a warning and fan out anyway.
    #[default]
    Warn,
    /// Log a warning and drop the reading.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Bearer token for the admin and manual-trigger endpoints
    #[serde(default)]
    pub admin_token: String,

    #[serde(default)]
    pub sender_policy: SenderPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests allowed per client within one window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Minimum hours between two opt-in prompts to the same caregiver
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: default_cooldown_hours(),
        }
    }
}

// ============================================================================
// Scheduling
// ============================================================================

/// Which menu the senior gets when prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStyle {
    /// Single list with every bucket.
    #[default]
    List,
    /// Low/high buttons followed by the matching bucket list.
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Six-field cron expression (with seconds), evaluated in UTC
    #[serde(default = "default_menu_cron")]
    pub menu_cron: String,

    #[serde(default)]
    pub menu_style: MenuStyle,

    #[serde(default)]
    pub report_enabled: bool,

    #[serde(default = "default_report_cron")]
    pub report_cron: String,

    /// Window of the statistics included in the daily report
    #[serde(default = "default_report_days")]
    pub report_days: u32,

    /// IANA zone used to cut readings into calendar days
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            menu_cron: default_menu_cron(),
            menu_style: MenuStyle::default(),
            report_enabled: false,
            report_cron: default_report_cron(),
            report_days: default_report_days(),
            timezone: default_timezone(),
        }
    }
}

// ============================================================================
// Menu identifiers
// ============================================================================

/// Reply identifiers the parser recognizes and the buckets offered in menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_range_low_id")]
    pub range_low_id: String,

    #[serde(default = "default_range_high_id")]
    pub range_high_id: String,

    #[serde(default = "default_subscribe_id")]
    pub subscribe_id: String,

    /// Allow-list of buckets, in menu order
    #[serde(default = "default_buckets")]
    pub buckets: Vec<Bucket>,
}

impl MenuConfig {
    pub fn bucket(&self, id: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.id == id)
    }

    pub fn bucket_by_label(&self, label: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.label == label)
    }

    pub fn buckets_in(&self, range: BpRange) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter().filter(move |b| b.range == range)
    }

    pub fn range_for(&self, id: &str) -> Option<BpRange> {
        if id == self.range_low_id {
            Some(BpRange::Low)
        } else if id == self.range_high_id {
            Some(BpRange::High)
        } else {
            None
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            range_low_id: default_range_low_id(),
            range_high_id: default_range_high_id(),
            subscribe_id: default_subscribe_id(),
            buckets: default_buckets(),
        }
    }
}

// ============================================================================
// Message templates
// ============================================================================

macro_rules! text_defaults {
    ($($name:ident => $text:expr),* $(,)?) => {
        $(fn $name() -> String { $text.to_string() })*
    };
}

text_defaults! {
    default_alert => "{marker} Артериальное давление: {value}",
    default_critical_marker => "❗️",
    default_normal_marker => "✅",
    default_confirmation => "✅ Получено: {value}. Отправлено детям.",
    default_delivery_failed => "❌ Извините, доставка не удалась. Попробуйте еще раз или обратитесь в поддержку.",
    default_subscription_ack => "👍 Спасибо! Уведомления продолжат приходить.",
    default_menu_body => "❗️ Выберите диапазон артериального давления:",
    default_menu_button => "Выбрать диапазон",
    default_menu_section => "Давление",
    default_range_body => "📊 Выберите диапазон артериального давления:",
    default_range_low_title => "⬇️ Низкое (<115)",
    default_range_high_title => "⬆️ Высокое (≥120)",
    default_low_list_body => "⬇️ Выберите точное значение (низкое/нормальное):",
    default_high_list_body => "⬆️ Выберите точное значение (повышенное/высокое):",
    default_subscription_body => "✅ Продолжить получать уведомления о давлении?",
    default_subscription_button => "✅ Да, продолжить",
}

/// User-facing texts. `{value}` is replaced with the bucket label and
/// `{marker}` with the critical or normal marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_alert")]
    pub alert: String,
    #[serde(default = "default_critical_marker")]
    pub critical_marker: String,
    #[serde(default = "default_normal_marker")]
    pub normal_marker: String,
    #[serde(default = "default_confirmation")]
    pub confirmation: String,
    #[serde(default = "default_delivery_failed")]
    pub delivery_failed: String,
    #[serde(default = "default_subscription_ack")]
    pub subscription_ack: String,
    #[serde(default = "default_menu_body")]
    pub menu_body: String,
    #[serde(default = "default_menu_button")]
    pub menu_button: String,
    #[serde(default = "default_menu_section")]
    pub menu_section: String,
    #[serde(default = "default_range_body")]
    pub range_body: String,
    #[serde(default = "default_range_low_title")]
    pub range_low_title: String,
    #[serde(default = "default_range_high_title")]
    pub range_high_title: String,
    #[serde(default = "default_low_list_body")]
    pub low_list_body: String,
    #[serde(default = "default_high_list_body")]
    pub high_list_body: String,
    #[serde(default = "default_subscription_body")]
    pub subscription_body: String,
    #[serde(default = "default_subscription_button")]
    pub subscription_button: String,
}

impl MessagesConfig {
    pub fn alert_for(&self, bucket: &Bucket) -> String {
        let marker = if bucket.critical {
            &self.critical_marker
        } else {
            &self.normal_marker
        };
        self.alert
            .replace("{marker}", marker)
            .replace("{value}", &bucket.label)
    }

    pub fn confirmation_for(&self, bucket: &Bucket) -> String {
        self.confirmation.replace("{value}", &bucket.label)
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            alert: default_alert(),
            critical_marker: default_critical_marker(),
            normal_marker: default_normal_marker(),
            confirmation: default_confirmation(),
            delivery_failed: default_delivery_failed(),
            subscription_ack: default_subscription_ack(),
            menu_body: default_menu_body(),
            menu_button: default_menu_button(),
            menu_section: default_menu_section(),
            range_body: default_range_body(),
            range_low_title: default_range_low_title(),
            range_high_title: default_range_high_title(),
            low_list_body: default_low_list_body(),
            high_list_body: default_high_list_body(),
            subscription_body: default_subscription_body(),
            subscription_button: default_subscription_button(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    #[serde(default)]
    pub recipients: RecipientsConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub subscription: SubscriptionConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub menu: MenuConfig,

    #[serde(default)]
    pub messages: MessagesConfig,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Settings that pass validation, shared by other test modules.
    pub(crate) fn valid_settings() -> Settings {
        Settings {
            whatsapp: WhatsAppConfig {
                access_token: "EAAG-test-token".to_string(),
                phone_number_id: "1234567890".to_string(),
                verify_token: "verify-me".to_string(),
                ..WhatsAppConfig::default()
            },
            recipients: RecipientsConfig {
                senior: "+371 2000 0000".to_string(),
                caregivers: vec![
                    CaregiverConfig {
                        name: "anna".to_string(),
                        phone: "+371 2000 0001".to_string(),
                    },
                    CaregiverConfig {
                        name: "peter".to_string(),
                        phone: "+371 2000 0002".to_string(),
                    },
                ],
            },
            security: SecurityConfig {
                admin_token: "admin-token-0123456789".to_string(),
                sender_policy: SenderPolicy::Warn,
            },
            schedule: ScheduleConfig {
                timezone: "UTC".to_string(),
                ..ScheduleConfig::default()
            },
            ..Settings::default()
        }
    }

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let config = WhatsAppConfig {
            base_url: "http://localhost:9000/".to_string(),
            phone_number_id: "42".to_string(),
            ..WhatsAppConfig::default()
        };
        assert_eq!(config.messages_url(), "http://localhost:9000/v18.0/42/messages");
    }

    #[test]
    fn test_recipients_resolve_keeps_caregiver_order() {
        let recipients = valid_settings().recipients.resolve().unwrap();
        assert_eq!(recipients.senior.as_str(), "37120000000");
        let names: Vec<_> = recipients.caregivers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["anna", "peter"]);
    }

    #[test]
    fn test_recipients_resolve_reports_bad_caregiver_index() {
        let mut settings = valid_settings();
        settings.recipients.caregivers[1].phone = "12".to_string();

        match settings.recipients.resolve() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "recipients.caregivers[1].phone");
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_alert_marks_critical_buckets() {
        let menu = MenuConfig::default();
        let messages = MessagesConfig::default();

        let critical = menu.bucket("bp_gt160").unwrap();
        let normal = menu.bucket("bp_120").unwrap();

        assert_eq!(messages.alert_for(critical), "❗️ Артериальное давление: >160");
        assert_eq!(messages.alert_for(normal), "✅ Артериальное давление: 120");
        assert_eq!(
            messages.confirmation_for(normal),
            "✅ Получено: 120. Отправлено детям."
        );
    }

    #[test]
    fn test_menu_range_lookup() {
        let menu = MenuConfig::default();
        assert_eq!(menu.range_for("range_low"), Some(BpRange::Low));
        assert_eq!(menu.range_for("range_high"), Some(BpRange::High));
        assert_eq!(menu.range_for("bp_120"), None);
        assert_eq!(menu.buckets_in(BpRange::Low).count(), 2);
    }

    #[test]
    fn test_default_toml_sections_deserialize() {
        let toml_str = r#"
[recipients]
senior = "37120000000"
caregivers = [{ name = "anna", phone = "37120000001" }]

[security]
admin_token = "0123456789abcdef"
sender_policy = "reject"

[schedule]
menu_style = "range"

[[menu.buckets]]
id = "bp_x"
label = "X"
range = "high"
value = 140
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.security.sender_policy, SenderPolicy::Reject);
        assert_eq!(settings.schedule.menu_style, MenuStyle::Range);
        assert_eq!(settings.menu.buckets.len(), 1);
        assert!(!settings.menu.buckets[0].critical);
        assert_eq!(settings.subscription.cooldown_hours, 12);
        assert_eq!(settings.whatsapp.api_version, "v18.0");
    }

    #[test]
    fn test_shipped_default_toml_matches_code_defaults() {
        let shipped: Settings =
            toml::from_str(include_str!("../../config/default.toml")).unwrap();
        let defaults = Settings::default();

        assert_eq!(shipped.server, defaults.server);
        assert_eq!(shipped.rate_limit, defaults.rate_limit);
        assert_eq!(shipped.schedule, defaults.schedule);
        assert_eq!(shipped.menu, defaults.menu);
        assert!(shipped.database.auto_migrate);
        assert!(!shipped.database.is_enabled());
    }

    fn arb_rate_limit() -> impl Strategy<Value = RateLimitConfig> {
        (any::<bool>(), 1u32..=1000, 1u64..=86_400).prop_map(
            |(enabled, max_requests, window_seconds)| RateLimitConfig {
                enabled,
                max_requests,
                window_seconds,
            },
        )
    }

    fn arb_schedule() -> impl Strategy<Value = ScheduleConfig> {
        (
            any::<bool>(),
            prop_oneof![Just(MenuStyle::List), Just(MenuStyle::Range)],
            any::<bool>(),
            prop_oneof![Just("UTC".to_string()), Just("Europe/Riga".to_string())],
        )
            .prop_map(|(enabled, menu_style, report_enabled, timezone)| ScheduleConfig {
                enabled,
                menu_style,
                report_enabled,
                timezone,
                ..ScheduleConfig::default()
            })
    }

    proptest! {
        #[test]
        fn prop_settings_toml_round_trip(
            rate_limit in arb_rate_limit(),
            schedule in arb_schedule(),
            cooldown_hours in 1u64..=168,
            port in 1u16..=65535,
        ) {
            let mut settings = valid_settings();
            settings.rate_limit = rate_limit;
            settings.schedule = schedule;
            settings.subscription.cooldown_hours = cooldown_hours;
            settings.server.port = port;

            let encoded = toml::to_string(&settings).unwrap();
            let decoded: Settings = toml::from_str(&encoded).unwrap();
            prop_assert_eq!(decoded, settings);
        }
    }
}
