//! Service layer: parsing, fan-out, persistence and reporting.
//!
//! Everything that talks to the outside world does so through
//! [`DeliveryGateway`] and [`EventRecorder`], so the whole pipeline runs
//! against in-memory doubles in tests.

pub mod background;
pub mod dispatcher;
pub mod gateway;
pub mod ingest;
pub mod parser;
pub mod prompt;
pub mod recorder;
pub mod reports;
pub mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use background::BackgroundTasks;
pub use dispatcher::NotificationDispatcher;
pub use gateway::{DeliveryError, DeliveryGateway, WhatsAppGateway};
pub use ingest::{Disposition, ProcessSummary, WebhookProcessor};
pub use parser::{PayloadParser, Unrecognized};
pub use prompt::{MenuKind, MenuPrompter};
pub use recorder::{DatabaseEventRecorder, EventRecorder, MemoryEventRecorder};
pub use reports::{DailyAverage, ReportDelivery, ReportService, Statistics};
pub use throttle::SubscriptionThrottle;

use std::sync::Arc;

use jiff::tz::TimeZone;

use crate::config::{ConfigError, Settings};

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since everything inside is `Arc`-backed.
#[derive(Clone)]
pub struct Services {
    pub gateway: Arc<dyn DeliveryGateway>,
    pub recorder: Arc<dyn EventRecorder>,
    pub dispatcher: NotificationDispatcher,
    pub webhooks: WebhookProcessor,
    pub prompter: MenuPrompter,
    pub reports: ReportService,
    pub background: BackgroundTasks,
    pub throttle: SubscriptionThrottle,
    pub timezone: TimeZone,
}

impl Services {
    /// Wires the pipeline around an already constructed gateway and recorder.
    pub fn new(
        settings: &Settings,
        gateway: Arc<dyn DeliveryGateway>,
        recorder: Arc<dyn EventRecorder>,
    ) -> Result<Self, ConfigError> {
        let recipients = Arc::new(settings.recipients.resolve()?);
        let menu = Arc::new(settings.menu.clone());
        let messages = Arc::new(settings.messages.clone());
        let timezone = TimeZone::get(&settings.schedule.timezone).map_err(|e| {
            ConfigError::validation("schedule.timezone", format!("Unknown time zone: {e}"))
        })?;

        let background = BackgroundTasks::new();
        let throttle = SubscriptionThrottle::from_hours(settings.subscription.cooldown_hours);

        let dispatcher = NotificationDispatcher::new(
            gateway.clone(),
            recorder.clone(),
            throttle.clone(),
            background.clone(),
            recipients.clone(),
            messages.clone(),
        );
        let prompter = MenuPrompter::new(
            gateway.clone(),
            recipients.senior.clone(),
            settings.schedule.menu_style,
        );
        let webhooks = WebhookProcessor::new(
            PayloadParser::new(menu.clone()),
            dispatcher.clone(),
            prompter.clone(),
            gateway.clone(),
            recipients.clone(),
            messages,
            settings.security.sender_policy,
        );
        let reports = ReportService::new(
            recorder.clone(),
            gateway.clone(),
            recipients,
            menu,
            timezone.clone(),
            settings.schedule.report_days,
        );

        tracing::info!(
            gateway = gateway.name(),
            recorder = recorder.name(),
            caregivers = settings.recipients.caregivers.len(),
            "Services initialized"
        );

        Ok(Self {
            gateway,
            recorder,
            dispatcher,
            webhooks,
            prompter,
            reports,
            background,
            throttle,
            timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::valid_settings;
    use crate::services::testing::FakeGateway;

    #[tokio::test]
    async fn test_services_wire_end_to_end() {
        let gateway = Arc::new(FakeGateway::new());
        let recorder = Arc::new(MemoryEventRecorder::new());
        let services = Services::new(&valid_settings(), gateway.clone(), recorder.clone()).unwrap();

        let body = serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{ "changes": [{ "value": { "messages": [{
                "from": "37120000000",
                "id": "wamid.in",
                "type": "interactive",
                "interactive": {
                    "type": "list_reply",
                    "list_reply": { "id": "bp_120", "title": "120" }
                }
            }]}}]}]
        });
        services
            .webhooks
            .process_raw(body.to_string().as_bytes())
            .await
            .unwrap();
        services.background.drain().await;

        assert_eq!(recorder.count().await.unwrap(), 1);
        assert_eq!(gateway.texts_to("37120000001").len(), 1);
        assert_eq!(gateway.texts_to("37120000002").len(), 1);
        assert_eq!(gateway.prompts_to("37120000001"), 1);
    }

    #[test]
    fn test_invalid_recipients_fail_wiring() {
        let mut settings = valid_settings();
        settings.recipients.senior = "123".to_string();
        let result = Services::new(
            &settings,
            Arc::new(FakeGateway::new()),
            Arc::new(MemoryEventRecorder::new()),
        );
        assert!(result.is_err());
    }
}
