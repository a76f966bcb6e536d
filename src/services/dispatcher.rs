//! Fan-out of one blood-pressure selection to the senior and every caregiver.

use std::sync::Arc;

use futures::future::join_all;
use jiff::Timestamp;

use super::background::BackgroundTasks;
use super::gateway::{DeliveryError, DeliveryGateway, send_isolated};
use super::recorder::EventRecorder;
use super::throttle::SubscriptionThrottle;
use crate::config::MessagesConfig;
use crate::models::{
    BloodPressureSelection, CaregiverResult, DeliveryResult, DispatchOutcome, EventRecord,
    Recipients,
};
use crate::utils::PhoneNumber;

#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn DeliveryGateway>,
    recorder: Arc<dyn EventRecorder>,
    throttle: SubscriptionThrottle,
    background: BackgroundTasks,
    recipients: Arc<Recipients>,
    messages: Arc<MessagesConfig>,
}

impl NotificationDispatcher {
    pub fn new(
        gateway: Arc<dyn DeliveryGateway>,
        recorder: Arc<dyn EventRecorder>,
        throttle: SubscriptionThrottle,
        background: BackgroundTasks,
        recipients: Arc<Recipients>,
        messages: Arc<MessagesConfig>,
    ) -> Self {
        Self {
            gateway,
            recorder,
            throttle,
            background,
            recipients,
            messages,
        }
    }

    fn send_text(&self, to: PhoneNumber, body: String) -> impl Future<Output = DeliveryResult> {
        let gateway = self.gateway.clone();
        send_isolated(async move { gateway.send_text(&to, &body).await })
    }

    /// Sends the confirmation and every caregiver alert concurrently, waits
    /// for all of them, then records the event. Never fails: each send
    /// settles into its own [`DeliveryResult`].
    pub async fn dispatch(&self, selection: &BloodPressureSelection) -> DispatchOutcome {
        let sender = &selection.sender;
        let bucket = &selection.bucket;

        if !self.recipients.is_senior(sender) {
            tracing::warn!(
                sender = %sender,
                bucket = %bucket.label,
                "Reading from a number other than the configured senior"
            );
        }

        let dispatched_at = Timestamp::now();
        let alert = self.messages.alert_for(bucket);

        let confirmation = self.send_text(sender.clone(), self.messages.confirmation_for(bucket));
        let alerts = self
            .recipients
            .caregivers
            .iter()
            .map(|caregiver| self.send_text(caregiver.phone.clone(), alert.clone()));

        let (senior, alert_results) = tokio::join!(confirmation, join_all(alerts));

        let caregivers: Vec<CaregiverResult> = self
            .recipients
            .caregivers
            .iter()
            .cloned()
            .zip(alert_results)
            .map(|(caregiver, result)| CaregiverResult { caregiver, result })
            .collect();

        for c in &caregivers {
            if let DeliveryResult::Failed { error } = &c.result {
                tracing::warn!(caregiver = %c.caregiver.name, error = %error, "Caregiver alert failed");
            }
        }

        let mut outcome = DispatchOutcome {
            dispatched_at,
            sender: sender.clone(),
            bucket: bucket.clone(),
            senior,
            caregivers,
            error_notice: None,
            recorded: false,
        };

        if outcome.all_caregivers_failed() {
            let notice = self
                .send_text(sender.clone(), self.messages.delivery_failed.clone())
                .await;
            if let DeliveryResult::Failed { error } = &notice {
                tracing::error!(sender = %sender, error = %error, "Failed to send delivery-failure notice");
            }
            outcome.error_notice = Some(notice);
        }

        outcome.recorded = self
            .recorder
            .record(&EventRecord::from_outcome(&outcome))
            .await;

        self.schedule_prompts(&outcome);

        tracing::info!(
            sender = %sender,
            bucket = %bucket.label,
            critical = bucket.critical,
            senior_confirmed = outcome.senior.is_success(),
            delivered = outcome.delivered_count(),
            caregivers = outcome.caregivers.len(),
            recorded = outcome.recorded,
            "Blood pressure reading dispatched"
        );

        outcome
    }

    /// Prompts every caregiver that just received an alert and is outside
    /// its cooldown. The cooldown starts when the prompt is scheduled, so
    /// overlapping dispatches do not prompt the same caregiver twice.
    fn schedule_prompts(&self, outcome: &DispatchOutcome) {
        for c in outcome.caregivers.iter().filter(|c| c.result.is_success()) {
            let phone = c.caregiver.phone.clone();
            if !self.throttle.should_prompt(&phone) {
                continue;
            }
            self.throttle.record_prompt_sent(&phone);

            let gateway = self.gateway.clone();
            let name = c.caregiver.name.clone();
            self.background.spawn("subscription_prompt", async move {
                let message_id = gateway.send_subscription_prompt(&phone).await?;
                tracing::debug!(caregiver = %name, message_id = %message_id, "Subscription prompt sent");
                Ok::<_, DeliveryError>(())
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MessagesConfig;
    use crate::models::{BpRange, Bucket, Caregiver, EventOutcome};
    use crate::services::recorder::MemoryEventRecorder;
    use crate::services::testing::FakeGateway;
    use std::time::Duration;
    use tokio::time::Instant;

    const SENIOR: &str = "37120000000";
    const ANNA: &str = "37120000001";
    const PETER: &str = "37120000002";

    struct Fixture {
        gateway: Arc<FakeGateway>,
        recorder: Arc<MemoryEventRecorder>,
        throttle: SubscriptionThrottle,
        background: BackgroundTasks,
        dispatcher: NotificationDispatcher,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(FakeGateway::new());
        let recorder = Arc::new(MemoryEventRecorder::new());
        let throttle = SubscriptionThrottle::from_hours(12);
        let background = BackgroundTasks::new();
        let recipients = Recipients {
            senior: PhoneNumber::normalize(SENIOR),
            caregivers: vec![
                Caregiver {
                    name: "anna".to_string(),
                    phone: PhoneNumber::normalize(ANNA),
                },
                Caregiver {
                    name: "peter".to_string(),
                    phone: PhoneNumber::normalize(PETER),
                },
            ],
        };
        let dispatcher = NotificationDispatcher::new(
            gateway.clone(),
            recorder.clone(),
            throttle.clone(),
            background.clone(),
            Arc::new(recipients),
            Arc::new(MessagesConfig::default()),
        );
        Fixture {
            gateway,
            recorder,
            throttle,
            background,
            dispatcher,
        }
    }

    fn selection(bucket: Bucket) -> BloodPressureSelection {
        BloodPressureSelection {
            sender: PhoneNumber::normalize(SENIOR),
            bucket,
        }
    }

    fn normal() -> Bucket {
        Bucket::new("bp_130", "130", BpRange::High, 130)
    }

    #[tokio::test]
    async fn test_all_deliveries_succeed() {
        let f = fixture();
        let outcome = f.dispatcher.dispatch(&selection(normal())).await;

        assert!(outcome.senior.is_success());
        assert_eq!(outcome.delivered_count(), 2);
        assert!(outcome.error_notice.is_none());
        assert!(outcome.recorded);

        assert_eq!(
            f.gateway.texts_to(SENIOR),
            vec!["✅ Получено: 130. Отправлено детям.".to_string()]
        );
        assert_eq!(
            f.gateway.texts_to(ANNA),
            vec!["✅ Артериальное давление: 130".to_string()]
        );

        let events = f.recorder.recent(10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, EventOutcome::Delivered);
        assert_eq!(events[0].record.bucket, "130");
        assert_eq!(events[0].record.deliveries[0].caregiver, "anna");
        assert_eq!(events[0].record.deliveries[1].caregiver, "peter");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_caregiver_does_not_hold_back_other_sends() {
        let f = fixture();
        f.gateway.delay_for(SENIOR, Duration::from_secs(3));
        f.gateway.delay_for(ANNA, Duration::from_secs(10));
        f.gateway.delay_for(PETER, Duration::from_secs(2));

        let started = Instant::now();
        let outcome = f.dispatcher.dispatch(&selection(normal())).await;
        let elapsed = started.elapsed();

        assert!(outcome.senior.is_success());
        assert_eq!(outcome.delivered_count(), 2);

        // Bounded by the slowest send, not the 15s sum.
        assert!(elapsed >= Duration::from_secs(10), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(11), "elapsed {elapsed:?}");

        let peter_done = f.gateway.finished_at(PETER).unwrap() - started;
        let senior_done = f.gateway.finished_at(SENIOR).unwrap() - started;
        assert!(peter_done < Duration::from_secs(3), "peter {peter_done:?}");
        assert!(senior_done < Duration::from_secs(4), "senior {senior_done:?}");
    }

    #[tokio::test]
    async fn test_critical_bucket_uses_critical_marker() {
        let f = fixture();
        f.dispatcher
            .dispatch(&selection(Bucket::new("bp_gt160", ">160", BpRange::High, 165).critical()))
            .await;

        assert_eq!(
            f.gateway.texts_to(PETER),
            vec!["❗️ Артериальное давление: >160".to_string()]
        );
    }

    #[tokio::test]
    async fn test_every_failure_combination_settles() {
        for mask in 0u8..8 {
            let f = fixture();
            let senior_fails = mask & 1 != 0;
            let anna_fails = mask & 2 != 0;
            let peter_fails = mask & 4 != 0;
            if senior_fails {
                f.gateway.fail_for(SENIOR);
            }
            if anna_fails {
                f.gateway.fail_for(ANNA);
            }
            if peter_fails {
                f.gateway.fail_for(PETER);
            }

            let outcome = f.dispatcher.dispatch(&selection(normal())).await;

            assert_eq!(outcome.senior.is_success(), !senior_fails, "mask {mask}");
            assert_eq!(outcome.caregivers[0].result.is_success(), !anna_fails, "mask {mask}");
            assert_eq!(outcome.caregivers[1].result.is_success(), !peter_fails, "mask {mask}");
            assert_eq!(
                outcome.error_notice.is_some(),
                anna_fails && peter_fails,
                "mask {mask}"
            );
            assert!(outcome.recorded);

            let expected = match (anna_fails, peter_fails) {
                (false, false) => EventOutcome::Delivered,
                (true, true) => EventOutcome::Failed,
                _ => EventOutcome::Partial,
            };
            let events = f.recorder.recent(1).await.unwrap();
            assert_eq!(events[0].outcome, expected, "mask {mask}");
        }
    }

    #[tokio::test]
    async fn test_all_caregivers_failed_sends_notice() {
        let f = fixture();
        f.gateway.fail_for(ANNA);
        f.gateway.fail_for(PETER);

        let outcome = f.dispatcher.dispatch(&selection(normal())).await;

        assert!(outcome.error_notice.as_ref().unwrap().is_success());
        let texts = f.gateway.texts_to(SENIOR);
        assert_eq!(texts.len(), 2);
        assert!(texts[1].starts_with("❌"));

        let event = &f.recorder.recent(1).await.unwrap()[0];
        assert!(event.record.deliveries.iter().all(|d| d.error.is_some()));
    }

    #[tokio::test]
    async fn test_failed_notice_is_swallowed() {
        let f = fixture();
        for phone in [SENIOR, ANNA, PETER] {
            f.gateway.fail_for(phone);
        }

        let outcome = f.dispatcher.dispatch(&selection(normal())).await;
        assert!(!outcome.error_notice.unwrap().is_success());
        assert!(outcome.recorded);
    }

    #[tokio::test]
    async fn test_panicking_send_is_isolated() {
        let f = fixture();
        f.gateway.panic_for(ANNA);

        let outcome = f.dispatcher.dispatch(&selection(normal())).await;
        assert!(!outcome.caregivers[0].result.is_success());
        assert!(outcome.caregivers[1].result.is_success());
        assert!(outcome.senior.is_success());
    }

    #[tokio::test]
    async fn test_non_senior_sender_is_still_dispatched() {
        let f = fixture();
        let mut stranger = selection(normal());
        stranger.sender = PhoneNumber::normalize("37129999999");

        let outcome = f.dispatcher.dispatch(&stranger).await;
        assert_eq!(outcome.delivered_count(), 2);
        assert_eq!(f.gateway.texts_to("37129999999").len(), 1);
    }

    #[tokio::test]
    async fn test_prompts_only_successful_caregivers_once_per_cooldown() {
        let f = fixture();
        f.gateway.fail_for(PETER);

        f.dispatcher.dispatch(&selection(normal())).await;
        f.background.drain().await;
        assert_eq!(f.gateway.prompts_to(ANNA), 1);
        assert_eq!(f.gateway.prompts_to(PETER), 0);
        assert!(!f.throttle.should_prompt(&PhoneNumber::normalize(ANNA)));

        f.dispatcher.dispatch(&selection(normal())).await;
        f.background.drain().await;
        assert_eq!(f.gateway.prompts_to(ANNA), 1);
    }

    #[tokio::test]
    async fn test_prompt_failure_does_not_affect_outcome() {
        let f = fixture();
        f.gateway.fail_prompts();

        let outcome = f.dispatcher.dispatch(&selection(normal())).await;
        f.background.drain().await;

        assert_eq!(outcome.delivered_count(), 2);
        assert_eq!(f.gateway.prompts_to(ANNA), 1);
    }
}
