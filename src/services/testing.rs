//! In-process gateway double shared by service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::gateway::{DeliveryError, DeliveryGateway, MessageId};
use crate::models::BpRange;
use crate::utils::PhoneNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { to: String, body: String },
    BucketMenu { to: String },
    RangeButtons { to: String },
    RangeMenu { to: String, range: BpRange },
    SubscriptionPrompt { to: String },
}

impl Sent {
    pub fn to(&self) -> &str {
        match self {
            Sent::Text { to, .. }
            | Sent::BucketMenu { to }
            | Sent::RangeButtons { to }
            | Sent::RangeMenu { to, .. }
            | Sent::SubscriptionPrompt { to } => to,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeGateway {
    sent: Mutex<Vec<Sent>>,
    failing: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    finished: Mutex<Vec<(String, Instant)>>,
    fail_prompts: AtomicBool,
    counter: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send to `phone` fails with a provider error.
    pub fn fail_for(&self, phone: &str) {
        self.failing.lock().unwrap().insert(phone.to_string());
    }

    /// Every send to `phone` panics inside the gateway.
    pub fn panic_for(&self, phone: &str) {
        self.panicking.lock().unwrap().insert(phone.to_string());
    }

    /// Every send to `phone` stalls for `delay` before settling.
    pub fn delay_for(&self, phone: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(phone.to_string(), delay);
    }

    /// When the first send to `phone` settled.
    pub fn finished_at(&self, phone: &str) -> Option<Instant> {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .find(|(to, _)| to == phone)
            .map(|(_, at)| *at)
    }

    pub fn fail_prompts(&self) {
        self.fail_prompts.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, phone: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { to, body } if to == phone => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn prompts_to(&self, phone: &str) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::SubscriptionPrompt { to } if to == phone))
            .count()
    }

    async fn deliver(&self, call: Sent) -> Result<MessageId, DeliveryError> {
        let to = call.to().to_string();
        let delay = self.delays.lock().unwrap().get(&to).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.finished.lock().unwrap().push((to.clone(), Instant::now()));

        if self.panicking.lock().unwrap().contains(&to) {
            panic!("gateway exploded for {to}");
        }
        let prompt = matches!(call, Sent::SubscriptionPrompt { .. });
        self.sent.lock().unwrap().push(call);

        if self.failing.lock().unwrap().contains(&to)
            || (prompt && self.fail_prompts.load(Ordering::SeqCst))
        {
            return Err(DeliveryError::Provider {
                status: 400,
                code: 131026,
                kind: "OAuthException".to_string(),
                message: "Message undeliverable".to_string(),
                trace_id: None,
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("wamid.fake{n}"))
    }
}

#[async_trait]
impl DeliveryGateway for FakeGateway {
    async fn send_text(&self, to: &PhoneNumber, body: &str) -> Result<MessageId, DeliveryError> {
        self.deliver(Sent::Text {
            to: to.as_str().to_string(),
            body: body.to_string(),
        })
        .await
    }

    async fn send_bucket_menu(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError> {
        self.deliver(Sent::BucketMenu {
            to: to.as_str().to_string(),
        })
        .await
    }

    async fn send_range_buttons(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError> {
        self.deliver(Sent::RangeButtons {
            to: to.as_str().to_string(),
        })
        .await
    }

    async fn send_range_menu(
        &self,
        to: &PhoneNumber,
        range: BpRange,
    ) -> Result<MessageId, DeliveryError> {
        self.deliver(Sent::RangeMenu {
            to: to.as_str().to_string(),
            range,
        })
        .await
    }

    async fn send_subscription_prompt(&self, to: &PhoneNumber) -> Result<MessageId, DeliveryError> {
        self.deliver(Sent::SubscriptionPrompt {
            to: to.as_str().to_string(),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
