//! Per-caregiver cooldown for subscription prompts.
//!
//! Process-local: a restart forgets every timestamp, so the first successful
//! alert after a restart prompts again.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};

use crate::utils::PhoneNumber;

#[derive(Debug, Clone)]
pub struct SubscriptionThrottle {
    cooldown: SignedDuration,
    last_prompt: Arc<DashMap<PhoneNumber, Timestamp>>,
}

impl SubscriptionThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: SignedDuration::try_from(cooldown).unwrap_or(SignedDuration::MAX),
            last_prompt: Arc::new(DashMap::new()),
        }
    }

    pub fn from_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours.saturating_mul(3600)))
    }

    pub fn should_prompt(&self, phone: &PhoneNumber) -> bool {
        self.should_prompt_at(phone, Timestamp::now())
    }

    /// True when no prompt was sent yet or the last one is at least one
    /// cooldown old.
    pub fn should_prompt_at(&self, phone: &PhoneNumber, now: Timestamp) -> bool {
        match self.last_prompt.get(phone) {
            None => true,
            Some(last) => now.duration_since(*last) >= self.cooldown,
        }
    }

    pub fn record_prompt_sent(&self, phone: &PhoneNumber) {
        self.record_prompt_sent_at(phone, Timestamp::now());
    }

    pub fn record_prompt_sent_at(&self, phone: &PhoneNumber, at: Timestamp) {
        self.last_prompt.insert(phone.clone(), at);
    }

    /// Time left until the next prompt is allowed, `None` when allowed now.
    pub fn remaining_at(&self, phone: &PhoneNumber, now: Timestamp) -> Option<SignedDuration> {
        let last = *self.last_prompt.get(phone)?;
        let remaining = self.cooldown - now.duration_since(last);
        remaining.is_positive().then_some(remaining)
    }

    pub fn tracked(&self) -> usize {
        self.last_prompt.len()
    }
}
