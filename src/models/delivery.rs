use jiff::Timestamp;
use serde::Serialize;

use super::{Bucket, Caregiver};
use crate::utils::PhoneNumber;

/// Outcome of one send attempt toward one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryResult {
    Sent { message_id: String },
    Failed { error: String },
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryResult::Sent { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            DeliveryResult::Sent { message_id } => Some(message_id),
            DeliveryResult::Failed { .. } => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            DeliveryResult::Sent { .. } => None,
            DeliveryResult::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaregiverResult {
    pub caregiver: Caregiver,
    pub result: DeliveryResult,
}

/// Everything that happened while fanning out one reading.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub dispatched_at: Timestamp,
    pub sender: PhoneNumber,
    pub bucket: Bucket,
    pub senior: DeliveryResult,
    /// Same order as the configured caregivers.
    pub caregivers: Vec<CaregiverResult>,
    /// Present only when every caregiver send failed.
    pub error_notice: Option<DeliveryResult>,
    pub recorded: bool,
}

impl DispatchOutcome {
    pub fn all_caregivers_failed(&self) -> bool {
        !self.caregivers.is_empty() && self.caregivers.iter().all(|c| !c.result.is_success())
    }

    pub fn delivered_count(&self) -> usize {
        self.caregivers
            .iter()
            .filter(|c| c.result.is_success())
            .count()
    }
}
