//! Decoded user intent from an inbound interactive reply.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::PhoneNumber;

/// Coarse range offered before the finer bucket list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BpRange {
    Low,
    High,
}

impl BpRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            BpRange::Low => "low",
            BpRange::High => "high",
        }
    }
}

impl fmt::Display for BpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled menu choice from the configured allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Bucket {
    /// Reply identifier carried back by WhatsApp (`bp_gt160`).
    pub id: String,
    /// Label shown in menus and notifications (`>160`).
    pub label: String,
    pub range: BpRange,
    /// Numeric stand-in used for averages.
    pub value: u16,
    /// Critical readings get the alarm marker in caregiver alerts.
    #[serde(default)]
    pub critical: bool,
}

impl Bucket {
    pub fn new(id: &str, label: &str, range: BpRange, value: u16) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            range,
            value,
            critical: false,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodPressureSelection {
    pub sender: PhoneNumber,
    pub bucket: Bucket,
}

/// A raw reply maps to at most one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    BloodPressure(BloodPressureSelection),
    Range { sender: PhoneNumber, range: BpRange },
    SubscriptionOptIn { sender: PhoneNumber },
}

impl Selection {
    pub fn sender(&self) -> &PhoneNumber {
        match self {
            Selection::BloodPressure(selection) => &selection.sender,
            Selection::Range { sender, .. } | Selection::SubscriptionOptIn { sender } => sender,
        }
    }
}
