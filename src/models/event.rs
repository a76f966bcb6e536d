//! Durable projection of a dispatch outcome.
//!
//! Caregiver deliveries are stored as an ordered JSON array so the row shape
//! does not depend on how many caregivers are configured.

use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff::Timestamp;
use jiff_diesel::ToDiesel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DispatchOutcome;
use crate::schema::pressure_events;
use crate::utils::PhoneNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Aggregate caregiver status of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::EventOutcome")]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Every caregiver was notified.
    Delivered,
    Partial,
    /// No caregiver was notified.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CaregiverDelivery {
    pub caregiver: String,
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One recorded blood-pressure reading and how its fan-out went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventRecord {
    #[schema(value_type = String, format = DateTime)]
    pub recorded_at: Timestamp,
    #[schema(value_type = String)]
    pub sender: PhoneNumber,
    pub bucket: String,
    pub deliveries: Vec<CaregiverDelivery>,
}

impl EventRecord {
    pub fn from_outcome(outcome: &DispatchOutcome) -> Self {
        let deliveries = outcome
            .caregivers
            .iter()
            .map(|c| CaregiverDelivery {
                caregiver: c.caregiver.name.clone(),
                phone: c.caregiver.phone.clone(),
                status: if c.result.is_success() {
                    DeliveryStatus::Sent
                } else {
                    DeliveryStatus::Failed
                },
                message_id: c.result.message_id().map(str::to_string),
                error: c.result.error_detail().map(str::to_string),
            })
            .collect();

        Self {
            recorded_at: outcome.dispatched_at,
            sender: outcome.sender.clone(),
            bucket: outcome.bucket.label.clone(),
            deliveries,
        }
    }

    pub fn outcome(&self) -> EventOutcome {
        let sent = self
            .deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Sent)
            .count();
        match sent {
            0 => EventOutcome::Failed,
            n if n == self.deliveries.len() => EventOutcome::Delivered,
            _ => EventOutcome::Partial,
        }
    }

    pub fn to_new_row(&self) -> Result<NewPressureEvent, serde_json::Error> {
        Ok(NewPressureEvent {
            recorded_at: self.recorded_at.to_diesel(),
            sender: self.sender.as_str().to_string(),
            bucket: self.bucket.clone(),
            outcome: self.outcome(),
            deliveries: serde_json::to_value(&self.deliveries)?,
        })
    }
}

/// An event together with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredEvent {
    pub id: i64,
    pub outcome: EventOutcome,
    #[serde(flatten)]
    pub record: EventRecord,
}

impl StoredEvent {
    pub fn new(id: i64, record: EventRecord) -> Self {
        Self {
            id,
            outcome: record.outcome(),
            record,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pressure_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PressureEventRow {
    pub id: i64,
    pub recorded_at: jiff_diesel::Timestamp,
    pub sender: String,
    pub bucket: String,
    pub outcome: EventOutcome,
    pub deliveries: serde_json::Value,
    pub created_at: jiff_diesel::Timestamp,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pressure_events)]
pub struct NewPressureEvent {
    pub recorded_at: jiff_diesel::Timestamp,
    pub sender: String,
    pub bucket: String,
    pub outcome: EventOutcome,
    pub deliveries: serde_json::Value,
}

impl TryFrom<PressureEventRow> for StoredEvent {
    type Error = serde_json::Error;

    fn try_from(row: PressureEventRow) -> Result<Self, Self::Error> {
        let record = EventRecord {
            recorded_at: row.recorded_at.to_jiff(),
            sender: PhoneNumber::normalize(&row.sender),
            bucket: row.bucket,
            deliveries: serde_json::from_value(row.deliveries)?,
        };
        Ok(Self {
            id: row.id,
            outcome: row.outcome,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(name: &str, status: DeliveryStatus) -> CaregiverDelivery {
        CaregiverDelivery {
            caregiver: name.to_string(),
            phone: PhoneNumber::normalize("37120000001"),
            status,
            message_id: (status == DeliveryStatus::Sent).then(|| format!("wamid.{name}")),
            error: (status == DeliveryStatus::Failed).then(|| "timeout".to_string()),
        }
    }

    fn record(statuses: &[DeliveryStatus]) -> EventRecord {
        EventRecord {
            recorded_at: Timestamp::UNIX_EPOCH,
            sender: PhoneNumber::normalize("37120000000"),
            bucket: "135".to_string(),
            deliveries: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| delivery(&format!("c{i}"), *s))
                .collect(),
        }
    }

    #[test]
    fn test_outcome_reflects_caregiver_statuses() {
        use DeliveryStatus::*;
        assert_eq!(record(&[Sent, Sent]).outcome(), EventOutcome::Delivered);
        assert_eq!(record(&[Sent, Failed]).outcome(), EventOutcome::Partial);
        assert_eq!(record(&[Failed, Failed]).outcome(), EventOutcome::Failed);
    }

    #[test]
    fn test_deliveries_json_keeps_order_and_ids() {
        let original = record(&[DeliveryStatus::Failed, DeliveryStatus::Sent]);
        let row = original.to_new_row().unwrap();
        let parsed: Vec<CaregiverDelivery> = serde_json::from_value(row.deliveries).unwrap();

        assert_eq!(parsed, original.deliveries);
        assert_eq!(parsed[1].message_id.as_deref(), Some("wamid.c1"));
        assert_eq!(row.outcome, EventOutcome::Partial);
    }
}
