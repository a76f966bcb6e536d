mod delivery;
mod event;
mod period;
mod recipient;
mod selection;
pub mod webhook;

pub use delivery::{CaregiverResult, DeliveryResult, DispatchOutcome};
pub use event::{
    CaregiverDelivery, DeliveryStatus, EventOutcome, EventRecord, NewPressureEvent,
    PressureEventRow, StoredEvent,
};
pub use period::DayRange;
pub use recipient::{Caregiver, Recipients};
pub use selection::{BloodPressureSelection, BpRange, Bucket, Selection};
