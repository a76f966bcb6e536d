use serde::{Deserialize, Serialize};

use crate::utils::PhoneNumber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caregiver {
    pub name: String,
    pub phone: PhoneNumber,
}

/// The senior who reports readings and the ordered caregivers who are
/// notified about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    pub senior: PhoneNumber,
    pub caregivers: Vec<Caregiver>,
}

impl Recipients {
    pub fn is_senior(&self, phone: &PhoneNumber) -> bool {
        &self.senior == phone
    }

    pub fn is_caregiver(&self, phone: &PhoneNumber) -> bool {
        self.caregivers.iter().any(|c| &c.phone == phone)
    }

    /// Senior first, then caregivers in configured order.
    pub fn everyone(&self) -> impl Iterator<Item = &PhoneNumber> {
        std::iter::once(&self.senior).chain(self.caregivers.iter().map(|c| &c.phone))
    }
}
