//! Phone number normalization.
//!
//! WhatsApp addresses recipients by bare digits (`79001234567`), while
//! operators tend to write numbers as `+7 (900) 123-45-67`. Everything that
//! crosses the gateway goes through [`PhoneNumber`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,

    #[error("phone number must have {MIN_DIGITS}-{MAX_DIGITS} digits, got {0}")]
    Length(usize),
}

/// A phone number in digit-only form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strips everything but digits and checks the E.164 length bounds.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let digits = Self::normalize(raw);
        match digits.0.len() {
            0 => Err(PhoneError::Empty),
            n if !(MIN_DIGITS..=MAX_DIGITS).contains(&n) => Err(PhoneError::Length(n)),
            _ => Ok(digits),
        }
    }

    /// Digit-only form without length checks, for sender ids reported by the
    /// provider which are trusted as-is.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.chars().filter(char::is_ascii_digit).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `+<digits>` form used in logs and reports.
    pub fn display(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
