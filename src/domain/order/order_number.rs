//! Human-readable order numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

const PREFIX: &str = "ORD-";
const SUFFIX_LEN: usize = 8;

/// Customer-facing order reference such as `ORD-9F8C1A2B`.
///
/// The suffix is the first 32 bits of a random v4 UUID in uppercase hex.
/// Assigned once at intake and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", PREFIX, uuid[..SUFFIX_LEN].to_uppercase()))
    }

    /// Parses a stored order number, checking prefix and suffix shape.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let suffix = value.strip_prefix(PREFIX).ok_or_else(|| {
            ValidationError::invalid_format("order_number", "missing ORD- prefix")
        })?;
        let well_formed = suffix.len() == SUFFIX_LEN
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));
        if !well_formed {
            return Err(ValidationError::invalid_format(
                "order_number",
                "suffix must be 8 uppercase hex characters",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
