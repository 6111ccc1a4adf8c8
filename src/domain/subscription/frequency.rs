//! Delivery frequency for recurring subscriptions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// How often a subscription ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl DeliveryFrequency {
    /// The delivery after `from`: +7 days, +14 days, or +1 calendar month.
    pub fn next_after(&self, from: Timestamp) -> Timestamp {
        match self {
            DeliveryFrequency::Weekly => from.add_days(7),
            DeliveryFrequency::Biweekly => from.add_days(14),
            DeliveryFrequency::Monthly => from.add_calendar_months(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryFrequency::Weekly => "weekly",
            DeliveryFrequency::Biweekly => "biweekly",
            DeliveryFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for DeliveryFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryFrequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(DeliveryFrequency::Weekly),
            "biweekly" => Ok(DeliveryFrequency::Biweekly),
            "monthly" => Ok(DeliveryFrequency::Monthly),
            other => Err(ValidationError::invalid_format(
                "frequency",
                format!("unknown delivery frequency '{}'", other),
            )),
        }
    }
}
