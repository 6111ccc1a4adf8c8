//! WebhookEventRepository port - processed gateway events by event id.
//!
//! The gateway may deliver the same event several times. Each verified
//! event is recorded with its outcome so a redelivery of an applied or
//! skipped event is answered without dispatching it again, and failures
//! stay queryable for offline remediation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ValidationError};

/// Stored outcome of one processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedOutcome {
    Applied,
    Skipped,
    Failed,
}

impl RecordedOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordedOutcome::Applied => "applied",
            RecordedOutcome::Skipped => "skipped",
            RecordedOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for RecordedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordedOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(RecordedOutcome::Applied),
            "skipped" => Ok(RecordedOutcome::Skipped),
            "failed" => Ok(RecordedOutcome::Failed),
            other => Err(ValidationError::invalid_format(
                "outcome",
                format!("unknown webhook outcome '{}'", other),
            )),
        }
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Gateway event ID (evt_xxx).
    pub event_id: String,

    /// Gateway event type string.
    pub event_type: String,

    pub processed_at: DateTime<Utc>,

    pub outcome: RecordedOutcome,

    /// Skip reason or failure detail.
    pub detail: Option<String>,

    /// Full event payload for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    pub fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: RecordedOutcome,
        detail: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            outcome,
            detail,
            payload,
        }
    }

    /// True if a redelivery of this event must not be dispatched again.
    pub fn is_settled(&self) -> bool {
        self.outcome != RecordedOutcome::Failed
    }
}

/// Result of attempting to save a webhook record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was stored, either new or replacing an earlier failure.
    Inserted,
    /// A settled record with the same event id already exists.
    AlreadyExists,
}

/// Repository for processed webhook events.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Stores a record. An existing `failed` record for the same event id
    /// is replaced; an existing settled record is left untouched.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Delete records processed before the given instant.
    /// Returns the number deleted.
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}
