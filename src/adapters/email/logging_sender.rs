//! Senders that do not leave the process.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, NotificationSender};

/// Logs each message instead of delivering it. Used when no email
/// provider key is configured.
#[derive(Debug, Default)]
pub struct LoggingNotificationSender;

impl LoggingNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery disabled, message logged only"
        );
        Ok(())
    }
}

/// Keeps every message in memory for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotificationSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: Mutex<bool>,
}

impl RecordingNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages whose subject starts with `prefix`.
    pub fn sent_with_subject(&self, prefix: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.subject.starts_with(prefix))
            .collect()
    }

    /// Makes subsequent sends fail.
    pub fn fail_sends(&self, fail: bool) {
        *self.fail.lock().unwrap_or_else(PoisonError::into_inner) = fail;
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        if *self.fail.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(DomainError::new(ErrorCode::InternalError, "Email provider unavailable"));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }
}
