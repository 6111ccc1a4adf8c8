//! Notification sender port.
//!
//! Email is best-effort: callers log a failed send and carry on. A send
//! never blocks or reverses an order decision.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::DomainError;

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}

/// Sends `message`, logging instead of returning any failure.
pub async fn send_best_effort(sender: &dyn NotificationSender, message: &EmailMessage) {
    if let Err(err) = sender.send(message).await {
        tracing::error!(
            to = %message.to,
            subject = %message.subject,
            error = %err,
            "failed to send notification"
        );
    }
}
