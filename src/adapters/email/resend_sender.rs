//! Resend transactional email sender.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, NotificationSender};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Sends email through the Resend HTTP API.
pub struct ResendNotificationSender {
    api_key: SecretString,
    /// Formatted `Name <address>` header value.
    from: String,
    endpoint: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendNotificationSender {
    pub fn new(
        api_key: SecretString,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;
        Ok(Self {
            api_key,
            from: from.into(),
            endpoint: RESEND_API_URL.to_string(),
            http_client,
        })
    }

    /// Points the sender at a different endpoint (for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body<'a>(&'a self, message: &'a EmailMessage) -> ResendRequest<'a> {
        ResendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        }
    }
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(message))
            .send()
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::InternalError, format!("Email request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Email provider returned {}: {}", status.as_u16(), body),
            ));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}
