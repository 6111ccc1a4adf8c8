//! Webhook error types for Stripe webhook handling.
//!
//! Signature failures reject the whole delivery with 400. Everything that
//! goes wrong after a delivery is authenticated is captured as a per-event
//! outcome and acknowledged, so the gateway never retry-storms.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signature header was sent.
    #[error("Missing signature header")]
    MissingSignature,

    /// The signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedSignature(String),

    /// No v1 signature matched the expected HMAC.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the replay window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse an authenticated payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from an authenticated payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// True for every failure of the authenticity check.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::MalformedSignature(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Returns true if a later redelivery could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Maps the error to the HTTP status returned to the gateway.
    ///
    /// Only authenticity failures are rejected; anything past the
    /// signature gate is acknowledged.
    pub fn status_code(&self) -> StatusCode {
        if self.is_signature_failure() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Signature failures all read the same so a caller cannot learn
    /// which part of the check failed.
    pub fn public_message(&self) -> &'static str {
        if self.is_signature_failure() {
            "Invalid webhook signature"
        } else {
            "Webhook received"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_failures() -> Vec<WebhookError> {
        vec![
            WebhookError::MissingSignature,
            WebhookError::MalformedSignature("no t=".to_string()),
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
        ]
    }

    #[test]
    fn signature_failures_map_to_400() {
        for err in signature_failures() {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn signature_failures_share_one_public_message() {
        for err in signature_failures() {
            assert_eq!(err.public_message(), "Invalid webhook signature");
        }
    }

    #[test]
    fn post_verification_errors_are_acknowledged() {
        assert_eq!(
            WebhookError::ParseError("bad json".to_string()).status_code(),
            StatusCode::OK
        );
        assert_eq!(WebhookError::MissingField("id").status_code(), StatusCode::OK);
        assert_eq!(
            WebhookError::Database("down".to_string()).status_code(),
            StatusCode::OK
        );
    }

    #[test]
    fn only_database_errors_are_retryable() {
        assert!(WebhookError::Database("timeout".to_string()).is_retryable());
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::ParseError("x".to_string()).is_retryable());
    }

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Parse error: invalid JSON");
    }
}
