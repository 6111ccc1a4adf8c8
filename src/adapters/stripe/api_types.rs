//! Stripe REST response shapes.
//!
//! Only the fields the gateway adapter reads are captured; Stripe adds
//! fields freely so unknown keys are ignored.

use serde::Deserialize;

/// Response body of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session identifier (cs_xxx format).
    pub id: String,

    /// Hosted payment page. Absent only for embedded sessions.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub payment_status: Option<String>,
}

/// Response body of subscription create/update/delete calls.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    /// Subscription identifier (sub_xxx format).
    pub id: String,

    /// incomplete, active, past_due, canceled, ...
    pub status: String,

    #[serde(default)]
    pub cancel_at_period_end: bool,

    /// Present when `latest_invoice.payment_intent` was expanded.
    #[serde(default)]
    pub latest_invoice: Option<StripeInvoiceRef>,
}

impl StripeSubscription {
    /// Client secret of the first invoice's payment intent, if expanded.
    pub fn client_secret(&self) -> Option<String> {
        match &self.latest_invoice {
            Some(StripeInvoiceRef::Expanded(invoice)) => invoice
                .payment_intent
                .as_ref()
                .and_then(|pi| pi.client_secret.clone()),
            _ => None,
        }
    }
}

/// An invoice reference that is either a bare id or an expanded object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StripeInvoiceRef {
    Expanded(StripeInvoice),
    Id(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoice {
    pub id: String,

    #[serde(default)]
    pub payment_intent: Option<StripePaymentIntent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,

    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Error body Stripe returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscription_exposes_expanded_client_secret() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "incomplete",
            "cancel_at_period_end": false,
            "latest_invoice": {
                "id": "in_1",
                "payment_intent": { "id": "pi_1", "client_secret": "pi_1_secret_x" }
            }
        }))
        .unwrap();
        assert_eq!(sub.client_secret().as_deref(), Some("pi_1_secret_x"));
    }

    #[test]
    fn subscription_with_unexpanded_invoice_has_no_secret() {
        let sub: StripeSubscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "latest_invoice": "in_1"
        }))
        .unwrap();
        assert!(sub.client_secret().is_none());
        assert!(!sub.cancel_at_period_end);
    }

    #[test]
    fn error_body_parses() {
        let body: StripeErrorBody = serde_json::from_value(json!({
            "error": { "type": "card_error", "code": "card_declined", "message": "Declined" }
        }))
        .unwrap();
        assert_eq!(body.error.code.as_deref(), Some("card_declined"));
        assert_eq!(body.error.error_type.as_deref(), Some("card_error"));
    }
}
