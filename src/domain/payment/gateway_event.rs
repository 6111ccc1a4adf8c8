//! Closed set of gateway events the reconciler understands.
//!
//! Each variant carries a strongly-typed payload decoded from the event's
//! `data.object`. Types the storefront does not act on map to `Unknown`
//! so new gateway event kinds are acknowledged, never rejected.

use serde::Deserialize;
use std::collections::HashMap;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Checkout session as delivered in `checkout.session.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSessionPayload {
    pub id: String,
    /// `paid`, `unpaid`, or `no_payment_required`.
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionPayload {
    /// True when funds are confirmed at completion time. Delayed payment
    /// methods complete `unpaid` and settle with a later async event.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.payment_status.as_deref(),
            Some("paid") | Some("no_payment_required")
        )
    }
}

/// Payment intent as delivered in `payment_intent.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntentPayload {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Invoice as delivered in `invoice.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoicePayload {
    pub id: String,
    /// Recurring-billing reference; absent for one-off invoices.
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Subscription as delivered in `customer.subscription.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionPayload {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A verified gateway event, decoded into the variant it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    CheckoutCompleted(CheckoutSessionPayload),
    CheckoutAsyncPaymentSucceeded(CheckoutSessionPayload),
    CheckoutAsyncPaymentFailed(CheckoutSessionPayload),
    CheckoutExpired(CheckoutSessionPayload),
    PaymentIntentSucceeded(PaymentIntentPayload),
    PaymentIntentFailed(PaymentIntentPayload),
    InvoicePaymentSucceeded(InvoicePayload),
    SubscriptionDeleted(SubscriptionPayload),
    /// Any event type the storefront does not act on.
    Unknown(String),
}

impl GatewayEvent {
    /// Decodes a verified envelope.
    ///
    /// Fails only when a known event type carries a payload that does not
    /// match its expected shape.
    pub fn from_stripe(event: &StripeEvent) -> Result<Self, WebhookError> {
        let decoded = match event.event_type.as_str() {
            "checkout.session.completed" => GatewayEvent::CheckoutCompleted(decode(event)?),
            "checkout.session.async_payment_succeeded" => {
                GatewayEvent::CheckoutAsyncPaymentSucceeded(decode(event)?)
            }
            "checkout.session.async_payment_failed" => {
                GatewayEvent::CheckoutAsyncPaymentFailed(decode(event)?)
            }
            "checkout.session.expired" => GatewayEvent::CheckoutExpired(decode(event)?),
            "payment_intent.succeeded" => GatewayEvent::PaymentIntentSucceeded(decode(event)?),
            "payment_intent.payment_failed" => GatewayEvent::PaymentIntentFailed(decode(event)?),
            "invoice.payment_succeeded" | "invoice.paid" => {
                GatewayEvent::InvoicePaymentSucceeded(decode(event)?)
            }
            "customer.subscription.deleted" => GatewayEvent::SubscriptionDeleted(decode(event)?),
            other => GatewayEvent::Unknown(other.to_string()),
        };
        Ok(decoded)
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &str {
        match self {
            GatewayEvent::CheckoutCompleted(_) => "checkout_completed",
            GatewayEvent::CheckoutAsyncPaymentSucceeded(_) => "checkout_async_payment_succeeded",
            GatewayEvent::CheckoutAsyncPaymentFailed(_) => "checkout_async_payment_failed",
            GatewayEvent::CheckoutExpired(_) => "checkout_expired",
            GatewayEvent::PaymentIntentSucceeded(_) => "payment_intent_succeeded",
            GatewayEvent::PaymentIntentFailed(_) => "payment_intent_failed",
            GatewayEvent::InvoicePaymentSucceeded(_) => "invoice_payment_succeeded",
            GatewayEvent::SubscriptionDeleted(_) => "subscription_deleted",
            GatewayEvent::Unknown(event_type) => event_type,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, WebhookError> {
    event.deserialize_object().map_err(|e| {
        WebhookError::ParseError(format!("{} payload: {}", event.event_type, e))
    })
}
