//! Payment module - gateway webhook authentication and event decoding.
//!
//! # Flow
//!
//! 1. `StripeWebhookVerifier` authenticates the raw body against the
//!    `Stripe-Signature` header.
//! 2. The body is parsed into a `StripeEvent` envelope.
//! 3. `GatewayEvent::from_stripe` decodes the envelope into the closed set
//!    of events the reconciler acts on.

mod gateway_event;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use gateway_event::{
    CheckoutSessionPayload, GatewayEvent, InvoicePayload, PaymentIntentPayload,
    SubscriptionPayload,
};
pub use stripe_event::{StripeEvent, StripeEventData};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{parse_event, signature_header, SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub(crate) use stripe_event::StripeEventBuilder;
