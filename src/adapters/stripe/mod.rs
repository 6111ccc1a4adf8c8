//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Stripe:
//! - Hosted checkout sessions for one-off orders
//! - Recurring billing agreements for subscriptions
//!
//! Webhook authentication is not here; see `domain::payment`.
//!
//! # Security
//!
//! - The API key is held as `secrecy::SecretString` and only exposed when
//!   building the basic-auth header

mod api_types;
mod mock_payment_gateway;
mod stripe_adapter;

pub use api_types::{StripeCheckoutSession, StripeErrorBody, StripeSubscription};
pub use mock_payment_gateway::{MethodCall, MockPaymentGateway};
pub use stripe_adapter::{StripeConfig, StripePaymentGateway};
