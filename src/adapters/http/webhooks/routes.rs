//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use crate::adapters::http::state::AppState;

use super::handlers::handle_stripe_webhook;

/// Webhook routes, mounted at `/api/webhooks`.
///
/// No user authentication: deliveries are verified by signature.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}
