//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{patch, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{cancel_subscription, create_subscription};

/// Subscription routes, mounted at `/api/subscriptions`. All require a customer.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_subscription))
        .route("/:id/cancel", patch(cancel_subscription))
}
