//! HTTP adapters - REST API implementations.
//!
//! Each area has its own module with DTOs, handlers, and routes. All
//! of them share one `AppState`, one error envelope, and one identity
//! extractor.

pub mod error;
pub mod identity;
pub mod orders;
pub mod state;
pub mod subscriptions;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

use axum::http::StatusCode;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use identity::{Identity, Role};
pub use state::{AppState, Ports, WebhookSettings};

/// Create the complete API router.
///
/// # Routes
/// - `GET /health`
/// - `/api/orders/*` - see [`orders::order_routes`]
/// - `/api/subscriptions/*` - see [`subscriptions::subscription_routes`]
/// - `/api/webhooks/*` - see [`webhooks::webhook_routes`]
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/orders", orders::order_routes())
        .nest("/api/subscriptions", subscriptions::subscription_routes())
        .nest("/api/webhooks", webhooks::webhook_routes())
}

/// The router with state and the standard middleware stack applied.
pub fn app(state: AppState, request_timeout: Duration, cors: CorsLayer) -> Router {
    api_router()
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
