//! HTTP adapter for subscription endpoints.
//!
//! - `POST /api/subscriptions` - Start a subscription
//! - `PATCH /api/subscriptions/:id/cancel` - Cancel a subscription

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::subscription_routes;
