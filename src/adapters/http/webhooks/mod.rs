//! HTTP adapter for gateway webhooks.
//!
//! - `POST /api/webhooks/stripe` - Signed gateway events

pub mod handlers;
pub mod routes;

pub use routes::webhook_routes;
