//! HTTP adapter for order endpoints.
//!
//! - `POST /api/orders` - Place an order
//! - `GET /api/orders/:id` - Get an order
//! - `PATCH /api/orders/:id/status` - Operator status update

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::order_routes;
