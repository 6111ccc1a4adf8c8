//! Order handlers.
//!
//! ## Commands
//! - Placing an order and opening its checkout session
//! - Operator status updates
//!
//! ## Queries
//! - Get order by id

pub mod emails;
mod get_order;
mod place_order;
mod update_order_status;

pub use get_order::{GetOrderHandler, GetOrderQuery};
pub use place_order::{
    CartLine, CheckoutSettings, PlaceOrderCommand, PlaceOrderHandler, PlaceOrderResult,
};
pub use update_order_status::{UpdateOrderStatusCommand, UpdateOrderStatusHandler};
