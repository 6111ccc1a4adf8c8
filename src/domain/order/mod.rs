//! Order module - the order ledger.
//!
//! Orders are created by intake in `pending`, settled by payment
//! reconciliation, and then advanced through fulfilment by operators.

mod aggregate;
mod order_number;
mod shipping_address;
mod status;

pub use aggregate::{LineItem, Order};
pub use order_number::OrderNumber;
pub use shipping_address::ShippingAddress;
pub use status::OrderStatus;

#[cfg(test)]
pub(crate) use aggregate::test_support;
#[cfg(test)]
pub(crate) use shipping_address::test_address;
