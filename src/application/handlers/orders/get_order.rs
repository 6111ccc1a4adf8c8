//! GetOrderHandler - Query handler for order lookup.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, UserId};
use crate::domain::order::Order;
use crate::ports::OrderRepository;

#[derive(Debug, Clone)]
pub struct GetOrderQuery {
    pub order_id: OrderId,
    pub requester: UserId,
    /// Operators may read any order, guest orders included.
    pub is_operator: bool,
}

pub struct GetOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl GetOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(&self, query: GetOrderQuery) -> Result<Order, DomainError> {
        let order = self
            .orders
            .find_by_id(&query.order_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, "Order not found"))?;

        if !query.is_operator && order.user_id != Some(query.requester) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Not allowed to view this order",
            ));
        }

        Ok(order)
    }
}
