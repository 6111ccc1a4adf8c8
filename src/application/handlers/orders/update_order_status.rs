//! UpdateOrderStatusHandler - Operator command for fulfilment progress.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::OrderRepository;

#[derive(Debug, Clone)]
pub struct UpdateOrderStatusCommand {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

/// Handler for operator status changes.
///
/// The write is conditional on the status read, so a payment event landing
/// in between is never overwritten.
pub struct UpdateOrderStatusHandler {
    orders: Arc<dyn OrderRepository>,
}

impl UpdateOrderStatusHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(&self, cmd: UpdateOrderStatusCommand) -> Result<Order, DomainError> {
        // 1. Load
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::OrderNotFound, "Order not found"))?;

        // 2. Apply the transition in the domain
        let previous = order.status;
        order.apply_operator_update(cmd.status, cmd.tracking_number)?;

        // 3. Persist only if nobody moved the order meanwhile
        if !self.orders.update_if_status(&order, previous).await? {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Order {} changed while updating; reload and retry",
                    order.order_number
                ),
            ));
        }

        tracing::info!(
            order_number = %order.order_number,
            from = %previous,
            to = %order.status,
            tracking_number = ?order.tracking_number,
            "Order status updated by operator"
        );

        Ok(order)
    }
}
