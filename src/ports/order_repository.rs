//! Order repository port.
//!
//! Defines the contract for persisting and retrieving Order aggregates.
//!
//! Reconciliation relies on `update_if_status`, a compare-and-set on the
//! stored status. Two deliveries racing to settle the same order both read
//! `pending`, but only one of them wins the conditional write, so side
//! effects such as stock decrements run exactly once.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::order::{Order, OrderStatus};

/// Repository port for Order aggregate persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save a new order.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the order number is already taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, order: &Order) -> Result<(), DomainError>;

    /// Overwrite an existing order unconditionally.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, order: &Order) -> Result<(), DomainError>;

    /// Overwrite an existing order only if its stored status still equals
    /// `expected`. Returns false when another writer got there first.
    async fn update_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, DomainError>;

    /// Find an order by its storage id.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Find the order a hosted checkout session was opened for.
    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError>;

    /// Find the order settled by a gateway payment intent.
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn OrderRepository) {}
}
