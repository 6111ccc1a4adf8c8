//! Catalog store port.
//!
//! Products are owned by the catalog; the order core reads them at intake
//! and decrements stock when a payment settles.

use async_trait::async_trait;

use crate::domain::catalog::{Product, StockAdjustment};
use crate::domain::foundation::{DomainError, ProductId};

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// Insert or replace a product.
    async fn save(&self, product: &Product) -> Result<(), DomainError>;

    /// Atomically subtract `quantity` from stock if the result stays
    /// non-negative. The store performs the check and the write as one
    /// operation; a refusal is reported, not raised.
    async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<StockAdjustment, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn ProductCatalog) {}
}
