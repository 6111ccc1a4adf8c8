//! Product as seen by the order core: price, stock, and availability.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, ProductId, Timestamp, ValidationError};

/// A sellable catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in minor currency units.
    pub price: Money,
    /// Units on hand. Never negative.
    pub stock: u32,
    pub is_active: bool,
    /// Gateway price reference for recurring billing, when the product
    /// can be subscribed to.
    pub gateway_price_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Creates an active product.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        stock: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let now = Timestamp::now();
        Ok(Self {
            id,
            name,
            price,
            stock,
            is_active: true,
            gateway_price_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_gateway_price(mut self, price_id: impl Into<String>) -> Self {
        self.gateway_price_id = Some(price_id.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Advisory check against the stock read at this moment.
    pub fn can_fulfil(&self, quantity: u32) -> bool {
        self.is_active && quantity <= self.stock
    }
}

/// Result of an atomic conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Stock was decremented; carries the remaining units.
    Applied { remaining: u32 },
    /// The decrement would have gone below zero and was refused.
    Insufficient { available: u32 },
    /// No product with that id exists.
    ProductMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: u32) -> Product {
        Product::new(ProductId::new(), "Colombia Huila", Money::from_cents(1699).unwrap(), stock)
            .unwrap()
    }

    #[test]
    fn new_product_is_active() {
        assert!(product(5).is_active);
    }

    #[test]
    fn blank_name_is_rejected() {
        let result = Product::new(ProductId::new(), "  ", Money::ZERO, 1);
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn can_fulfil_respects_stock() {
        let p = product(2);
        assert!(p.can_fulfil(2));
        assert!(!p.can_fulfil(3));
    }

    #[test]
    fn inactive_product_cannot_fulfil() {
        assert!(!product(10).deactivated().can_fulfil(1));
    }
}
