//! In-memory ProductCatalog.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::catalog::{Product, StockAdjustment};
use crate::domain::foundation::{DomainError, ProductId, Timestamp};
use crate::ports::ProductCatalog;

#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog pre-loaded with `products`.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: RwLock::new(map),
        }
    }

    /// Current stock for a product, if present.
    pub async fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.products.read().await.get(id).map(|p| p.stock)
    }

    /// Changes a product's price, as a catalog editor would.
    pub async fn set_price(&self, id: &ProductId, price: crate::domain::foundation::Money) {
        if let Some(product) = self.products.write().await.get_mut(id) {
            product.price = price;
            product.updated_at = Timestamp::now();
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn save(&self, product: &Product) -> Result<(), DomainError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<StockAdjustment, DomainError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id) else {
            return Ok(StockAdjustment::ProductMissing);
        };
        match product.stock.checked_sub(quantity) {
            Some(remaining) => {
                product.stock = remaining;
                product.updated_at = Timestamp::now();
                Ok(StockAdjustment::Applied { remaining })
            }
            None => Ok(StockAdjustment::Insufficient {
                available: product.stock,
            }),
        }
    }
}
