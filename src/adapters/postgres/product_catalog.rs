//! PostgreSQL implementation of ProductCatalog.
//!
//! Stock decrements are a single conditional UPDATE, so concurrent
//! payments can never drive stock below zero.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{Product, StockAdjustment};
use crate::domain::foundation::{DomainError, ErrorCode, Money, ProductId, Timestamp};
use crate::ports::ProductCatalog;

pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price_cents: i64,
    stock: i32,
    is_active: bool,
    gateway_price_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Money::from_cents(row.price_cents).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid price value: {}", e))
        })?;
        let stock = u32::try_from(row.stock).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stock value: {}", row.stock),
            )
        })?;

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            price,
            stock,
            is_active: row.is_active,
            gateway_price_id: row.gateway_price_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn to_i32(field: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| DomainError::validation(field, format!("{} too large", field)))
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, stock, is_active, gateway_price_id,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch product", e))?;

        row.map(Product::try_from).transpose()
    }

    async fn save(&self, product: &Product) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, stock, is_active, gateway_price_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                stock = EXCLUDED.stock,
                is_active = EXCLUDED.is_active,
                gateway_price_id = EXCLUDED.gateway_price_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(to_i32("stock", product.stock)?)
        .bind(product.is_active)
        .bind(&product.gateway_price_id)
        .bind(product.created_at.as_datetime())
        .bind(product.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to save product", e))?;

        Ok(())
    }

    async fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<StockAdjustment, DomainError> {
        let quantity = to_i32("quantity", quantity)?;

        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE products
            SET stock = stock - $1, updated_at = now()
            WHERE id = $2 AND stock >= $1
            RETURNING stock
            "#,
        )
        .bind(quantity)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to decrement stock", e))?;

        if let Some((remaining,)) = remaining {
            return Ok(StockAdjustment::Applied {
                remaining: u32::try_from(remaining).unwrap_or(0),
            });
        }

        // Refused: report what is actually there
        let available: Option<(i32,)> = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch product stock", e))?;

        Ok(match available {
            Some((stock,)) => StockAdjustment::Insufficient {
                available: u32::try_from(stock).unwrap_or(0),
            },
            None => StockAdjustment::ProductMissing,
        })
    }
}
