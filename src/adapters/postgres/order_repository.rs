//! PostgreSQL implementation of OrderRepository.
//!
//! Line items and the shipping address are stored as JSONB snapshots.
//! Status changes driven by payment events go through
//! `update_if_status`, a compare-and-set on the status column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Money, OrderId, Timestamp, UserId};
use crate::domain::order::{LineItem, Order, OrderNumber, OrderStatus, ShippingAddress};
use crate::ports::OrderRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, order_number, user_id, items, total_cents, status, shipping_address,
           checkout_session_id, payment_intent_id, tracking_number, notes,
           created_at, updated_at
    FROM orders
"#;

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> Result<Option<Order>, DomainError> {
        let sql = format!("{} WHERE {} = $1", SELECT_COLUMNS, filter);
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch order", e))?;

        row.map(Order::try_from).transpose()
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    user_id: Option<Uuid>,
    items: Json<Vec<LineItem>>,
    total_cents: i64,
    status: String,
    shipping_address: Json<ShippingAddress>,
    checkout_session_id: Option<String>,
    payment_intent_id: Option<String>,
    tracking_number: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid {} in orders row {}: {}", field, row.id, e),
            )
        };

        Ok(Order {
            id: OrderId::from_uuid(row.id),
            order_number: OrderNumber::parse(row.order_number.clone())
                .map_err(|e| corrupt("order_number", &e))?,
            user_id: row.user_id.map(UserId::from_uuid),
            items: row.items.0,
            total_amount: Money::from_cents(row.total_cents)
                .map_err(|e| corrupt("total_cents", &e))?,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", &e))?,
            shipping_address: row.shipping_address.0,
            checkout_session_id: row.checkout_session_id,
            payment_intent_id: row.payment_intent_id,
            tracking_number: row.tracking_number,
            notes: row.notes,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, user_id, items, total_cents, status, shipping_address,
                checkout_session_id, payment_intent_id, tracking_number, notes,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.order_number.as_str())
        .bind(order.user_id.map(|u| *u.as_uuid()))
        .bind(Json(&order.items))
        .bind(order.total_amount.cents())
        .bind(order.status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(&order.checkout_session_id)
        .bind(&order.payment_intent_id)
        .bind(&order.tracking_number)
        .bind(&order.notes)
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("orders_order_number_key") {
                    return DomainError::validation(
                        "order_number",
                        format!("Order number {} already exists", order.order_number),
                    );
                }
            }
            DomainError::database("Failed to save order", e)
        })?;

        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $2,
                checkout_session_id = $3,
                payment_intent_id = $4,
                tracking_number = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(&order.checkout_session_id)
        .bind(&order.payment_intent_id)
        .bind(&order.tracking_number)
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update order", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::OrderNotFound, "Order not found"));
        }

        Ok(())
    }

    async fn update_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $3,
                checkout_session_id = $4,
                payment_intent_id = $5,
                tracking_number = $6,
                updated_at = $7
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(expected.as_str())
        .bind(order.status.as_str())
        .bind(&order.checkout_session_id)
        .bind(&order.payment_intent_id)
        .bind(&order.tracking_number)
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update order status", e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish a lost race from a missing row
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1")
            .bind(order.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch order", e))?;

        match exists {
            Some(_) => Ok(false),
            None => Err(DomainError::new(ErrorCode::OrderNotFound, "Order not found")),
        }
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch order", e))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        self.find_one("checkout_session_id", session_id).await
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        self.find_one("payment_intent_id", payment_intent_id).await
    }
}
