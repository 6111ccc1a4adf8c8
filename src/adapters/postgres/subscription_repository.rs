//! PostgreSQL implementation of SubscriptionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, ProductId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::order::ShippingAddress;
use crate::domain::subscription::{DeliveryFrequency, Subscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, product_id, frequency, quantity, status, gateway_subscription_id,
           next_delivery, shipping_address, created_at, updated_at
    FROM subscriptions
"#;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    frequency: String,
    quantity: i32,
    status: String,
    gateway_subscription_id: String,
    next_delivery: DateTime<Utc>,
    shipping_address: Json<ShippingAddress>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let frequency = row.frequency.parse::<DeliveryFrequency>().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid frequency value: {}", e))
        })?;
        let status = row.status.parse::<SubscriptionStatus>().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", e))
        })?;
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid quantity value: {}", row.quantity),
            )
        })?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            product_id: ProductId::from_uuid(row.product_id),
            frequency,
            quantity,
            status,
            gateway_subscription_id: row.gateway_subscription_id,
            next_delivery: Timestamp::from_datetime(row.next_delivery),
            shipping_address: row.shipping_address.0,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn quantity_param(quantity: u32) -> Result<i32, DomainError> {
    i32::try_from(quantity).map_err(|_| DomainError::validation("quantity", "Quantity too large"))
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, product_id, frequency, quantity, status, gateway_subscription_id,
                next_delivery, shipping_address, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.product_id.as_uuid())
        .bind(subscription.frequency.as_str())
        .bind(quantity_param(subscription.quantity)?)
        .bind(subscription.status.as_str())
        .bind(&subscription.gateway_subscription_id)
        .bind(subscription.next_delivery.as_datetime())
        .bind(Json(&subscription.shipping_address))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_gateway_subscription_id_key") {
                    return DomainError::validation(
                        "gateway_subscription_id",
                        "Recurring billing reference already in use",
                    );
                }
            }
            DomainError::database("Failed to save subscription", e)
        })?;

        Ok(())
    }

    async fn update_if_status(
        &self,
        subscription: &Subscription,
        expected: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = $3,
                quantity = $4,
                next_delivery = $5,
                shipping_address = $6,
                updated_at = $7
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(expected.as_str())
        .bind(subscription.status.as_str())
        .bind(quantity_param(subscription.quantity)?)
        .bind(subscription.next_delivery.as_datetime())
        .bind(Json(&subscription.shipping_address))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update subscription", e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM subscriptions WHERE id = $1")
            .bind(subscription.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch subscription", e))?;

        match exists {
            Some(_) => Ok(false),
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            )),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let sql = format!("{} WHERE gateway_subscription_id = $1", SELECT_COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(gateway_subscription_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}
