//! HTTP DTOs for subscription endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ProductId;
use crate::domain::order::ShippingAddress;
use crate::domain::subscription::{DeliveryFrequency, Subscription, SubscriptionStatus};

/// Body of `POST /api/subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub product_id: ProductId,
    pub frequency: DeliveryFrequency,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub shipping_address: ShippingAddress,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub id: String,
    pub product_id: String,
    pub frequency: DeliveryFrequency,
    pub quantity: u32,
    pub status: SubscriptionStatus,
    /// ISO 8601.
    pub next_delivery: String,
    pub created_at: String,
}

impl From<&Subscription> for SubscriptionView {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id.to_string(),
            product_id: sub.product_id.to_string(),
            frequency: sub.frequency,
            quantity: sub.quantity,
            status: sub.status,
            next_delivery: sub.next_delivery.to_string(),
            created_at: sub.created_at.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedSubscriptionData {
    pub subscription: SubscriptionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionData {
    pub subscription: SubscriptionView,
}
