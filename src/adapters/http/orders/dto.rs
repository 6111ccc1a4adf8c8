//! HTTP DTOs for order endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ProductId;
use crate::domain::order::{LineItem, Order, OrderStatus, ShippingAddress};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItemRequest>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `PATCH /api/orders/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct LineItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in cents.
    pub unit_price: i64,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.cents(),
        }
    }
}

/// Order as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub items: Vec<LineItemView>,
    /// Total in cents.
    pub total_amount: i64,
    /// Total formatted as `$X.YY`.
    pub total_display: String,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// ISO 8601.
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number.to_string(),
            status: order.status,
            items: order.items.iter().map(LineItemView::from).collect(),
            total_amount: order.total_amount.cents(),
            total_display: order.total_amount.to_string(),
            shipping_address: order.shipping_address.clone(),
            tracking_number: order.tracking_number.clone(),
            notes: order.notes.clone(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrderData {
    pub order: OrderView,
    pub checkout_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderData {
    pub order: OrderView,
}

/// Success envelope: `{ status: "success", message?, data }`.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data,
        }
    }

    pub fn with_message(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message),
            data,
        }
    }
}
