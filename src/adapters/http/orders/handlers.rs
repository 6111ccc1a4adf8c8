//! HTTP handlers for order endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::identity::{Identity, Role};
use crate::adapters::http::state::AppState;
use crate::application::handlers::{
    CartLine, GetOrderQuery, PlaceOrderCommand, UpdateOrderStatusCommand,
};
use crate::domain::foundation::{DomainError, ErrorCode, OrderId};

use super::dto::{
    OrderData, OrderView, PlaceOrderRequest, PlacedOrderData, SuccessResponse,
    UpdateOrderStatusRequest,
};

/// POST /api/orders - Place an order and open its checkout session
pub async fn place_order(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = PlaceOrderCommand {
        user_id: identity.user_id,
        items: request
            .items
            .into_iter()
            .map(|item| CartLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_address: request.shipping_address,
        notes: request.notes,
    };

    let result = state.place_order.handle(cmd).await?;

    let response = SuccessResponse::with_message(
        "Order created successfully",
        PlacedOrderData {
            order: OrderView::from(&result.order),
            checkout_url: result.checkout_url,
        },
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/orders/:id - Get an order (owner or operator)
pub async fn get_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = identity.require_user()?;

    let order = state
        .get_order
        .handle(GetOrderQuery {
            order_id: parse_order_id(&id)?,
            requester,
            is_operator: identity.role == Role::Admin,
        })
        .await?;

    Ok(Json(SuccessResponse::new(OrderData {
        order: OrderView::from(&order),
    })))
}

/// PATCH /api/orders/:id/status - Operator status update
pub async fn update_order_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    identity.require_admin()?;

    let order = state
        .update_order_status
        .handle(UpdateOrderStatusCommand {
            order_id: parse_order_id(&id)?,
            status: request.status,
            tracking_number: request.tracking_number,
        })
        .await?;

    Ok(Json(SuccessResponse::with_message(
        "Order status updated",
        OrderData {
            order: OrderView::from(&order),
        },
    )))
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(DomainError::new(ErrorCode::OrderNotFound, "Order not found")))
}
