//! HTTP handlers for subscription endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::identity::Identity;
use crate::adapters::http::orders::dto::SuccessResponse;
use crate::adapters::http::state::AppState;
use crate::application::handlers::{CancelSubscriptionCommand, CreateSubscriptionCommand};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId};

use super::dto::{
    CreateSubscriptionRequest, CreatedSubscriptionData, SubscriptionData, SubscriptionView,
};

/// POST /api/subscriptions - Start a recurring delivery
pub async fn create_subscription(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.require_user()?;

    let result = state
        .create_subscription
        .handle(CreateSubscriptionCommand {
            user_id,
            gateway_customer_id: identity.gateway_customer_id,
            product_id: request.product_id,
            frequency: request.frequency,
            quantity: request.quantity,
            shipping_address: request.shipping_address,
        })
        .await?;

    let response = SuccessResponse::with_message(
        "Subscription created successfully",
        CreatedSubscriptionData {
            subscription: SubscriptionView::from(&result.subscription),
            client_secret: result.client_secret,
        },
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /api/subscriptions/:id/cancel - Cancel at period end
pub async fn cancel_subscription(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.require_user()?;
    let subscription_id: SubscriptionId = id.parse().map_err(|_| {
        ApiError(DomainError::new(
            ErrorCode::SubscriptionNotFound,
            "Subscription not found",
        ))
    })?;

    let result = state
        .cancel_subscription
        .handle(CancelSubscriptionCommand {
            subscription_id,
            user_id,
        })
        .await?;

    let message = if result.already_cancelled {
        "Subscription already cancelled"
    } else {
        "Subscription cancelled"
    };
    Ok(Json(SuccessResponse::with_message(
        message,
        SubscriptionData {
            subscription: SubscriptionView::from(&result.subscription),
        },
    )))
}
