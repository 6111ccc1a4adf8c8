//! HTTP handler for gateway webhooks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::state::AppState;
use crate::application::handlers::{EventOutcome, ProcessWebhookCommand};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Acknowledgement body for every verified delivery.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub outcome: EventOutcome,
}

/// POST /api/webhooks/stripe - Receive a gateway event
///
/// Needs the raw body: the signature covers the exact bytes sent.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.process_webhook.handle(cmd).await {
        Ok(result) => Json(WebhookAck {
            received: true,
            event_id: result.event_id,
            outcome: result.outcome,
        })
        .into_response(),
        Err(err) => (err.status_code(), Json(ErrorResponse::new(err.public_message()))).into_response(),
    }
}
