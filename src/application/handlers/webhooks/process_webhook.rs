//! ProcessWebhookHandler - Command handler for gateway webhook deliveries.
//!
//! The signature gate is the only way to reject a delivery. Once a body
//! is authenticated every problem becomes a recorded outcome and the
//! delivery is acknowledged.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::payment::{parse_event, GatewayEvent, StripeEvent, StripeWebhookVerifier, WebhookError};
use crate::ports::{RecordedOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository};

use super::reconcile_gateway_event::{GatewayEventReconciler, ReconcileOutcome, SkipReason};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: Option<String>,
}

/// Per-event outcome reported back to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Applied,
    Skipped,
    /// A settled record already exists for this event id.
    Duplicate,
    Failed,
}

impl EventOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOutcome::Applied => "applied",
            EventOutcome::Skipped => "skipped",
            EventOutcome::Duplicate => "duplicate",
            EventOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessWebhookResult {
    pub event_id: Option<String>,
    pub outcome: EventOutcome,
    /// Skip reason or failure message.
    pub detail: Option<String>,
}

impl ProcessWebhookResult {
    fn failed(event_id: Option<String>, detail: impl Into<String>) -> Self {
        Self {
            event_id,
            outcome: EventOutcome::Failed,
            detail: Some(detail.into()),
        }
    }
}

/// Handler for verified gateway deliveries.
pub struct ProcessWebhookHandler {
    verifier: StripeWebhookVerifier,
    events: Arc<dyn WebhookEventRepository>,
    reconciler: Arc<GatewayEventReconciler>,
    require_livemode: bool,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        events: Arc<dyn WebhookEventRepository>,
        reconciler: Arc<GatewayEventReconciler>,
        require_livemode: bool,
    ) -> Self {
        Self {
            verifier,
            events,
            reconciler,
            require_livemode,
        }
    }

    /// Processes a delivery.
    ///
    /// # Errors
    ///
    /// Only signature failures are returned as errors. Every other problem
    /// is reported as `EventOutcome::Failed`.
    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookResult, WebhookError> {
        // 1. Signature gate
        let signature = cmd.signature.as_deref().ok_or(WebhookError::MissingSignature)?;
        if let Err(err) = self.verifier.verify(&cmd.payload, signature) {
            tracing::warn!(error = %err, "Webhook signature verification failed");
            return Err(err);
        }

        // 2. Envelope
        let event = match parse_event(&cmd.payload) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(error = %err, "Authenticated webhook body is not an event envelope");
                return Ok(ProcessWebhookResult::failed(None, err.to_string()));
            }
        };

        // 3. Dedup by event id; failed records are retried
        match self.events.find_by_event_id(&event.id).await {
            Ok(Some(record)) if record.is_settled() => {
                tracing::debug!(
                    event_id = %event.id,
                    previous_outcome = %record.outcome,
                    "Duplicate webhook delivery"
                );
                return Ok(ProcessWebhookResult {
                    event_id: Some(event.id),
                    outcome: EventOutcome::Duplicate,
                    detail: record.detail,
                });
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(event_id = %event.id, error = %err, "Webhook dedup lookup failed");
                return Ok(ProcessWebhookResult::failed(Some(event.id), err.message));
            }
        }

        // 4. Dispatch
        let (outcome, detail) = self.dispatch(&event).await;

        // 5. Record
        self.record(&event, outcome, detail.clone()).await;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            outcome = outcome.as_str(),
            detail = detail.as_deref().unwrap_or(""),
            "Webhook processed"
        );

        Ok(ProcessWebhookResult {
            event_id: Some(event.id),
            outcome,
            detail,
        })
    }

    async fn dispatch(&self, event: &StripeEvent) -> (EventOutcome, Option<String>) {
        if self.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Test-mode event received by live deployment");
            return skipped(SkipReason::LivemodeMismatch);
        }

        let gateway_event = match GatewayEvent::from_stripe(event) {
            Ok(gateway_event) => gateway_event,
            Err(err) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %err,
                    "Webhook payload did not match its event type"
                );
                return (EventOutcome::Failed, Some(err.to_string()));
            }
        };

        match self.reconciler.reconcile(&gateway_event).await {
            Ok(ReconcileOutcome::Applied(change)) => {
                (EventOutcome::Applied, Some(change.to_string()))
            }
            Ok(ReconcileOutcome::Skipped(reason)) => skipped(reason),
            Err(err) => {
                tracing::error!(
                    event_id = %event.id,
                    kind = gateway_event.kind(),
                    error = %err,
                    "Webhook reconciliation failed"
                );
                (EventOutcome::Failed, Some(err.message))
            }
        }
    }

    async fn record(&self, event: &StripeEvent, outcome: EventOutcome, detail: Option<String>) {
        let recorded = match outcome {
            EventOutcome::Applied => RecordedOutcome::Applied,
            EventOutcome::Skipped => RecordedOutcome::Skipped,
            EventOutcome::Failed => RecordedOutcome::Failed,
            EventOutcome::Duplicate => return,
        };
        let payload = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
        let record = WebhookEventRecord::new(&event.id, &event.event_type, recorded, detail, payload);

        match self.events.save(record).await {
            Ok(SaveResult::Inserted) => {}
            Ok(SaveResult::AlreadyExists) => {
                tracing::debug!(event_id = %event.id, "Concurrent delivery recorded first");
            }
            Err(err) => {
                tracing::error!(event_id = %event.id, error = %err, "Failed to record webhook event");
            }
        }
    }
}

fn skipped(reason: SkipReason) -> (EventOutcome, Option<String>) {
    (EventOutcome::Skipped, Some(reason.detail().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_fixtures::{product, Fixture};
    use crate::domain::order::test_support::pending_order;
    use crate::domain::order::{LineItem, OrderStatus};
    use crate::domain::payment::{signature_header, StripeEventBuilder};
    use crate::ports::OrderRepository;
    use secrecy::SecretString;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    fn handler(fx: &Fixture, require_livemode: bool) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            StripeWebhookVerifier::new(SecretString::new(SECRET.to_string())),
            fx.events.clone(),
            Arc::new(fx.reconciler()),
            require_livemode,
        )
    }

    fn signed(event: &StripeEvent) -> ProcessWebhookCommand {
        let payload = serde_json::to_vec(event).unwrap();
        let signature = signature_header(SECRET, chrono::Utc::now().timestamp(), &payload);
        ProcessWebhookCommand {
            payload,
            signature: Some(signature),
        }
    }

    fn checkout_paid(event_id: &str, session_id: &str) -> StripeEvent {
        StripeEventBuilder::new("checkout.session.completed")
            .id(event_id)
            .object(json!({
                "id": session_id,
                "object": "checkout.session",
                "payment_status": "paid",
                "payment_intent": "pi_123"
            }))
            .build()
    }

    async fn seed(fx: &Fixture, items: Vec<LineItem>, session_id: &str) -> crate::domain::order::Order {
        let mut order = pending_order(items);
        order.attach_checkout_session(session_id).unwrap();
        fx.orders.save(&order).await.unwrap();
        order
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature gate
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let fx = Fixture::new([]);
        let mut cmd = signed(&checkout_paid("evt_1", "cs_1"));
        cmd.signature = None;

        let err = handler(&fx, false).handle(cmd).await.unwrap_err();
        assert!(matches!(err, WebhookError::MissingSignature));
        assert!(fx.events.is_empty().await);
    }

    #[tokio::test]
    async fn tampered_body_is_rejected_without_side_effects() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        let order = seed(&fx, vec![LineItem::new(a.id, "Colombia Huila", 1, a.price).unwrap()], "cs_1").await;

        let mut cmd = signed(&checkout_paid("evt_1", "cs_1"));
        cmd.payload.push(b' ');

        let err = handler(&fx, false).handle(cmd).await.unwrap_err();
        assert!(err.is_signature_failure());
        assert!(fx.events.is_empty().await);
        let stored = fx.orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(fx.catalog.stock_of(&a.id).await, Some(5));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let fx = Fixture::new([]);
        let event = checkout_paid("evt_1", "cs_1");
        let payload = serde_json::to_vec(&event).unwrap();
        let cmd = ProcessWebhookCommand {
            signature: Some(signature_header(
                "whsec_other",
                chrono::Utc::now().timestamp(),
                &payload,
            )),
            payload,
        };

        let err = handler(&fx, false).handle(cmd).await.unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Outcomes
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn applied_event_is_recorded() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        seed(&fx, vec![LineItem::new(a.id, "Colombia Huila", 2, a.price).unwrap()], "cs_1").await;

        let result = handler(&fx, false)
            .handle(signed(&checkout_paid("evt_1", "cs_1")))
            .await
            .unwrap();

        assert_eq!(result.outcome, EventOutcome::Applied);
        assert_eq!(result.event_id.as_deref(), Some("evt_1"));
        let record = fx.events.find_by_event_id("evt_1").await.unwrap().unwrap();
        assert_eq!(record.outcome, RecordedOutcome::Applied);
        assert_eq!(record.event_type, "checkout.session.completed");
        assert_eq!(fx.catalog.stock_of(&a.id).await, Some(3));
    }

    #[tokio::test]
    async fn redelivery_is_duplicate_and_changes_nothing() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        seed(&fx, vec![LineItem::new(a.id, "Colombia Huila", 2, a.price).unwrap()], "cs_1").await;
        let handler = handler(&fx, false);
        let event = checkout_paid("evt_1", "cs_1");

        handler.handle(signed(&event)).await.unwrap();
        let second = handler.handle(signed(&event)).await.unwrap();

        assert_eq!(second.outcome, EventOutcome::Duplicate);
        assert_eq!(fx.catalog.stock_of(&a.id).await, Some(3));
        assert_eq!(fx.notifier.sent_with_subject("Order Confirmation").len(), 1);
    }

    #[tokio::test]
    async fn unmatched_event_is_skipped_and_recorded() {
        let fx = Fixture::new([]);
        let result = handler(&fx, false)
            .handle(signed(&checkout_paid("evt_1", "cs_nobody")))
            .await
            .unwrap();

        assert_eq!(result.outcome, EventOutcome::Skipped);
        let record = fx.events.find_by_event_id("evt_1").await.unwrap().unwrap();
        assert_eq!(record.outcome, RecordedOutcome::Skipped);
    }

    #[tokio::test]
    async fn unknown_type_is_acknowledged() {
        let fx = Fixture::new([]);
        let event = StripeEventBuilder::new("charge.refunded").id("evt_9").build();

        let result = handler(&fx, false).handle(signed(&event)).await.unwrap();
        assert_eq!(result.outcome, EventOutcome::Skipped);
    }

    #[tokio::test]
    async fn malformed_known_payload_fails_and_is_retried() {
        let fx = Fixture::new([]);
        let broken = StripeEventBuilder::new("checkout.session.completed")
            .id("evt_bad")
            .object(json!({ "payment_status": "paid" }))
            .build();

        let first = handler(&fx, false).handle(signed(&broken)).await.unwrap();
        assert_eq!(first.outcome, EventOutcome::Failed);
        let record = fx.events.find_by_event_id("evt_bad").await.unwrap().unwrap();
        assert_eq!(record.outcome, RecordedOutcome::Failed);

        // Failed records do not short-circuit a redelivery
        let second = handler(&fx, false).handle(signed(&broken)).await.unwrap();
        assert_eq!(second.outcome, EventOutcome::Failed);
    }

    #[tokio::test]
    async fn test_mode_event_skipped_when_live_required() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        let order = seed(&fx, vec![LineItem::new(a.id, "Colombia Huila", 1, a.price).unwrap()], "cs_1").await;

        let result = handler(&fx, true)
            .handle(signed(&checkout_paid("evt_1", "cs_1")))
            .await
            .unwrap();

        assert_eq!(result.outcome, EventOutcome::Skipped);
        let stored = fx.orders.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn live_event_accepted_when_live_required() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        seed(&fx, vec![LineItem::new(a.id, "Colombia Huila", 1, a.price).unwrap()], "cs_1").await;
        let event = StripeEventBuilder::new("checkout.session.completed")
            .id("evt_live")
            .livemode(true)
            .object(json!({ "id": "cs_1", "payment_status": "paid" }))
            .build();

        let result = handler(&fx, true).handle(signed(&event)).await.unwrap();
        assert_eq!(result.outcome, EventOutcome::Applied);
    }
}
