//! Gateway webhook handlers.
//!
//! - `ProcessWebhookHandler` authenticates a delivery, deduplicates it by
//!   event id, and records the outcome.
//! - `GatewayEventReconciler` applies a decoded event to the ledgers.
//! - `PurgeWebhookEventsHandler` enforces record retention.

mod process_webhook;
mod purge_webhook_events;
mod reconcile_gateway_event;

pub use process_webhook::{
    EventOutcome, ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult,
};
pub use purge_webhook_events::PurgeWebhookEventsHandler;
pub use reconcile_gateway_event::{
    AppliedChange, GatewayEventReconciler, ReconcileOutcome, SkipReason,
};
