//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod orders;
pub mod subscriptions;
pub mod webhooks;

#[cfg(test)]
mod test_fixtures;

pub use orders::{
    CartLine, CheckoutSettings, GetOrderHandler, GetOrderQuery, PlaceOrderCommand,
    PlaceOrderHandler, PlaceOrderResult, UpdateOrderStatusCommand, UpdateOrderStatusHandler,
};
pub use subscriptions::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use webhooks::{
    AppliedChange, EventOutcome, GatewayEventReconciler, ProcessWebhookCommand,
    ProcessWebhookHandler, ProcessWebhookResult, PurgeWebhookEventsHandler, ReconcileOutcome,
    SkipReason,
};
