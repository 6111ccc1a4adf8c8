//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write through the ports; the one query handler reads.

pub mod handlers;

pub use handlers::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CheckoutSettings,
    CreateSubscriptionCommand, CreateSubscriptionHandler, GatewayEventReconciler,
    GetOrderHandler, PlaceOrderCommand, PlaceOrderHandler, ProcessWebhookHandler,
    PurgeWebhookEventsHandler, UpdateOrderStatusHandler,
};
