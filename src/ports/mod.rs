//! Ports - interfaces between the application core and infrastructure.
//!
//! Adapters implement these traits; handlers depend on them as
//! `Arc<dyn Port>`.

mod notification_sender;
mod order_repository;
mod payment_gateway;
mod product_catalog;
mod subscription_repository;
mod webhook_event_repository;

pub use notification_sender::{send_best_effort, EmailMessage, NotificationSender};
pub use order_repository::OrderRepository;
pub use payment_gateway::{
    CheckoutLineItem, CheckoutSession, CreateCheckoutRequest, CreateSubscriptionRequest,
    GatewaySubscription, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use product_catalog::ProductCatalog;
pub use subscription_repository::SubscriptionRepository;
pub use webhook_event_repository::{
    RecordedOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository,
};
