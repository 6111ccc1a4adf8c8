//! Shared application state.

use std::sync::Arc;

use crate::application::handlers::{
    CancelSubscriptionHandler, CheckoutSettings, CreateSubscriptionHandler,
    GatewayEventReconciler, GetOrderHandler, PlaceOrderHandler, ProcessWebhookHandler,
    UpdateOrderStatusHandler,
};
use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{
    NotificationSender, OrderRepository, PaymentGateway, ProductCatalog, SubscriptionRepository,
    WebhookEventRepository,
};

/// Adapter set the handlers are built from.
#[derive(Clone)]
pub struct Ports {
    pub orders: Arc<dyn OrderRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub events: Arc<dyn WebhookEventRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn NotificationSender>,
}

/// Webhook verification settings.
pub struct WebhookSettings {
    pub verifier: StripeWebhookVerifier,
    pub require_livemode: bool,
}

/// Shared application state containing all handlers.
///
/// Cloned for each request; handlers are Arc-wrapped and built once.
#[derive(Clone)]
pub struct AppState {
    pub place_order: Arc<PlaceOrderHandler>,
    pub get_order: Arc<GetOrderHandler>,
    pub update_order_status: Arc<UpdateOrderStatusHandler>,
    pub create_subscription: Arc<CreateSubscriptionHandler>,
    pub cancel_subscription: Arc<CancelSubscriptionHandler>,
    pub process_webhook: Arc<ProcessWebhookHandler>,
}

impl AppState {
    pub fn new(ports: Ports, checkout: CheckoutSettings, webhooks: WebhookSettings) -> Self {
        let reconciler = Arc::new(GatewayEventReconciler::new(
            ports.orders.clone(),
            ports.subscriptions.clone(),
            ports.catalog.clone(),
            ports.notifier.clone(),
        ));

        Self {
            place_order: Arc::new(PlaceOrderHandler::new(
                ports.orders.clone(),
                ports.catalog.clone(),
                ports.gateway.clone(),
                ports.notifier.clone(),
                checkout,
            )),
            get_order: Arc::new(GetOrderHandler::new(ports.orders.clone())),
            update_order_status: Arc::new(UpdateOrderStatusHandler::new(ports.orders.clone())),
            create_subscription: Arc::new(CreateSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.catalog.clone(),
                ports.gateway.clone(),
            )),
            cancel_subscription: Arc::new(CancelSubscriptionHandler::new(
                ports.subscriptions.clone(),
                ports.gateway.clone(),
            )),
            process_webhook: Arc::new(ProcessWebhookHandler::new(
                webhooks.verifier,
                ports.events,
                reconciler,
                webhooks.require_livemode,
            )),
        }
    }
}
