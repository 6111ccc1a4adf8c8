//! Shared wiring for handler tests: in-memory stores, the mock gateway,
//! and a recording email sender.

use std::sync::Arc;

use crate::adapters::email::RecordingNotificationSender;
use crate::adapters::memory::{
    InMemoryOrderRepository, InMemoryProductCatalog, InMemorySubscriptionRepository,
    InMemoryWebhookEventRepository,
};
use crate::adapters::stripe::MockPaymentGateway;
use crate::domain::catalog::Product;
use crate::domain::foundation::{Money, ProductId};

use super::orders::{CheckoutSettings, PlaceOrderHandler};
use super::webhooks::GatewayEventReconciler;

pub struct Fixture {
    pub orders: Arc<InMemoryOrderRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub catalog: Arc<InMemoryProductCatalog>,
    pub events: Arc<InMemoryWebhookEventRepository>,
    pub gateway: Arc<MockPaymentGateway>,
    pub notifier: Arc<RecordingNotificationSender>,
}

impl Fixture {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            orders: Arc::new(InMemoryOrderRepository::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            catalog: Arc::new(InMemoryProductCatalog::with_products(products)),
            events: Arc::new(InMemoryWebhookEventRepository::new()),
            gateway: Arc::new(MockPaymentGateway::new()),
            notifier: Arc::new(RecordingNotificationSender::new()),
        }
    }

    pub fn place_order_handler(&self) -> PlaceOrderHandler {
        PlaceOrderHandler::new(
            self.orders.clone(),
            self.catalog.clone(),
            self.gateway.clone(),
            self.notifier.clone(),
            checkout_settings(),
        )
    }

    pub fn reconciler(&self) -> GatewayEventReconciler {
        GatewayEventReconciler::new(
            self.orders.clone(),
            self.subscriptions.clone(),
            self.catalog.clone(),
            self.notifier.clone(),
        )
    }
}

pub fn checkout_settings() -> CheckoutSettings {
    CheckoutSettings {
        currency: "usd".to_string(),
        success_url: "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}".to_string(),
        cancel_url: "https://shop.test/cart".to_string(),
    }
}

pub fn product(name: &str, price_cents: i64, stock: u32) -> Product {
    Product::new(
        ProductId::new(),
        name,
        Money::from_cents(price_cents).unwrap(),
        stock,
    )
    .unwrap()
}
