//! In-memory app wiring for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use secrecy::SecretString;

use crate::adapters::email::RecordingNotificationSender;
use crate::adapters::memory::{
    InMemoryOrderRepository, InMemoryProductCatalog, InMemorySubscriptionRepository,
    InMemoryWebhookEventRepository,
};
use crate::adapters::stripe::MockPaymentGateway;
use crate::application::handlers::CheckoutSettings;
use crate::domain::catalog::Product;
use crate::domain::foundation::{Money, OrderId, ProductId, UserId};
use crate::domain::order::{test_address, LineItem, Order, OrderNumber};
use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{OrderRepository, ProductCatalog};

use super::{api_router, AppState, Ports, WebhookSettings};

pub const WEBHOOK_SECRET: &str = "whsec_router_test";

pub struct TestApp {
    pub orders: Arc<InMemoryOrderRepository>,
    pub subscriptions: Arc<InMemorySubscriptionRepository>,
    pub catalog: Arc<InMemoryProductCatalog>,
    pub events: Arc<InMemoryWebhookEventRepository>,
    pub gateway: Arc<MockPaymentGateway>,
    pub notifier: Arc<RecordingNotificationSender>,
    state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let events = Arc::new(InMemoryWebhookEventRepository::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let notifier = Arc::new(RecordingNotificationSender::new());

        let state = AppState::new(
            Ports {
                orders: orders.clone(),
                subscriptions: subscriptions.clone(),
                catalog: catalog.clone(),
                events: events.clone(),
                gateway: gateway.clone(),
                notifier: notifier.clone(),
            },
            CheckoutSettings {
                currency: "usd".to_string(),
                success_url: "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}"
                    .to_string(),
                cancel_url: "https://shop.test/cart".to_string(),
            },
            WebhookSettings {
                verifier: StripeWebhookVerifier::new(SecretString::new(WEBHOOK_SECRET.to_string())),
                require_livemode: false,
            },
        );

        Self {
            orders,
            subscriptions,
            catalog,
            events,
            gateway,
            notifier,
            state,
        }
    }

    pub fn router(&self) -> Router {
        api_router().with_state(self.state.clone())
    }

    pub async fn add_product(&self, name: &str, price_cents: i64, stock: u32) -> Product {
        let product = Product::new(
            ProductId::new(),
            name,
            Money::from_cents(price_cents).unwrap(),
            stock,
        )
        .unwrap();
        self.catalog.save(&product).await.unwrap();
        product
    }

    pub async fn add_billable_product(&self, name: &str, price_id: &str) -> Product {
        let product = Product::new(ProductId::new(), name, Money::from_cents(1500).unwrap(), 10)
            .unwrap()
            .with_gateway_price(price_id);
        self.catalog.save(&product).await.unwrap();
        product
    }

    pub async fn seed_pending_order(&self) -> Order {
        self.seed_order_for(None).await
    }

    pub async fn seed_order_for(&self, owner: Option<UserId>) -> Order {
        let product = self.add_product("House Blend", 1200, 10).await;
        let order = Order::place(
            OrderId::new(),
            OrderNumber::generate(),
            owner,
            vec![LineItem::new(product.id, product.name, 1, product.price).unwrap()],
            test_address(),
            None,
        )
        .unwrap();
        self.orders.save(&order).await.unwrap();
        order
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
