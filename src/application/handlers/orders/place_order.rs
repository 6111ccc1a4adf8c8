//! PlaceOrderHandler - Command handler for order intake.
//!
//! Turns a cart into a pending order with snapshotted prices, opens a
//! hosted checkout session for it, and returns where to send the customer.
//! Stock is only checked here; it is decremented when payment succeeds.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, ProductId, UserId};
use crate::domain::order::{LineItem, Order, OrderNumber, ShippingAddress};
use crate::ports::{
    send_best_effort, CheckoutLineItem, CreateCheckoutRequest, NotificationSender,
    OrderRepository, PaymentGateway, ProductCatalog,
};

use super::emails;

/// Attempts at finding an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Command to place an order.
#[derive(Debug, Clone)]
pub struct PlaceOrderCommand {
    /// Signed-in customer, if any. Guests may order.
    pub user_id: Option<UserId>,
    pub items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
}

/// Result of successful intake.
#[derive(Debug, Clone)]
pub struct PlaceOrderResult {
    pub order: Order,
    pub checkout_url: String,
}

/// Gateway checkout parameters that come from configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// ISO currency code, lowercase.
    pub currency: String,
    /// May contain `{CHECKOUT_SESSION_ID}`, which the gateway fills in.
    pub success_url: String,
    pub cancel_url: String,
}

/// Handler for order intake.
pub struct PlaceOrderHandler {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationSender>,
    settings: CheckoutSettings,
}

impl PlaceOrderHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationSender>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            orders,
            catalog,
            gateway,
            notifier,
            settings,
        }
    }

    pub async fn handle(&self, cmd: PlaceOrderCommand) -> Result<PlaceOrderResult, DomainError> {
        // 1. Validate cart shape and address before touching the catalog
        validate_cart(&cmd)?;

        // 2-3. Resolve products, check availability, snapshot prices
        let items = self.snapshot_items(&cmd.items).await?;

        // 4-5. Build and persist the pending order
        let mut order = self
            .persist_new_order(cmd.user_id, items, cmd.shipping_address, cmd.notes)
            .await?;

        // 6. Open the hosted checkout session
        let session = match self
            .gateway
            .create_checkout_session(self.checkout_request(&order))
            .await
        {
            Ok(session) => session,
            Err(err) => {
                tracing::error!(
                    order_number = %order.order_number,
                    error = %err,
                    "Checkout session creation failed; pending order left without session"
                );
                return Err(err.into());
            }
        };

        // 7. Attach the session so payment events can find the order
        order.attach_checkout_session(session.id.clone())?;
        self.orders.update(&order).await?;

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total_amount,
            session_id = %session.id,
            "Order placed"
        );

        // 8. Best-effort "order received" email
        send_best_effort(self.notifier.as_ref(), &emails::order_received(&order)).await;

        // 9. Hand back the redirect target
        Ok(PlaceOrderResult {
            order,
            checkout_url: session.url,
        })
    }

    async fn snapshot_items(&self, lines: &[CartLine]) -> Result<Vec<LineItem>, DomainError> {
        // Repeated lines for one product draw on the same stock
        let mut requested: HashMap<ProductId, u32> = HashMap::new();
        for line in lines {
            let total = requested.entry(line.product_id).or_insert(0);
            *total = total.saturating_add(line.quantity);
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .catalog
                .find_by_id(&line.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::ProductUnavailable,
                        format!("Product {} not found or inactive", line.product_id),
                    )
                    .with_detail("product_id", line.product_id.to_string())
                })?;

            let wanted = requested.get(&line.product_id).copied().unwrap_or(line.quantity);
            if !product.can_fulfil(wanted) {
                return Err(DomainError::new(
                    ErrorCode::InsufficientStock,
                    format!("Insufficient stock for {}", product.name),
                )
                .with_detail("product_id", product.id.to_string())
                .with_detail("available", product.stock.to_string()));
            }

            items.push(LineItem::new(
                product.id,
                product.name,
                line.quantity,
                product.price,
            )?);
        }
        Ok(items)
    }

    async fn persist_new_order(
        &self,
        user_id: Option<UserId>,
        items: Vec<LineItem>,
        shipping_address: ShippingAddress,
        notes: Option<String>,
    ) -> Result<Order, DomainError> {
        let notes = notes.filter(|n| !n.trim().is_empty());
        let mut attempt = 0;
        loop {
            attempt += 1;
            let order = Order::place(
                OrderId::new(),
                OrderNumber::generate(),
                user_id,
                items.clone(),
                shipping_address.clone(),
                notes.clone(),
            )?;

            match self.orders.save(&order).await {
                Ok(()) => return Ok(order),
                Err(err) if is_order_number_clash(&err) && attempt < ORDER_NUMBER_ATTEMPTS => {
                    tracing::warn!(order_number = %order.order_number, "Order number collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn checkout_request(&self, order: &Order) -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            line_items: order
                .items
                .iter()
                .map(|item| CheckoutLineItem {
                    name: item.name.clone(),
                    unit_amount: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
            currency: self.settings.currency.clone(),
            customer_email: order.shipping_address.email.clone(),
            metadata: HashMap::from([
                ("order_id".to_string(), order.id.to_string()),
                ("order_number".to_string(), order.order_number.to_string()),
            ]),
            success_url: self.settings.success_url.clone(),
            cancel_url: self.settings.cancel_url.clone(),
        }
    }
}

fn validate_cart(cmd: &PlaceOrderCommand) -> Result<(), DomainError> {
    if cmd.items.is_empty() {
        return Err(DomainError::validation("items", "Order must contain at least one item"));
    }
    if let Some(line) = cmd.items.iter().find(|l| l.quantity == 0) {
        return Err(DomainError::validation(
            "quantity",
            format!("Quantity for product {} must be at least 1", line.product_id),
        ));
    }
    cmd.shipping_address.validate()?;
    Ok(())
}

fn is_order_number_clash(err: &DomainError) -> bool {
    err.code == ErrorCode::ValidationFailed
        && err.details.get("field").map(String::as_str) == Some("order_number")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_fixtures::{product, Fixture};
    use crate::domain::order::{test_address, OrderStatus};
    use crate::ports::PaymentError;
    use proptest::prelude::*;

    fn cart(lines: &[(ProductId, u32)]) -> PlaceOrderCommand {
        PlaceOrderCommand {
            user_id: None,
            items: lines
                .iter()
                .map(|(product_id, quantity)| CartLine {
                    product_id: *product_id,
                    quantity: *quantity,
                })
                .collect(),
            shipping_address: test_address(),
            notes: None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Path
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn places_pending_order_with_snapshot_total() {
        let a = product("Colombia Huila", 1699, 5);
        let b = product("Ethiopia Guji", 1899, 5);
        let fx = Fixture::new([a.clone(), b.clone()]);

        let result = fx
            .place_order_handler()
            .handle(cart(&[(a.id, 1), (b.id, 2)]))
            .await
            .unwrap();

        assert_eq!(result.order.total_amount.cents(), 5497);
        assert_eq!(result.order.status, OrderStatus::Pending);
        assert!(result.checkout_url.starts_with("https://checkout.stripe.com/"));

        let stored = fx.orders.find_by_id(&result.order.id).await.unwrap().unwrap();
        assert_eq!(stored.checkout_session_id, result.order.checkout_session_id);
        assert!(stored.checkout_session_id.is_some());
    }

    #[tokio::test]
    async fn sends_gateway_line_items_and_metadata() {
        let a = product("Colombia Huila", 1699, 5);
        let b = product("Ethiopia Guji", 1899, 5);
        let fx = Fixture::new([a.clone(), b.clone()]);

        let result = fx
            .place_order_handler()
            .handle(cart(&[(a.id, 1), (b.id, 2)]))
            .await
            .unwrap();

        let requests = fx.gateway.checkout_requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        let lines: Vec<_> = req
            .line_items
            .iter()
            .map(|l| (l.name.as_str(), l.unit_amount.cents(), l.quantity))
            .collect();
        assert_eq!(
            lines,
            vec![("Colombia Huila", 1699, 1), ("Ethiopia Guji", 1899, 2)]
        );
        assert_eq!(
            req.metadata.get("order_number"),
            Some(&result.order.order_number.to_string())
        );
        assert_eq!(req.metadata.get("order_id"), Some(&result.order.id.to_string()));
        assert_eq!(req.customer_email, "ada@example.com");
    }

    #[tokio::test]
    async fn does_not_touch_stock() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);

        fx.place_order_handler().handle(cart(&[(a.id, 3)])).await.unwrap();

        assert_eq!(fx.catalog.stock_of(&a.id).await, Some(5));
    }

    #[tokio::test]
    async fn sends_order_received_email() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);

        let result = fx.place_order_handler().handle(cart(&[(a.id, 1)])).await.unwrap();

        let sent = fx.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].subject,
            format!("Order Received - {}", result.order.order_number)
        );
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_intake() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        fx.notifier.fail_sends(true);

        assert!(fx.place_order_handler().handle(cart(&[(a.id, 1)])).await.is_ok());
    }

    #[tokio::test]
    async fn later_price_change_does_not_alter_order() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);

        let result = fx.place_order_handler().handle(cart(&[(a.id, 2)])).await.unwrap();
        fx.catalog
            .set_price(&a.id, crate::domain::foundation::Money::from_cents(2500).unwrap())
            .await;

        let stored = fx.orders.find_by_id(&result.order.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].unit_price.cents(), 1699);
        assert_eq!(stored.total_amount.cents(), 3398);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn rejects_empty_cart() {
        let fx = Fixture::new([]);
        let err = fx.place_order_handler().handle(cart(&[])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(fx.orders.is_empty().await);
    }

    #[tokio::test]
    async fn rejects_zero_quantity() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        let err = fx.place_order_handler().handle(cart(&[(a.id, 0)])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn rejects_invalid_address() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        let mut cmd = cart(&[(a.id, 1)]);
        cmd.shipping_address.city = "  ".to_string();

        let err = fx.place_order_handler().handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(!fx.gateway.was_called("create_checkout_session"));
    }

    #[tokio::test]
    async fn rejects_unknown_product() {
        let fx = Fixture::new([]);
        let missing = ProductId::new();
        let err = fx
            .place_order_handler()
            .handle(cart(&[(missing, 1)]))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ProductUnavailable);
        assert_eq!(
            err.message,
            format!("Product {} not found or inactive", missing)
        );
        assert!(fx.orders.is_empty().await);
    }

    #[tokio::test]
    async fn rejects_inactive_product() {
        let a = product("Colombia Huila", 1699, 5).deactivated();
        let fx = Fixture::new([a.clone()]);
        let err = fx.place_order_handler().handle(cart(&[(a.id, 1)])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductUnavailable);
    }

    #[tokio::test]
    async fn rejects_quantity_above_stock() {
        let a = product("Colombia Huila", 1699, 2);
        let fx = Fixture::new([a.clone()]);
        let err = fx.place_order_handler().handle(cart(&[(a.id, 3)])).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "Insufficient stock for Colombia Huila");
        assert!(fx.orders.is_empty().await);
    }

    #[tokio::test]
    async fn repeated_lines_share_stock() {
        let a = product("Colombia Huila", 1699, 3);
        let fx = Fixture::new([a.clone()]);
        let err = fx
            .place_order_handler()
            .handle(cart(&[(a.id, 2), (a.id, 2)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn gateway_failure_keeps_pending_order_without_session() {
        let a = product("Colombia Huila", 1699, 5);
        let fx = Fixture::new([a.clone()]);
        fx.gateway
            .set_method_error("create_checkout_session", PaymentError::network("timeout"));

        let err = fx.place_order_handler().handle(cart(&[(a.id, 1)])).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::GatewayUnavailable);
        assert_eq!(fx.orders.len().await, 1);
        assert!(fx.notifier.sent().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn total_is_sum_of_snapshot_lines(
            lines in proptest::collection::vec((1i64..100_000, 1u32..20), 1..6)
        ) {
            let products: Vec<_> = lines
                .iter()
                .map(|(price, _)| product("Blend", *price, 1_000))
                .collect();
            let fx = Fixture::new(products.clone());
            let cmd = cart(
                &products
                    .iter()
                    .zip(&lines)
                    .map(|(p, (_, qty))| (p.id, *qty))
                    .collect::<Vec<_>>(),
            );

            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = rt.block_on(fx.place_order_handler().handle(cmd)).unwrap();

            let expected: i64 = lines.iter().map(|(price, qty)| price * i64::from(*qty)).sum();
            prop_assert_eq!(result.order.total_amount.cents(), expected);
        }
    }
}
