//! GatewayEventReconciler - applies verified gateway events to the ledgers.
//!
//! Each event resolves to exactly one outcome: a change was applied, or
//! the event was skipped with a reason. Storage failures propagate as
//! errors so the caller can record the event as failed.
//!
//! Order status writes are compare-and-set against `pending`, so of two
//! racing payment events only one wins. Only the winner of a
//! `pending -> paid` write decrements stock and sends the confirmation.

use std::fmt;
use std::sync::Arc;

use crate::domain::catalog::StockAdjustment;
use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{
    CheckoutSessionPayload, GatewayEvent, InvoicePayload, PaymentIntentPayload,
    SubscriptionPayload,
};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::{
    send_best_effort, NotificationSender, OrderRepository, ProductCatalog,
    SubscriptionRepository,
};

use super::super::orders::emails;

/// A ledger change made by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedChange {
    OrderPaid { order_number: String },
    OrderCancelled { order_number: String },
    SubscriptionRenewed { gateway_subscription_id: String },
    SubscriptionCancelled { gateway_subscription_id: String },
}

impl fmt::Display for AppliedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedChange::OrderPaid { order_number } => write!(f, "order {} paid", order_number),
            AppliedChange::OrderCancelled { order_number } => {
                write!(f, "order {} cancelled", order_number)
            }
            AppliedChange::SubscriptionRenewed {
                gateway_subscription_id,
            } => write!(f, "subscription {} renewed", gateway_subscription_id),
            AppliedChange::SubscriptionCancelled {
                gateway_subscription_id,
            } => write!(f, "subscription {} cancelled", gateway_subscription_id),
        }
    }
}

/// Why an event made no change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No order or subscription matches the event's references.
    Unmatched,
    /// The order already left `pending`.
    AlreadySettled,
    /// Payment arrived for an order that was cancelled first.
    CancelledOrder,
    /// Checkout completed with a delayed payment method.
    AwaitingAsyncPayment,
    SubscriptionCancelled,
    /// Invoice is not tied to recurring billing.
    NoSubscriptionReference,
    /// A renewal that would not move the next delivery forward.
    ScheduleUnchanged,
    UnhandledType,
    /// Test-mode event reached a live deployment.
    LivemodeMismatch,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Unmatched => "unmatched",
            SkipReason::AlreadySettled => "already_settled",
            SkipReason::CancelledOrder => "cancelled_order",
            SkipReason::AwaitingAsyncPayment => "awaiting_async_payment",
            SkipReason::SubscriptionCancelled => "subscription_cancelled",
            SkipReason::NoSubscriptionReference => "no_subscription_reference",
            SkipReason::ScheduleUnchanged => "schedule_unchanged",
            SkipReason::UnhandledType => "unhandled_type",
            SkipReason::LivemodeMismatch => "livemode_mismatch",
        }
    }

    /// Human-readable explanation stored with the event record.
    pub fn detail(&self) -> &'static str {
        match self {
            SkipReason::Unmatched => "no matching order or subscription",
            SkipReason::AlreadySettled => "order already settled",
            SkipReason::CancelledOrder => "payment succeeded for cancelled order",
            SkipReason::AwaitingAsyncPayment => "checkout completed without settled payment",
            SkipReason::SubscriptionCancelled => "subscription already cancelled",
            SkipReason::NoSubscriptionReference => "invoice has no subscription reference",
            SkipReason::ScheduleUnchanged => "next delivery already later",
            SkipReason::UnhandledType => "event type not handled",
            SkipReason::LivemodeMismatch => "test-mode event on live deployment",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reconciling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied(AppliedChange),
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied(_))
    }
}

/// Where a payment event points.
enum OrderRef<'a> {
    CheckoutSession(&'a CheckoutSessionPayload),
    PaymentIntent(&'a PaymentIntentPayload),
}

/// Applies gateway events to orders, subscriptions, and stock.
pub struct GatewayEventReconciler {
    orders: Arc<dyn OrderRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<dyn ProductCatalog>,
    notifier: Arc<dyn NotificationSender>,
}

impl GatewayEventReconciler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<dyn ProductCatalog>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            orders,
            subscriptions,
            catalog,
            notifier,
        }
    }

    pub async fn reconcile(&self, event: &GatewayEvent) -> Result<ReconcileOutcome, DomainError> {
        match event {
            GatewayEvent::CheckoutCompleted(session) => {
                if !session.is_settled() {
                    tracing::info!(
                        session_id = %session.id,
                        payment_status = ?session.payment_status,
                        "Checkout completed; waiting for async payment"
                    );
                    return Ok(ReconcileOutcome::Skipped(SkipReason::AwaitingAsyncPayment));
                }
                self.payment_succeeded(OrderRef::CheckoutSession(session)).await
            }
            GatewayEvent::CheckoutAsyncPaymentSucceeded(session) => {
                self.payment_succeeded(OrderRef::CheckoutSession(session)).await
            }
            GatewayEvent::CheckoutAsyncPaymentFailed(session)
            | GatewayEvent::CheckoutExpired(session) => {
                self.payment_failed(OrderRef::CheckoutSession(session)).await
            }
            GatewayEvent::PaymentIntentSucceeded(intent) => {
                self.payment_succeeded(OrderRef::PaymentIntent(intent)).await
            }
            GatewayEvent::PaymentIntentFailed(intent) => {
                self.payment_failed(OrderRef::PaymentIntent(intent)).await
            }
            GatewayEvent::InvoicePaymentSucceeded(invoice) => self.renewal_paid(invoice).await,
            GatewayEvent::SubscriptionDeleted(sub) => self.subscription_deleted(sub).await,
            GatewayEvent::Unknown(event_type) => {
                tracing::debug!(event_type = %event_type, "Ignoring unhandled event type");
                Ok(ReconcileOutcome::Skipped(SkipReason::UnhandledType))
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Orders
    // ════════════════════════════════════════════════════════════════════════════

    async fn payment_succeeded(&self, reference: OrderRef<'_>) -> Result<ReconcileOutcome, DomainError> {
        let Some(mut order) = self.locate_order(&reference).await? else {
            return Ok(unmatched(&reference));
        };

        match order.status {
            OrderStatus::Pending => {}
            OrderStatus::Cancelled => {
                tracing::warn!(
                    order_number = %order.order_number,
                    reference = %reference.id(),
                    "payment succeeded for cancelled order"
                );
                return Ok(ReconcileOutcome::Skipped(SkipReason::CancelledOrder));
            }
            _ => {
                tracing::debug!(order_number = %order.order_number, "Order already settled");
                return Ok(ReconcileOutcome::Skipped(SkipReason::AlreadySettled));
            }
        }

        // 1. Compare-and-set pending -> paid
        order.mark_paid(reference.payment_intent_id())?;
        if !self.orders.update_if_status(&order, OrderStatus::Pending).await? {
            tracing::info!(
                order_number = %order.order_number,
                "Lost race settling order; another event applied first"
            );
            return Ok(ReconcileOutcome::Skipped(SkipReason::AlreadySettled));
        }

        // 2. Winner decrements stock
        self.release_stock(&order).await;

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total_amount,
            payment_intent_id = ?order.payment_intent_id,
            "Order paid"
        );

        // 3. Confirmation email
        send_best_effort(self.notifier.as_ref(), &emails::order_confirmation(&order)).await;

        Ok(ReconcileOutcome::Applied(AppliedChange::OrderPaid {
            order_number: order.order_number.to_string(),
        }))
    }

    async fn payment_failed(&self, reference: OrderRef<'_>) -> Result<ReconcileOutcome, DomainError> {
        let Some(mut order) = self.locate_order(&reference).await? else {
            return Ok(unmatched(&reference));
        };

        if !order.is_awaiting_payment() {
            tracing::debug!(
                order_number = %order.order_number,
                status = %order.status,
                "Payment failure for settled order ignored"
            );
            return Ok(ReconcileOutcome::Skipped(SkipReason::AlreadySettled));
        }

        order.cancel()?;
        if !self.orders.update_if_status(&order, OrderStatus::Pending).await? {
            return Ok(ReconcileOutcome::Skipped(SkipReason::AlreadySettled));
        }

        tracing::info!(order_number = %order.order_number, "Order cancelled after failed payment");

        Ok(ReconcileOutcome::Applied(AppliedChange::OrderCancelled {
            order_number: order.order_number.to_string(),
        }))
    }

    async fn locate_order(&self, reference: &OrderRef<'_>) -> Result<Option<Order>, DomainError> {
        let found = match reference {
            OrderRef::CheckoutSession(session) => {
                self.orders.find_by_checkout_session(&session.id).await?
            }
            OrderRef::PaymentIntent(intent) => self.orders.find_by_payment_intent(&intent.id).await?,
        };
        if found.is_some() {
            return Ok(found);
        }

        // Intake stamps the order id into gateway metadata
        let Some(order_id) = reference.metadata_order_id() else {
            return Ok(None);
        };
        let found = self.orders.find_by_id(&order_id).await?;
        Ok(found.filter(|order| {
            let linkable = reference.may_link(order);
            if !linkable {
                tracing::warn!(
                    order_number = %order.order_number,
                    reference = %reference.id(),
                    "Metadata names an order linked to another payment"
                );
            }
            linkable
        }))
    }

    /// Decrements stock for every line. Refusals are alerts, never rollbacks.
    async fn release_stock(&self, order: &Order) {
        for item in &order.items {
            match self.catalog.decrement_stock(&item.product_id, item.quantity).await {
                Ok(StockAdjustment::Applied { remaining }) => {
                    tracing::debug!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        remaining,
                        "Stock decremented"
                    );
                }
                Ok(StockAdjustment::Insufficient { available }) => {
                    tracing::error!(
                        order_number = %order.order_number,
                        product_id = %item.product_id,
                        requested = item.quantity,
                        available,
                        "Stock decrement refused: paid order exceeds stock"
                    );
                }
                Ok(StockAdjustment::ProductMissing) => {
                    tracing::error!(
                        order_number = %order.order_number,
                        product_id = %item.product_id,
                        "Stock decrement refused: product no longer in catalog"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        order_number = %order.order_number,
                        product_id = %item.product_id,
                        error = %err,
                        "Stock decrement failed"
                    );
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Subscriptions
    // ════════════════════════════════════════════════════════════════════════════

    async fn renewal_paid(&self, invoice: &InvoicePayload) -> Result<ReconcileOutcome, DomainError> {
        let Some(gateway_id) = invoice.subscription.as_deref() else {
            return Ok(ReconcileOutcome::Skipped(SkipReason::NoSubscriptionReference));
        };

        let Some(mut subscription) = self.subscriptions.find_by_gateway_id(gateway_id).await? else {
            tracing::info!(
                gateway_subscription_id = %gateway_id,
                invoice_id = %invoice.id,
                "Renewal for unknown subscription"
            );
            return Ok(ReconcileOutcome::Skipped(SkipReason::Unmatched));
        };

        if subscription.status == SubscriptionStatus::Cancelled {
            return Ok(ReconcileOutcome::Skipped(SkipReason::SubscriptionCancelled));
        }

        let previous = subscription.status;
        if !subscription.record_renewal(Timestamp::now())? {
            return Ok(ReconcileOutcome::Skipped(SkipReason::ScheduleUnchanged));
        }
        // A cancellation landing after the read must win
        if !self.subscriptions.update_if_status(&subscription, previous).await? {
            tracing::info!(
                gateway_subscription_id = %gateway_id,
                "Subscription changed during renewal; renewal dropped"
            );
            return Ok(ReconcileOutcome::Skipped(SkipReason::SubscriptionCancelled));
        }

        tracing::info!(
            gateway_subscription_id = %gateway_id,
            next_delivery = %subscription.next_delivery,
            "Subscription renewed"
        );

        Ok(ReconcileOutcome::Applied(AppliedChange::SubscriptionRenewed {
            gateway_subscription_id: gateway_id.to_string(),
        }))
    }

    async fn subscription_deleted(
        &self,
        payload: &SubscriptionPayload,
    ) -> Result<ReconcileOutcome, DomainError> {
        let Some(mut subscription) = self.subscriptions.find_by_gateway_id(&payload.id).await? else {
            tracing::info!(gateway_subscription_id = %payload.id, "Deletion for unknown subscription");
            return Ok(ReconcileOutcome::Skipped(SkipReason::Unmatched));
        };

        let previous = subscription.status;
        if !subscription.cancel() {
            return Ok(ReconcileOutcome::Skipped(SkipReason::SubscriptionCancelled));
        }
        if !self.subscriptions.update_if_status(&subscription, previous).await? {
            tracing::debug!(gateway_subscription_id = %payload.id, "Subscription cancelled concurrently");
            return Ok(ReconcileOutcome::Skipped(SkipReason::SubscriptionCancelled));
        }

        tracing::info!(gateway_subscription_id = %payload.id, "Subscription cancelled by gateway");

        Ok(ReconcileOutcome::Applied(AppliedChange::SubscriptionCancelled {
            gateway_subscription_id: payload.id.clone(),
        }))
    }
}

impl OrderRef<'_> {
    fn id(&self) -> &str {
        match self {
            OrderRef::CheckoutSession(session) => &session.id,
            OrderRef::PaymentIntent(intent) => &intent.id,
        }
    }

    fn payment_intent_id(&self) -> Option<String> {
        match self {
            OrderRef::CheckoutSession(session) => session.payment_intent.clone(),
            OrderRef::PaymentIntent(intent) => Some(intent.id.clone()),
        }
    }

    /// An order found through metadata must not already belong to a
    /// different checkout session or payment intent.
    fn may_link(&self, order: &Order) -> bool {
        match self {
            OrderRef::CheckoutSession(session) => order
                .checkout_session_id
                .as_deref()
                .map_or(true, |linked| linked == session.id),
            OrderRef::PaymentIntent(intent) => order
                .payment_intent_id
                .as_deref()
                .map_or(true, |linked| linked == intent.id),
        }
    }

    fn metadata_order_id(&self) -> Option<OrderId> {
        let metadata = match self {
            OrderRef::CheckoutSession(session) => &session.metadata,
            OrderRef::PaymentIntent(intent) => &intent.metadata,
        };
        metadata.get("order_id").and_then(|raw| raw.parse().ok())
    }
}

fn unmatched(reference: &OrderRef<'_>) -> ReconcileOutcome {
    tracing::info!(reference = %reference.id(), "No order matches payment event");
    ReconcileOutcome::Skipped(SkipReason::Unmatched)
}
