//! Order aggregate.
//!
//! An order snapshots product prices at intake and stores its total once.
//! After creation it is mutated only by payment reconciliation (status and
//! payment references) and by operators (status and tracking number).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, Money, OrderId, ProductId, StateMachine, Timestamp, UserId,
    ValidationError,
};

use super::{OrderNumber, OrderStatus, ShippingAddress};

/// One cart line frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    /// Product name at order time, used for gateway line items and emails.
    pub name: String,
    pub quantity: u32,
    /// Unit price snapshot. Later catalog price changes never touch it.
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(Self {
            product_id,
            name: name.into(),
            quantity,
            unit_price,
        })
    }

    pub fn line_total(&self) -> Result<Money, ValidationError> {
        self.unit_price.times(self.quantity)
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    /// Present when the order was placed by a signed-in customer.
    pub user_id: Option<UserId>,
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    /// Hosted checkout session, attached once after intake.
    pub checkout_session_id: Option<String>,
    /// Gateway payment reference, learned from the completed checkout.
    pub payment_intent_id: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Creates a pending order, computing the total from the line items.
    pub fn place(
        id: OrderId,
        order_number: OrderNumber,
        user_id: Option<UserId>,
        items: Vec<LineItem>,
        shipping_address: ShippingAddress,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::validation("items", "Order must contain at least one item"));
        }
        shipping_address.validate()?;

        let total_amount = items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.line_total()?))?;

        let now = Timestamp::now();
        Ok(Self {
            id,
            order_number,
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address,
            checkout_session_id: None,
            payment_intent_id: None,
            tracking_number: None,
            notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Records the hosted checkout session. Re-attaching the same id is a no-op.
    pub fn attach_checkout_session(&mut self, session_id: impl Into<String>) -> Result<(), DomainError> {
        let session_id = session_id.into();
        match &self.checkout_session_id {
            Some(existing) if *existing == session_id => Ok(()),
            Some(existing) => Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Order {} already has checkout session {}",
                    self.order_number, existing
                ),
            )),
            None => {
                self.checkout_session_id = Some(session_id);
                self.updated_at = Timestamp::now();
                Ok(())
            }
        }
    }

    /// Confirms payment. Only valid from `pending`.
    pub fn mark_paid(&mut self, payment_intent_id: Option<String>) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Paid)?;
        if payment_intent_id.is_some() {
            self.payment_intent_id = payment_intent_id;
        }
        Ok(())
    }

    /// Cancels the order. Valid from any state before delivery.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(OrderStatus::Cancelled)
    }

    /// Operator status change, optionally recording a tracking number.
    ///
    /// Operators follow the state machine with two exceptions: payment is
    /// only confirmed by the gateway, and a delivered order may still be
    /// cancelled (returns, chargebacks).
    pub fn apply_operator_update(
        &mut self,
        target: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<(), DomainError> {
        match (self.status, target) {
            (OrderStatus::Pending, OrderStatus::Paid) => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "Payment can only be confirmed by the payment gateway",
                )
                .with_detail("order_number", self.order_number.as_str()));
            }
            (OrderStatus::Delivered, OrderStatus::Cancelled) => {
                self.status = OrderStatus::Cancelled;
                self.updated_at = Timestamp::now();
            }
            (current, target) if current != target => self.transition_to(target)?,
            _ => {}
        }
        if let Some(tracking) = tracking_number.filter(|t| !t.trim().is_empty()) {
            self.tracking_number = Some(tracking.trim().to_string());
            self.updated_at = Timestamp::now();
        }
        Ok(())
    }

    /// True while the order still awaits a payment outcome.
    pub fn is_awaiting_payment(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    fn transition_to(&mut self, target: OrderStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition order from {} to {}", self.status, target),
            )
            .with_detail("order_number", self.order_number.as_str())
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::order::shipping_address::test_address;

    pub fn line(price_cents: i64, quantity: u32) -> LineItem {
        LineItem::new(
            ProductId::new(),
            "House Blend",
            quantity,
            Money::from_cents(price_cents).unwrap(),
        )
        .unwrap()
    }

    pub fn pending_order(items: Vec<LineItem>) -> Order {
        Order::place(
            OrderId::new(),
            OrderNumber::generate(),
            None,
            items,
            test_address(),
            None,
        )
        .unwrap()
    }
}
