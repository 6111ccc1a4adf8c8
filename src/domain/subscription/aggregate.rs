//! Subscription aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, ProductId, StateMachine, SubscriptionId, Timestamp, UserId,
};
use crate::domain::order::ShippingAddress;

use super::{DeliveryFrequency, SubscriptionStatus};

/// A recurring coffee delivery backed by a gateway billing agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub frequency: DeliveryFrequency,
    pub quantity: u32,
    pub status: SubscriptionStatus,
    /// Recurring-billing reference issued by the gateway.
    pub gateway_subscription_id: String,
    /// Only ever moves forward.
    pub next_delivery: Timestamp,
    pub shipping_address: ShippingAddress,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates an active subscription once the gateway agreement exists.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        id: SubscriptionId,
        user_id: UserId,
        product_id: ProductId,
        frequency: DeliveryFrequency,
        quantity: u32,
        gateway_subscription_id: impl Into<String>,
        shipping_address: ShippingAddress,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity", "Quantity must be at least 1"));
        }
        let gateway_subscription_id = gateway_subscription_id.into();
        if gateway_subscription_id.trim().is_empty() {
            return Err(DomainError::validation(
                "gateway_subscription_id",
                "Recurring billing reference is required",
            ));
        }
        shipping_address.validate()?;

        Ok(Self {
            id,
            user_id,
            product_id,
            frequency,
            quantity,
            status: SubscriptionStatus::Active,
            gateway_subscription_id,
            next_delivery: frequency.next_after(now),
            shipping_address,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a paid renewal invoice, scheduling from `now`.
    ///
    /// The next delivery never moves backwards: a late or duplicate
    /// renewal keeps the later of the current and the computed date.
    /// Returns whether the schedule changed.
    pub fn record_renewal(&mut self, now: Timestamp) -> Result<bool, DomainError> {
        if self.status == SubscriptionStatus::Cancelled {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Cannot renew a cancelled subscription",
            ));
        }
        let candidate = self.frequency.next_after(now);
        if candidate.is_after(&self.next_delivery) {
            self.next_delivery = candidate;
            self.updated_at = now;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Cancels the subscription. Returns false when it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.status == SubscriptionStatus::Cancelled {
            return false;
        }
        self.status = SubscriptionStatus::Cancelled;
        self.updated_at = Timestamp::now();
        true
    }

    pub fn pause(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Paused)
    }

    pub fn resume(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active)
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {} to {}",
                    self.status, target
                ),
            )
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_subscription(frequency: DeliveryFrequency, gateway_id: &str) -> Subscription {
    Subscription::start(
        SubscriptionId::new(),
        UserId::new(),
        ProductId::new(),
        frequency,
        1,
        gateway_id,
        crate::domain::order::test_address(),
        Timestamp::now(),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn start_schedules_first_delivery() {
        let now = Timestamp::now();
        let sub = Subscription::start(
            SubscriptionId::new(),
            UserId::new(),
            ProductId::new(),
            DeliveryFrequency::Weekly,
            2,
            "sub_123",
            crate::domain::order::test_address(),
            now,
        )
        .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.next_delivery, now.add_days(7));
        assert_eq!(sub.quantity, 2);
    }

    #[test]
    fn start_rejects_zero_quantity() {
        let result = Subscription::start(
            SubscriptionId::new(),
            UserId::new(),
            ProductId::new(),
            DeliveryFrequency::Weekly,
            0,
            "sub_123",
            crate::domain::order::test_address(),
            Timestamp::now(),
        );
        assert_eq!(result.unwrap_err().code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn renewal_schedules_from_processing_time() {
        let mut sub = test_subscription(DeliveryFrequency::Biweekly, "sub_1");
        let later = Timestamp::now().add_days(30);
        assert!(sub.record_renewal(later).unwrap());
        assert_eq!(sub.next_delivery, later.add_days(14));
    }

    #[test]
    fn stale_renewal_does_not_move_schedule_backwards() {
        let mut sub = test_subscription(DeliveryFrequency::Monthly, "sub_1");
        let future = Timestamp::now().add_days(90);
        sub.record_renewal(future).unwrap();
        let scheduled = sub.next_delivery;

        assert!(!sub.record_renewal(Timestamp::now()).unwrap());
        assert_eq!(sub.next_delivery, scheduled);
    }

    #[test]
    fn cancelled_subscription_cannot_renew() {
        let mut sub = test_subscription(DeliveryFrequency::Weekly, "sub_1");
        sub.cancel();
        assert!(sub.record_renewal(Timestamp::now()).is_err());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut sub = test_subscription(DeliveryFrequency::Weekly, "sub_1");
        assert!(sub.cancel());
        assert!(!sub.cancel());
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
    }

    #[test]
    fn cancelled_subscription_cannot_resume() {
        let mut sub = test_subscription(DeliveryFrequency::Weekly, "sub_1");
        sub.cancel();
        assert!(sub.resume().is_err());
    }

    #[test]
    fn pause_then_resume() {
        let mut sub = test_subscription(DeliveryFrequency::Weekly, "sub_1");
        sub.pause().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Paused);
        sub.resume().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    fn frequency_strategy() -> impl Strategy<Value = DeliveryFrequency> {
        prop_oneof![
            Just(DeliveryFrequency::Weekly),
            Just(DeliveryFrequency::Biweekly),
            Just(DeliveryFrequency::Monthly),
        ]
    }

    proptest! {
        #[test]
        fn next_delivery_is_monotonic(
            frequency in frequency_strategy(),
            offsets in prop::collection::vec(-60i64..400, 1..20)
        ) {
            let mut sub = test_subscription(frequency, "sub_prop");
            let base = Timestamp::now();
            let mut previous = sub.next_delivery;
            for offset in offsets {
                sub.record_renewal(base.add_days(offset)).unwrap();
                prop_assert!(sub.next_delivery >= previous);
                previous = sub.next_delivery;
            }
        }
    }
}
