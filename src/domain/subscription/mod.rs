//! Subscription module - the subscription ledger.

mod aggregate;
mod frequency;
mod status;

pub use aggregate::Subscription;
pub use frequency::DeliveryFrequency;
pub use status::SubscriptionStatus;

#[cfg(test)]
pub(crate) use aggregate::test_subscription;
