//! Domain layer - pure business logic with no infrastructure dependencies.

pub mod catalog;
pub mod foundation;
pub mod order;
pub mod payment;
pub mod subscription;
