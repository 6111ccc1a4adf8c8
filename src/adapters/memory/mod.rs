//! In-memory adapters.
//!
//! Map-backed implementations of every storage port, used by tests and
//! for running the service without a database.

mod order_repository;
mod product_catalog;
mod subscription_repository;
mod webhook_event_repository;

pub use order_repository::InMemoryOrderRepository;
pub use product_catalog::InMemoryProductCatalog;
pub use subscription_repository::InMemorySubscriptionRepository;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
