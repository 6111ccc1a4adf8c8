//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresOrderRepository` - Order ledger with compare-and-set status updates
//! - `PostgresSubscriptionRepository` - Subscription ledger
//! - `PostgresProductCatalog` - Products and atomic stock decrements
//! - `PostgresWebhookEventRepository` - Processed gateway events

mod order_repository;
mod product_catalog;
mod subscription_repository;
mod webhook_event_repository;

pub use order_repository::PostgresOrderRepository;
pub use product_catalog::PostgresProductCatalog;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
