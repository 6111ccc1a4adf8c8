//! Catalog module - products consumed by order intake and reconciliation.

mod product;

pub use product::{Product, StockAdjustment};
