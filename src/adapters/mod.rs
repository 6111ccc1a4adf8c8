//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application core to external systems:
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - PostgreSQL stores
//! - `stripe` - Hosted checkout and recurring billing
//! - `email` - Transactional email
//! - `http` - REST API

pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
