//! Artisan Coffee - order intake and payment reconciliation.
//!
//! Turns carts into pending orders with a hosted checkout session, and
//! settles those orders (and recurring subscriptions) from signed
//! gateway webhooks. Stock is decremented only when payment is confirmed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
