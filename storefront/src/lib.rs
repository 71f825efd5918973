// storefront/src/lib.rs

//! Storefront order and payment reconciliation service.
//!
//! Orders are created against a stock-checked catalog, settled through a hosted
//! payment page or cash on delivery, and kept in step with asynchronous gateway
//! notifications. Every workflow is an `alur` flow registered on [`state::AppState`].

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;
