// storefront/src/services/catalog.rs

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{OrderLine, Product};

/// One product's share of a stock reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequest {
  pub product_id: String,
  pub quantity: i32,
}

impl StockRequest {
  /// Sums quantities per product so a product ordered with two options is
  /// checked against its stock once. Sorted by product id, which also gives
  /// concurrent reservations a consistent lock order.
  ///
  /// Non-positive quantities and per-product totals past `i32::MAX` are
  /// `AppError::Validation`.
  pub fn from_lines(lines: &[OrderLine]) -> AppResult<Vec<StockRequest>> {
    let mut totals: BTreeMap<&str, i32> = BTreeMap::new();
    for line in lines {
      ensure_positive(&line.product_id, line.quantity)?;
      let total = totals.entry(line.product_id.as_str()).or_default();
      *total = total.checked_add(line.quantity).ok_or_else(|| {
        AppError::Validation(format!("Quantity ordered for product '{}' is too large", line.product_id))
      })?;
    }
    Ok(
      totals
        .into_iter()
        .map(|(product_id, quantity)| StockRequest {
          product_id: product_id.to_string(),
          quantity,
        })
        .collect(),
    )
  }
}

/// Stores refuse to move stock by zero or a negative amount.
pub fn ensure_positive(product_id: &str, quantity: i32) -> AppResult<()> {
  if quantity < 1 {
    return Err(AppError::Validation(format!(
      "Quantity for product '{}' must be at least 1",
      product_id
    )));
  }
  Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
  Applied { remaining: i32 },
  InsufficientStock { available: i32 },
}

/// Product data and the stock counters order creation draws down.
#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn get(&self, product_id: &str) -> AppResult<Option<Product>>;

  /// Takes `quantity` off one product's stock only if enough is left.
  /// Unknown products are `AppError::NotFound`.
  async fn conditional_decrement(&self, product_id: &str, quantity: i32) -> AppResult<DecrementOutcome>;

  /// All-or-nothing decrement across several products. On failure nothing is
  /// taken and the error names the first product that fell short.
  async fn reserve(&self, requests: &[StockRequest]) -> AppResult<()>;

  /// Returns previously reserved stock.
  async fn release(&self, requests: &[StockRequest]) -> AppResult<()>;

  /// Inserts or replaces a product.
  async fn insert(&self, product: Product) -> AppResult<()>;
}
