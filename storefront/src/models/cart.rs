// storefront/src/models/cart.rs

//! Shopper-held cart. It lives in the client session and crosses the boundary
//! as JSON; the server only sees it again as order lines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::order::OrderLine;

#[derive(Debug, Error)]
pub enum CartError {
  #[error("malformed cart: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("cart totals overflow")]
  TotalOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
  pub product_id: String,
  pub title: String,
  /// Price of one unit with the option applied.
  pub unit_price: i64,
  pub quantity: i32,
  #[serde(default)]
  pub option: Option<String>,
  /// Stock the shopper last saw for this product.
  #[serde(default)]
  pub stock_snapshot: Option<i32>,
}

impl CartItem {
  fn same_line(&self, product_id: &str, option: Option<&str>) -> bool {
    self.product_id == product_id && self.option.as_deref() == option
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
  items: Vec<CartItem>,
  total_items: i32,
  total_price: i64,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn total_items(&self) -> i32 {
    self.total_items
  }

  pub fn total_price(&self) -> i64 {
    self.total_price
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Adds `item`, merging its quantity into an existing line for the same product and option.
  pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
    let quantity = item.quantity.max(1);
    match self
      .items
      .iter_mut()
      .find(|existing| existing.same_line(&item.product_id, item.option.as_deref()))
    {
      Some(existing) => {
        existing.quantity = existing.quantity.checked_add(quantity).ok_or(CartError::TotalOverflow)?;
        if item.stock_snapshot.is_some() {
          existing.stock_snapshot = item.stock_snapshot;
        }
      }
      None => self.items.push(CartItem { quantity, ..item }),
    }
    self.recompute()
  }

  pub fn remove(&mut self, product_id: &str, option: Option<&str>) -> Result<(), CartError> {
    self.items.retain(|item| !item.same_line(product_id, option));
    self.recompute()
  }

  pub fn increase(&mut self, product_id: &str, option: Option<&str>) -> Result<(), CartError> {
    if let Some(item) = self.items.iter_mut().find(|i| i.same_line(product_id, option)) {
      item.quantity = item.quantity.checked_add(1).ok_or(CartError::TotalOverflow)?;
    }
    self.recompute()
  }

  /// Quantity never drops below one; use `remove` to drop a line.
  pub fn decrease(&mut self, product_id: &str, option: Option<&str>) -> Result<(), CartError> {
    if let Some(item) = self.items.iter_mut().find(|i| i.same_line(product_id, option)) {
      item.quantity = item.quantity.saturating_sub(1).max(1);
    }
    self.recompute()
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.total_items = 0;
    self.total_price = 0;
  }

  /// Lines whose quantity is above the last stock the shopper saw. Advisory only;
  /// the authoritative check happens when the order reserves stock.
  pub fn over_stock(&self) -> Vec<&CartItem> {
    self
      .items
      .iter()
      .filter(|item| item.stock_snapshot.is_some_and(|stock| item.quantity > stock))
      .collect()
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }

  /// Restores a cart saved with `to_json`. Totals are recomputed rather than trusted.
  pub fn from_json(raw: &str) -> Result<Self, CartError> {
    let mut cart: Cart = serde_json::from_str(raw)?;
    cart.recompute()?;
    Ok(cart)
  }

  pub fn to_order_lines(&self) -> Vec<OrderLine> {
    self
      .items
      .iter()
      .map(|item| OrderLine {
        product_id: item.product_id.clone(),
        title: item.title.clone(),
        unit_price: item.unit_price,
        quantity: item.quantity,
        option: item.option.clone(),
      })
      .collect()
  }

  fn recompute(&mut self) -> Result<(), CartError> {
    let mut total_items: i32 = 0;
    let mut total_price: i64 = 0;
    for item in &self.items {
      total_items = total_items.checked_add(item.quantity).ok_or(CartError::TotalOverflow)?;
      total_price = item
        .unit_price
        .checked_mul(i64::from(item.quantity))
        .and_then(|amount| total_price.checked_add(amount))
        .ok_or(CartError::TotalOverflow)?;
    }
    self.total_items = total_items;
    self.total_price = total_price;
    Ok(())
  }
}
