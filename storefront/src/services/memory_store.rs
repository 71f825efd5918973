// storefront/src/services/memory_store.rs

//! Process-local catalog and ledger. Each operation takes its map lock once and
//! never holds it across an `.await`, so a whole reservation is one critical
//! section.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{NewOrder, Order, OrderStatus, Product, ShippingInfo};
use crate::services::catalog::{ensure_positive, CatalogStore, DecrementOutcome, StockRequest};
use crate::services::ledger::OrderLedger;

#[derive(Default)]
pub struct MemoryStore {
  products: Mutex<HashMap<String, Product>>,
  orders: Mutex<HashMap<Uuid, Order>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn product_not_found(product_id: &str) -> AppError {
  AppError::NotFound(format!("Product '{}' not found", product_id))
}

fn order_not_found(order_id: Uuid) -> AppError {
  AppError::NotFound(format!("Order '{}' not found", order_id))
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn get(&self, product_id: &str) -> AppResult<Option<Product>> {
    Ok(self.products.lock().get(product_id).cloned())
  }

  async fn conditional_decrement(&self, product_id: &str, quantity: i32) -> AppResult<DecrementOutcome> {
    ensure_positive(product_id, quantity)?;
    let mut products = self.products.lock();
    let product = products.get_mut(product_id).ok_or_else(|| product_not_found(product_id))?;
    if product.stock < quantity {
      return Ok(DecrementOutcome::InsufficientStock {
        available: product.stock,
      });
    }
    product.stock -= quantity;
    Ok(DecrementOutcome::Applied {
      remaining: product.stock,
    })
  }

  #[instrument(name = "MemoryStore::reserve", skip_all, fields(lines = requests.len()))]
  async fn reserve(&self, requests: &[StockRequest]) -> AppResult<()> {
    let mut products = self.products.lock();

    // Check every line before touching any counter.
    for request in requests {
      ensure_positive(&request.product_id, request.quantity)?;
      let product = products
        .get(&request.product_id)
        .ok_or_else(|| product_not_found(&request.product_id))?;
      if product.stock < request.quantity {
        return Err(AppError::InsufficientStock {
          product_id: product.id.clone(),
          title: product.title.clone(),
          requested: request.quantity,
          available: product.stock,
        });
      }
    }
    for request in requests {
      if let Some(product) = products.get_mut(&request.product_id) {
        product.stock -= request.quantity;
        debug!(product_id = %product.id, remaining = product.stock, "Stock reserved.");
      }
    }
    Ok(())
  }

  async fn release(&self, requests: &[StockRequest]) -> AppResult<()> {
    let mut products = self.products.lock();
    for request in requests {
      ensure_positive(&request.product_id, request.quantity)?;
      if let Some(product) = products.get(&request.product_id) {
        if product.stock.checked_add(request.quantity).is_none() {
          return Err(AppError::Internal(format!(
            "Releasing {} units would overflow stock of '{}'",
            request.quantity, product.id
          )));
        }
      }
    }
    for request in requests {
      if let Some(product) = products.get_mut(&request.product_id) {
        product.stock += request.quantity;
      }
    }
    Ok(())
  }

  async fn insert(&self, product: Product) -> AppResult<()> {
    self.products.lock().insert(product.id.clone(), product);
    Ok(())
  }
}

#[async_trait]
impl OrderLedger for MemoryStore {
  async fn create(&self, order: NewOrder) -> AppResult<Order> {
    let order = order.into_order(Uuid::new_v4(), Utc::now());
    self.orders.lock().insert(order.id, order.clone());
    Ok(order)
  }

  async fn get(&self, order_id: Uuid) -> AppResult<Option<Order>> {
    Ok(self.orders.lock().get(&order_id).cloned())
  }

  async fn compare_and_set_status(
    &self,
    order_id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
  ) -> AppResult<Option<Order>> {
    let mut orders = self.orders.lock();
    let order = orders.get_mut(&order_id).ok_or_else(|| order_not_found(order_id))?;
    if order.status != expected {
      return Ok(None);
    }
    order.status = next;
    Ok(Some(order.clone()))
  }

  async fn set_external_reference(&self, order_id: Uuid, token: &str) -> AppResult<()> {
    let mut orders = self.orders.lock();
    let order = orders.get_mut(&order_id).ok_or_else(|| order_not_found(order_id))?;
    order.external_ref = Some(token.to_string());
    Ok(())
  }

  async fn save_shipping(&self, order_id: Uuid, shipping: &ShippingInfo) -> AppResult<Order> {
    let mut orders = self.orders.lock();
    let order = orders.get_mut(&order_id).ok_or_else(|| order_not_found(order_id))?;
    order.address = Some(shipping.address.clone());
    order.phone = Some(shipping.phone.clone());
    if let Some(name) = &shipping.name {
      order.name = name.clone();
    }
    Ok(order.clone())
  }
}
