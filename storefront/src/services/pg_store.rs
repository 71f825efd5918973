// storefront/src/services/pg_store.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{NewOrder, Order, OrderStatus, Product, ShippingInfo};
use crate::services::catalog::{ensure_positive, CatalogStore, DecrementOutcome, StockRequest};
use crate::services::ledger::OrderLedger;

const ORDER_COLUMNS: &str = "id, user_email, name, lines, price, status, external_ref, address, phone, created_at";
const PRODUCT_COLUMNS: &str = "id, title, description, price, stock, category, options";

/// Postgres-backed catalog and ledger over the tables in `schema.sql`.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Applies `schema.sql`. Safe to run on every start.
  pub async fn apply_schema(&self) -> AppResult<()> {
    sqlx::raw_sql(include_str!("../../schema.sql")).execute(&self.pool).await?;
    Ok(())
  }

  async fn order_exists(&self, order_id: Uuid) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
      .bind(order_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }
}

fn order_not_found(order_id: Uuid) -> AppError {
  AppError::NotFound(format!("Order '{}' not found", order_id))
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn get(&self, product_id: &str) -> AppResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn conditional_decrement(&self, product_id: &str, quantity: i32) -> AppResult<DecrementOutcome> {
    ensure_positive(product_id, quantity)?;
    let remaining: Option<i32> =
      sqlx::query_scalar("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1 RETURNING stock")
        .bind(quantity)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
    if let Some(remaining) = remaining {
      return Ok(DecrementOutcome::Applied { remaining });
    }

    let available: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    match available {
      Some(available) => Ok(DecrementOutcome::InsufficientStock { available }),
      None => Err(AppError::NotFound(format!("Product '{}' not found", product_id))),
    }
  }

  #[instrument(name = "PgStore::reserve", skip_all, fields(lines = requests.len()))]
  async fn reserve(&self, requests: &[StockRequest]) -> AppResult<()> {
    for request in requests {
      ensure_positive(&request.product_id, request.quantity)?;
    }
    let mut tx = self.pool.begin().await?;

    for request in requests {
      let updated = sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1")
        .bind(request.quantity)
        .bind(&request.product_id)
        .execute(&mut *tx)
        .await?;
      if updated.rows_affected() == 1 {
        continue;
      }

      let current: Option<(String, i32)> = sqlx::query_as("SELECT title, stock FROM products WHERE id = $1")
        .bind(&request.product_id)
        .fetch_optional(&mut *tx)
        .await?;
      tx.rollback().await?;
      warn!(product_id = %request.product_id, requested = request.quantity, "Reservation rolled back.");
      return Err(match current {
        Some((title, available)) => AppError::InsufficientStock {
          product_id: request.product_id.clone(),
          title,
          requested: request.quantity,
          available,
        },
        None => AppError::NotFound(format!("Product '{}' not found", request.product_id)),
      });
    }

    tx.commit().await?;
    Ok(())
  }

  async fn release(&self, requests: &[StockRequest]) -> AppResult<()> {
    for request in requests {
      ensure_positive(&request.product_id, request.quantity)?;
    }
    let mut tx = self.pool.begin().await?;
    for request in requests {
      sqlx::query("UPDATE products SET stock = stock + $1 WHERE id = $2")
        .bind(request.quantity)
        .bind(&request.product_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
  }

  async fn insert(&self, product: Product) -> AppResult<()> {
    sqlx::query(
      "INSERT INTO products (id, title, description, price, stock, category, options)
       VALUES ($1, $2, $3, $4, $5, $6, $7)
       ON CONFLICT (id) DO UPDATE SET
         title = EXCLUDED.title, description = EXCLUDED.description, price = EXCLUDED.price,
         stock = EXCLUDED.stock, category = EXCLUDED.category, options = EXCLUDED.options",
    )
    .bind(&product.id)
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.category)
    .bind(&product.options)
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}

#[async_trait]
impl OrderLedger for PgStore {
  async fn create(&self, order: NewOrder) -> AppResult<Order> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (id, user_email, name, lines, price, status, address, phone, created_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
       RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&order.user_email)
    .bind(&order.name)
    .bind(Json(&order.lines))
    .bind(order.price)
    .bind(OrderStatus::AwaitingPayment)
    .bind(&order.address)
    .bind(&order.phone)
    .bind(Utc::now())
    .fetch_one(&self.pool)
    .await?;
    Ok(order)
  }

  async fn get(&self, order_id: Uuid) -> AppResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  #[instrument(name = "PgStore::compare_and_set_status", skip(self), err(Display))]
  async fn compare_and_set_status(
    &self,
    order_id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
  ) -> AppResult<Option<Order>> {
    let updated = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = $1 WHERE id = $2 AND status = $3 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(next)
    .bind(order_id)
    .bind(expected)
    .fetch_optional(&self.pool)
    .await?;

    if updated.is_none() && !self.order_exists(order_id).await? {
      return Err(order_not_found(order_id));
    }
    Ok(updated)
  }

  async fn set_external_reference(&self, order_id: Uuid, token: &str) -> AppResult<()> {
    let result = sqlx::query("UPDATE orders SET external_ref = $1 WHERE id = $2")
      .bind(token)
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(order_not_found(order_id));
    }
    Ok(())
  }

  async fn save_shipping(&self, order_id: Uuid, shipping: &ShippingInfo) -> AppResult<Order> {
    sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET address = $1, phone = $2, name = COALESCE($3, name) WHERE id = $4 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(&shipping.address)
    .bind(&shipping.phone)
    .bind(&shipping.name)
    .bind(order_id)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| order_not_found(order_id))
  }
}
