// storefront/src/services/ledger.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::{NewOrder, Order, OrderStatus, ShippingInfo};

/// Durable record of orders. Every method except `create` and `get` reports a
/// missing order as `AppError::NotFound`.
#[async_trait]
pub trait OrderLedger: Send + Sync {
  async fn create(&self, order: NewOrder) -> AppResult<Order>;

  async fn get(&self, order_id: Uuid) -> AppResult<Option<Order>>;

  /// Writes `next` only if the stored status is still `expected`. `Ok(None)`
  /// means another writer got there first.
  async fn compare_and_set_status(
    &self,
    order_id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
  ) -> AppResult<Option<Order>>;

  async fn set_external_reference(&self, order_id: Uuid, token: &str) -> AppResult<()>;

  async fn save_shipping(&self, order_id: Uuid, shipping: &ShippingInfo) -> AppResult<Order>;
}
