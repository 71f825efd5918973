// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::status::OrderStatus;

pub const DEFAULT_RECIPIENT_NAME: &str = "Tanpa Nama";

/// Snapshot of a cart line at checkout; never follows later product edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
  #[serde(alias = "id")]
  pub product_id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default, alias = "price")]
  pub unit_price: i64,
  pub quantity: i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub option: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_email: String,
  /// Recipient name.
  pub name: String,
  pub lines: Json<Vec<OrderLine>>,
  pub price: i64,
  pub status: OrderStatus,
  /// Last transaction token handed to the payment gateway.
  pub external_ref: Option<String>,
  pub address: Option<String>,
  pub phone: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Order {
  pub fn has_shipping_info(&self) -> bool {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    filled(&self.address) && filled(&self.phone)
  }
}

/// Everything the ledger needs to record a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_email: String,
  pub name: String,
  pub lines: Vec<OrderLine>,
  pub price: i64,
  pub address: Option<String>,
  pub phone: Option<String>,
}

impl NewOrder {
  pub fn into_order(self, id: Uuid, created_at: DateTime<Utc>) -> Order {
    Order {
      id,
      user_email: self.user_email,
      name: self.name,
      lines: Json(self.lines),
      price: self.price,
      status: OrderStatus::AwaitingPayment,
      external_ref: None,
      address: self.address,
      phone: self.phone,
      created_at,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShippingInfo {
  pub address: String,
  pub phone: String,
  #[serde(default)]
  pub name: Option<String>,
}
