// storefront/src/web/dto.rs

//! Request and response bodies. Statuses leave the service as both the
//! canonical code and the storefront label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Order, OrderLine, ShippingInfo};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
  #[serde(default)]
  pub lines: Vec<OrderLine>,
  /// A session cart may be sent instead of explicit lines.
  #[serde(default)]
  pub cart: Option<serde_json::Value>,
  #[serde(default)]
  pub price: Option<i64>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

pub type ShippingRequest = ShippingInfo;

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
  /// Canonical code or storefront label.
  pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
  pub code: &'static str,
  pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
  pub id: Uuid,
  pub user_email: String,
  pub name: String,
  pub lines: Vec<OrderLine>,
  pub price: i64,
  pub status: StatusView,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub external_ref: Option<String>,
  pub address: Option<String>,
  pub phone: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
  fn from(order: Order) -> Self {
    Self {
      id: order.id,
      user_email: order.user_email,
      name: order.name,
      lines: order.lines.0,
      price: order.price,
      status: StatusView {
        code: order.status.code(),
        label: order.status.label(),
      },
      external_ref: order.external_ref,
      address: order.address,
      phone: order.phone,
      created_at: order.created_at,
    }
  }
}
