// storefront/src/models/status.rs

//! Order lifecycle: canonical statuses, their storefront labels, the gateway
//! status vocabulary, and the transition table every status write goes through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  AwaitingPayment,
  InProcess,
  Shipped,
  Delivered,
  Failed,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::AwaitingPayment,
    OrderStatus::InProcess,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Failed,
    OrderStatus::Cancelled,
  ];

  pub fn code(self) -> &'static str {
    match self {
      OrderStatus::AwaitingPayment => "awaiting_payment",
      OrderStatus::InProcess => "in_process",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Failed => "failed",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// Label shown to shoppers and admins.
  pub fn label(self) -> &'static str {
    match self {
      OrderStatus::AwaitingPayment => "menunggu pembayaran",
      OrderStatus::InProcess => "Dalam proses..",
      OrderStatus::Shipped => "Dikirim",
      OrderStatus::Delivered => "Selesai",
      OrderStatus::Failed => "Gagal",
      OrderStatus::Cancelled => "Dibatalkan",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Failed | OrderStatus::Cancelled)
  }

  /// Edges of the lifecycle graph, excluding the admin-only cancel edge.
  fn has_edge_to(self, next: OrderStatus) -> bool {
    matches!(
      (self, next),
      (OrderStatus::AwaitingPayment, OrderStatus::InProcess)
        | (OrderStatus::InProcess, OrderStatus::Shipped)
        | (OrderStatus::Shipped, OrderStatus::Delivered)
        | (OrderStatus::AwaitingPayment, OrderStatus::Failed)
    )
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
  type Err = UnknownStatus;

  /// Accepts the canonical code or the storefront label, ignoring case.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.code().eq_ignore_ascii_case(wanted) || status.label().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}

/// `transaction_status` values sent by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
  Settlement,
  Capture,
  Pending,
  Deny,
  Cancel,
  Expire,
  Other(String),
}

impl From<&str> for GatewayStatus {
  fn from(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "settlement" => GatewayStatus::Settlement,
      "capture" => GatewayStatus::Capture,
      "pending" => GatewayStatus::Pending,
      "deny" => GatewayStatus::Deny,
      "cancel" => GatewayStatus::Cancel,
      "expire" => GatewayStatus::Expire,
      other => GatewayStatus::Other(other.to_string()),
    }
  }
}

impl GatewayStatus {
  /// Total: unknown values map to AwaitingPayment so a notification is never dropped.
  pub fn target_status(&self) -> OrderStatus {
    match self {
      GatewayStatus::Settlement | GatewayStatus::Capture => OrderStatus::InProcess,
      GatewayStatus::Pending => OrderStatus::AwaitingPayment,
      GatewayStatus::Deny | GatewayStatus::Cancel | GatewayStatus::Expire => OrderStatus::Failed,
      GatewayStatus::Other(_) => OrderStatus::AwaitingPayment,
    }
  }
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
  Gateway,
  CashOnDelivery,
  Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  Apply(OrderStatus),
  /// Already at the requested status, or past it for a COD confirmation.
  Unchanged,
  /// Acknowledged but not applied.
  Ignored(&'static str),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot move order from {} to {} ({trigger:?})", .from.label(), .to.label())]
pub struct InvalidTransition {
  pub from: OrderStatus,
  pub to: OrderStatus,
  pub trigger: Trigger,
}

/// Decides what a request to move `current` to `target` does.
///
/// Gateway notifications never fail: terminal or stale orders are acknowledged
/// and left alone. Cash-on-delivery is idempotent once the order is in process or
/// beyond, and refused on failed or cancelled orders. Admins follow the lifecycle
/// graph and may cancel from any other status.
pub fn plan_transition(current: OrderStatus, target: OrderStatus, trigger: Trigger) -> Result<Transition, InvalidTransition> {
  let invalid = InvalidTransition {
    from: current,
    to: target,
    trigger,
  };

  match trigger {
    Trigger::Gateway => {
      if current == target {
        Ok(Transition::Unchanged)
      } else if current.is_terminal() {
        Ok(Transition::Ignored("order is in a terminal status"))
      } else if current.has_edge_to(target) {
        Ok(Transition::Apply(target))
      } else {
        Ok(Transition::Ignored("stale or out-of-order notification"))
      }
    }
    Trigger::CashOnDelivery => match current {
      OrderStatus::AwaitingPayment => Ok(Transition::Apply(OrderStatus::InProcess)),
      OrderStatus::InProcess | OrderStatus::Shipped | OrderStatus::Delivered => Ok(Transition::Unchanged),
      OrderStatus::Failed | OrderStatus::Cancelled => Err(InvalidTransition {
        to: OrderStatus::InProcess,
        ..invalid
      }),
    },
    Trigger::Admin => {
      if current == target {
        Ok(Transition::Unchanged)
      } else if current.has_edge_to(target) || target == OrderStatus::Cancelled {
        Ok(Transition::Apply(target))
      } else {
        Err(invalid)
      }
    }
  }
}
