// storefront/src/pipelines/common_steps.rs

//! Pieces shared by several workflows: loading an order, checking who may touch
//! it, and writing a status through the transition table.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::status::plan_transition;
use crate::models::{Order, OrderStatus, Principal, Transition, Trigger};
use crate::services::OrderLedger;

/// Attempts at a compare-and-set before giving up on a contended order.
pub const MAX_CAS_ATTEMPTS: usize = 3;

pub async fn load_order(ledger: &dyn OrderLedger, order_id: Uuid) -> AppResult<Order> {
  ledger
    .get(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order '{}' not found", order_id)))
}

pub fn ensure_access(principal: &Principal, order: &Order) -> AppResult<()> {
  if principal.can_access(&order.user_email) {
    Ok(())
  } else {
    warn!(principal = %principal.email, order_id = %order.id, "Order access denied.");
    Err(AppError::Forbidden(format!("Order '{}' belongs to another user", order.id)))
  }
}

#[derive(Debug, Clone)]
pub enum StatusWrite {
  Applied(Order),
  Unchanged(Order),
  Ignored(Order, &'static str),
}

impl StatusWrite {
  pub fn order(&self) -> &Order {
    match self {
      StatusWrite::Applied(o) | StatusWrite::Unchanged(o) | StatusWrite::Ignored(o, _) => o,
    }
  }
}

/// Moves `order` towards `target` as `trigger` allows.
///
/// Writes are compare-and-set against the status the decision was made on. When
/// another writer wins the race the order is re-read and the decision is made
/// again, at most [`MAX_CAS_ATTEMPTS`] times.
#[instrument(
  name = "common_steps::transition_with_cas",
  skip(ledger, order),
  fields(order_id = %order.id, from = %order.status),
  err(Display)
)]
pub async fn transition_with_cas(
  ledger: &dyn OrderLedger,
  mut order: Order,
  target: OrderStatus,
  trigger: Trigger,
) -> AppResult<StatusWrite> {
  for attempt in 1..=MAX_CAS_ATTEMPTS {
    let next = match plan_transition(order.status, target, trigger)? {
      Transition::Unchanged => return Ok(StatusWrite::Unchanged(order)),
      Transition::Ignored(reason) => {
        info!(current = %order.status, reason, "Transition ignored.");
        return Ok(StatusWrite::Ignored(order, reason));
      }
      Transition::Apply(next) => next,
    };

    match ledger.compare_and_set_status(order.id, order.status, next).await? {
      Some(updated) => {
        info!(to = %next, attempt, "Order status updated.");
        return Ok(StatusWrite::Applied(updated));
      }
      None => {
        warn!(attempt, expected = %order.status, "Status changed concurrently; re-reading order.");
        order = load_order(ledger, order.id).await?;
      }
    }
  }

  Err(AppError::Conflict(format!(
    "Order '{}' kept changing; status update to {} abandoned",
    order.id, target
  )))
}
