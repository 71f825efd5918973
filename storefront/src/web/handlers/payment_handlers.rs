// storefront/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use alur::{FlowContext, FlowOutcome};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::PaymentNotification;
use crate::pipelines::contexts::{NotificationCtxData, ReconcileOutcome};
use crate::state::AppState;

/// Gateway webhook. Anything short of a malformed token, an unknown order or a
/// storage failure is acknowledged with 200 so the gateway stops redelivering.
#[instrument(
  name = "handler::payment_notification",
  skip(app_state, payload),
  fields(token = ?payload.order_id, transaction_status = %payload.transaction_status)
)]
pub async fn payment_notification_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PaymentNotification>,
) -> Result<HttpResponse, AppError> {
  let ctx = FlowContext::new(NotificationCtxData::new(app_state.get_ref().clone(), payload.into_inner()));

  let outcome = match app_state.flows.run(ctx.clone()).await {
    Ok(outcome) => outcome,
    Err(app_err) => {
      warn!(error = %app_err, "Payment notification rejected.");
      return Err(app_err);
    }
  };

  let (order, reconcile, reason) = ctx.with(|data| (data.order.clone(), data.outcome, data.reason));
  let order = order.ok_or_else(|| AppError::Internal("Notification handled without an order.".to_string()))?;
  let reconcile = reconcile.unwrap_or(ReconcileOutcome::Ignored);
  if let FlowOutcome::Halted { step } = &outcome {
    info!(order_id = %order.id, %step, "Notification acknowledged early.");
  }

  info!(order_id = %order.id, outcome = ?reconcile, status = %order.status, "Payment notification processed.");
  Ok(HttpResponse::Ok().json(json!({
    "outcome": reconcile,
    "reason": reason,
    "order_id": order.id,
    "status": order.status.code(),
    "status_label": order.status.label(),
  })))
}
