// storefront/src/pipelines/notification_pipeline.rs

//! Reconciles asynchronous payment notifications with the order ledger.
//!
//! The gateway may deliver a notification more than once and in any order. The
//! token names the order, the gateway status names a target, and the transition
//! table decides whether that target is applied, already in place, or ignored.
//! Only malformed tokens, unknown orders and storage failures are errors.

use alur::{Flow, FlowContext, FlowRegistry, StepControl};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{GatewayStatus, Trigger};
use crate::pipelines::common_steps::{load_order, transition_with_cas, StatusWrite};
use crate::pipelines::contexts::{NotificationCtxData, ReconcileOutcome};
use crate::services::signature::verify_notification_signature;
use crate::services::token;
use crate::state::AppState;

pub fn register_notification_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut p = Flow::<NotificationCtxData, AppError>::new(
    "payment_notification",
    &[
      ("verify_signature", true),
      ("parse_token", false),
      ("map_status", false),
      ("load_order", false),
      ("reconcile", false),
    ],
  );

  p.skip_if("verify_signature", |data: &NotificationCtxData| {
    !data.app_state.config.verify_notification_signature
  });

  p.on("verify_signature", |ctx: FlowContext<NotificationCtxData>| async move {
    ctx.with(|data| -> Result<StepControl, AppError> {
      let n = &data.notification;
      let server_key = data
        .app_state
        .config
        .midtrans_server_key
        .as_deref()
        .ok_or_else(|| AppError::Config("MIDTRANS_SERVER_KEY is required to verify notifications".to_string()))?;
      let signature = n
        .signature_key
        .as_deref()
        .ok_or_else(|| AppError::Auth("Notification is missing its signature".to_string()))?;

      let valid = verify_notification_signature(
        n.order_id.as_deref().unwrap_or_default(),
        n.status_code.as_deref().unwrap_or_default(),
        n.gross_amount.as_deref().unwrap_or_default(),
        server_key,
        signature,
      );
      if !valid {
        warn!(token = ?n.order_id, "Notification signature mismatch.");
        return Err(AppError::Auth("Notification signature is invalid".to_string()));
      }
      Ok(StepControl::Continue)
    })
  });

  p.on("parse_token", |ctx: FlowContext<NotificationCtxData>| async move {
    let order_id = ctx.with(|data| token::parse(data.notification.order_id.as_deref()))?;
    ctx.write().order_id = Some(order_id);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("map_status", |ctx: FlowContext<NotificationCtxData>| async move {
    ctx.update(|data| {
      let n = &data.notification;
      let gateway_status = GatewayStatus::from(n.transaction_status.as_str());
      let target = gateway_status.target_status();
      info!(
        order_id = ?data.order_id,
        transaction_status = %n.transaction_status,
        fraud_status = ?n.fraud_status,
        payment_type = ?n.payment_type,
        target = %target,
        "Payment notification received."
      );
      data.target = Some(target);
    });
    Ok::<_, AppError>(StepControl::Continue)
  });

  // Terminal orders are acknowledged here without touching the ledger again.
  p.on("load_order", |ctx: FlowContext<NotificationCtxData>| async move {
    let (ledger, order_id) = ctx.with(|data| (data.app_state.ledger.clone(), data.order_id));
    let order_id = order_id.ok_or_else(|| AppError::Internal("Order id not parsed before lookup".to_string()))?;
    let order = load_order(ledger.as_ref(), order_id).await?;

    let terminal = order.status.is_terminal();
    ctx.update(|data| {
      if terminal {
        info!(%order_id, status = %order.status, "Notification for terminal order ignored.");
        data.outcome = Some(ReconcileOutcome::Ignored);
        data.reason = Some("order is in a terminal status");
      }
      data.order = Some(order);
    });
    Ok::<_, AppError>(if terminal { StepControl::Halt } else { StepControl::Continue })
  });

  p.on("reconcile", |ctx: FlowContext<NotificationCtxData>| async move {
    let (ledger, order, target) = ctx.with(|data| (data.app_state.ledger.clone(), data.order.clone(), data.target));
    let (order, target) = order
      .zip(target)
      .ok_or_else(|| AppError::Internal("Notification context incomplete before reconcile".to_string()))?;

    let write = transition_with_cas(ledger.as_ref(), order, target, Trigger::Gateway).await?;
    ctx.update(|data| {
      let (outcome, reason) = match &write {
        StatusWrite::Applied(_) => (ReconcileOutcome::Applied, None),
        StatusWrite::Unchanged(_) => (ReconcileOutcome::Unchanged, None),
        StatusWrite::Ignored(_, reason) => (ReconcileOutcome::Ignored, Some(*reason)),
      };
      data.outcome = Some(outcome);
      data.reason = reason;
      data.order = Some(write.order().clone());
    });
    Ok::<_, AppError>(StepControl::Continue)
  });

  registry.register(p);
  info!("Payment notification pipeline registered.");
}
