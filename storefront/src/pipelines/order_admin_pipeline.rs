// storefront/src/pipelines/order_admin_pipeline.rs

//! Order maintenance: saving shipping details and admin status changes.

use alur::{Flow, FlowContext, FlowRegistry, StepControl};
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::Trigger;
use crate::pipelines::common_steps::{ensure_access, load_order, transition_with_cas, StatusWrite};
use crate::pipelines::contexts::{ShippingCtxData, StatusChangeCtxData};
use crate::state::AppState;

pub fn register_shipping_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut p = Flow::<ShippingCtxData, AppError>::new(
    "save_shipping",
    &[("validate_shipping", false), ("load_order", false), ("save", false)],
  );

  p.on("validate_shipping", |ctx: FlowContext<ShippingCtxData>| async move {
    ctx.update(|data| {
      let shipping = &mut data.shipping;
      shipping.address = shipping.address.trim().to_string();
      shipping.phone = shipping.phone.trim().to_string();
      if shipping.address.is_empty() || shipping.phone.is_empty() {
        return Err(AppError::Validation("Address and phone number are required".to_string()));
      }
      if shipping.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        shipping.name = None;
      }
      Ok(StepControl::Continue)
    })
  });

  p.on("load_order", |ctx: FlowContext<ShippingCtxData>| async move {
    let (app_state, principal, order_id) =
      ctx.with(|data| (data.app_state.clone(), data.principal.clone(), data.order_id));
    let order = load_order(app_state.ledger.as_ref(), order_id).await?;
    ensure_access(&principal, &order)?;
    ctx.write().order = Some(order);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("save", |ctx: FlowContext<ShippingCtxData>| async move {
    let (ledger, order_id, shipping) =
      ctx.with(|data| (data.app_state.ledger.clone(), data.order_id, data.shipping.clone()));
    let order = ledger.save_shipping(order_id, &shipping).await?;
    info!(%order_id, "Shipping info saved.");
    ctx.write().order = Some(order);
    Ok::<_, AppError>(StepControl::Continue)
  });

  registry.register(p);
  info!("Shipping pipeline registered.");
}

pub fn register_status_change_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut p = Flow::<StatusChangeCtxData, AppError>::new(
    "change_order_status",
    &[("authorize_admin", false), ("load_order", false), ("apply_status", false)],
  );

  p.on("authorize_admin", |ctx: FlowContext<StatusChangeCtxData>| async move {
    let principal = ctx.with(|data| data.principal.clone());
    if !principal.is_admin {
      warn!(principal = %principal.email, "Status change attempted by non-admin.");
      return Err(AppError::Forbidden("Only admins may change order status".to_string()));
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("load_order", |ctx: FlowContext<StatusChangeCtxData>| async move {
    let (ledger, order_id) = ctx.with(|data| (data.app_state.ledger.clone(), data.order_id));
    let order = load_order(ledger.as_ref(), order_id).await?;
    ctx.write().order = Some(order);
    Ok::<_, AppError>(StepControl::Continue)
  });

  // Written through the compare-and-set loop, so a concurrent change is re-planned.
  p.on("apply_status", |ctx: FlowContext<StatusChangeCtxData>| async move {
    let (ledger, order, requested) = ctx.with(|data| (data.app_state.ledger.clone(), data.order.clone(), data.requested));
    let order = order.ok_or_else(|| AppError::Internal("Order not loaded before status change".to_string()))?;
    let from = order.status;

    let write = transition_with_cas(ledger.as_ref(), order, requested, Trigger::Admin).await?;
    let changed = matches!(write, StatusWrite::Applied(_));
    let order = write.order().clone();
    if changed {
      info!(order_id = %order.id, %from, to = %order.status, "Order status changed by admin.");
    } else {
      info!(order_id = %order.id, status = %order.status, "Requested status already in place.");
    }
    ctx.update(|data| {
      data.order = Some(order);
      data.changed = changed;
    });
    Ok::<_, AppError>(StepControl::Continue)
  });

  registry.register(p);
  info!("Status change pipeline registered.");
}
