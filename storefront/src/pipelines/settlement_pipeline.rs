// storefront/src/pipelines/settlement_pipeline.rs

//! Settling an order: either hand the buyer to the payment gateway's hosted page
//! or confirm it as cash on delivery. Both are sub-flows behind one branch step.

use alur::{Flow, FlowContext, FlowRegistry, NoMatch, StepControl};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{OrderStatus, Trigger};
use crate::pipelines::common_steps::{ensure_access, load_order, transition_with_cas, StatusWrite};
use crate::pipelines::contexts::{
  CodCtxData, CodOutcome, PaymentInitCtxData, SettlementBranch, SettlementCtxData, SettlementRoute,
};
use crate::services::gateway::{CustomerDetails, ALLOWED_PAYMENT_METHODS};
use crate::services::{token, TransactionRequest};
use crate::state::AppState;

fn build_payment_init_flow() -> Flow<PaymentInitCtxData, AppError> {
  let mut p = Flow::<PaymentInitCtxData, AppError>::new(
    "initiate_payment",
    &[
      ("load_order", false),
      ("check_payable", false),
      ("issue_token", false),
      ("request_redirect", false),
    ],
  );

  p.on("load_order", |ctx: FlowContext<PaymentInitCtxData>| async move {
    let (app_state, principal, order_id) =
      ctx.with(|data| (data.app_state.clone(), data.principal.clone(), data.order_id));
    let order = load_order(app_state.ledger.as_ref(), order_id).await?;
    ensure_access(&principal, &order)?;
    ctx.write().order = Some(order);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("check_payable", |ctx: FlowContext<PaymentInitCtxData>| async move {
    let guard = ctx.read();
    let order = guard
      .order
      .as_ref()
      .ok_or_else(|| AppError::Internal("Order not loaded before payment check".to_string()))?;
    if order.status != OrderStatus::AwaitingPayment {
      return Err(AppError::Conflict(format!(
        "Order '{}' is '{}' and no longer awaits payment",
        order.id,
        order.status.label()
      )));
    }
    if order.price <= 0 {
      return Err(AppError::Validation(format!("Order '{}' has no positive amount to pay", order.id)));
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  // A fresh token per attempt; the last one issued is what notifications must carry.
  p.on("issue_token", |ctx: FlowContext<PaymentInitCtxData>| async move {
    let (ledger, order_id) = ctx.with(|data| (data.app_state.ledger.clone(), data.order_id));
    let token = token::compose(order_id, Utc::now().timestamp_millis());
    ledger.set_external_reference(order_id, &token).await?;
    info!(%order_id, %token, "Transaction token issued.");
    ctx.write().token = Some(token);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("request_redirect", |ctx: FlowContext<PaymentInitCtxData>| async move {
    let (gateway, request) = ctx.with(|data| {
      let amount = data.order.as_ref().map(|o| o.price).unwrap_or_default();
      let request = TransactionRequest {
        token: data.token.clone().unwrap_or_default(),
        amount,
        customer: CustomerDetails::for_email(&data.principal.email),
        allowed_methods: ALLOWED_PAYMENT_METHODS.iter().map(|m| m.to_string()).collect(),
        callback_url: format!(
          "{}/success?order_id={}&method=midtrans",
          data.app_state.config.app_base_url.trim_end_matches('/'),
          data.order_id
        ),
      };
      (data.app_state.gateway.clone(), request)
    });

    let redirect = match gateway.create_transaction(&request).await {
      Ok(redirect) => redirect,
      Err(e) => {
        warn!(gateway = gateway.name(), token = %request.token, error = %e, "Gateway transaction failed; order stays awaiting payment.");
        return Err(e);
      }
    };
    info!(gateway = gateway.name(), token = %request.token, "Payment page created.");
    ctx.write().redirect_url = Some(redirect.redirect_url);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p
}

fn build_cod_flow() -> Flow<CodCtxData, AppError> {
  let mut p = Flow::<CodCtxData, AppError>::new(
    "confirm_cash_on_delivery",
    &[("load_order", false), ("check_shipping", false), ("confirm", false)],
  );

  p.on("load_order", |ctx: FlowContext<CodCtxData>| async move {
    let (app_state, principal, order_id) =
      ctx.with(|data| (data.app_state.clone(), data.principal.clone(), data.order_id));
    let order = load_order(app_state.ledger.as_ref(), order_id).await?;
    ensure_access(&principal, &order)?;
    ctx.write().order = Some(order);
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.on("check_shipping", |ctx: FlowContext<CodCtxData>| async move {
    let ready = ctx.with(|data| data.order.as_ref().is_some_and(|o| o.has_shipping_info()));
    if !ready {
      let order_id = ctx.with(|data| data.order_id);
      warn!(%order_id, "Cash on delivery requested without shipping info.");
      return Err(AppError::Validation(format!(
        "Order '{}' needs an address and phone number before cash on delivery",
        order_id
      )));
    }
    Ok::<_, AppError>(StepControl::Continue)
  });

  // Halts when the order was already confirmed so callers can tell the two apart.
  p.on("confirm", |ctx: FlowContext<CodCtxData>| async move {
    let (ledger, order) = ctx.with(|data| (data.app_state.ledger.clone(), data.order.clone()));
    let order = order.ok_or_else(|| AppError::Internal("Order not loaded before confirmation".to_string()))?;

    let write = transition_with_cas(ledger.as_ref(), order, OrderStatus::InProcess, Trigger::CashOnDelivery).await?;
    let control = match &write {
      StatusWrite::Applied(_) => StepControl::Continue,
      StatusWrite::Unchanged(_) | StatusWrite::Ignored(..) => StepControl::Halt,
    };
    ctx.update(|data| {
      data.outcome = Some(match control {
        StepControl::Continue => CodOutcome::Confirmed,
        StepControl::Halt => CodOutcome::AlreadyConfirmed,
      });
      data.order = Some(write.order().clone());
    });
    Ok::<_, AppError>(control)
  });

  p
}

pub fn register_settlement_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let payment_flow = Arc::new(build_payment_init_flow());
  let cod_flow = Arc::new(build_cod_flow());

  let mut p = Flow::<SettlementCtxData, AppError>::new("settle_order", &[("prepare_branch", false), ("settle", false)]);

  p.on("prepare_branch", |ctx: FlowContext<SettlementCtxData>| async move {
    ctx.update(|data| {
      data.branch = match data.route {
        SettlementRoute::Gateway => SettlementBranch::Gateway(FlowContext::new(PaymentInitCtxData {
          app_state: data.app_state.clone(),
          principal: data.principal.clone(),
          order_id: data.order_id,
          order: None,
          token: None,
          redirect_url: None,
        })),
        SettlementRoute::CashOnDelivery => SettlementBranch::CashOnDelivery(FlowContext::new(CodCtxData {
          app_state: data.app_state.clone(),
          principal: data.principal.clone(),
          order_id: data.order_id,
          order: None,
          outcome: None,
        })),
      };
    });
    info!(order_id = %ctx.with(|d| d.order_id), route = ?ctx.with(|d| d.route), "Settlement route prepared.");
    Ok::<_, AppError>(StepControl::Continue)
  });

  p.branch("settle")
    .arm(
      "gateway",
      |data: &SettlementCtxData| data.route == SettlementRoute::Gateway,
      payment_flow,
      |data: &SettlementCtxData| match &data.branch {
        SettlementBranch::Gateway(sub) => Ok(sub.clone()),
        _ => Err(anyhow::anyhow!("payment context was not prepared")),
      },
    )
    .arm(
      "cash_on_delivery",
      |data: &SettlementCtxData| data.route == SettlementRoute::CashOnDelivery,
      cod_flow,
      |data: &SettlementCtxData| match &data.branch {
        SettlementBranch::CashOnDelivery(sub) => Ok(sub.clone()),
        _ => Err(anyhow::anyhow!("cash-on-delivery context was not prepared")),
      },
    )
    .otherwise(NoMatch::Fail)
    .finish();

  registry.register(p);
  info!("Settlement pipeline registered.");
}
