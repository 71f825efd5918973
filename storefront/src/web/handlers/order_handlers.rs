// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use alur::{FlowContext, FlowOutcome};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Cart, OrderStatus, Principal};
use crate::pipelines::common_steps::{ensure_access, load_order};
use crate::pipelines::contexts::{
  CodOutcome, CreateOrderCtxData, OrderDraft, SettlementCtxData, SettlementRoute, ShippingCtxData,
  StatusChangeCtxData,
};
use crate::state::AppState;
use crate::web::dto::{CreateOrderRequest, OrderView, ShippingRequest, StatusChangeRequest};

fn draft_from_request(req: CreateOrderRequest) -> Result<OrderDraft, AppError> {
  let mut lines = req.lines;
  let mut price = req.price;

  if lines.is_empty() {
    if let Some(raw) = req.cart {
      let cart = Cart::from_json(&raw.to_string())
        .map_err(|e| AppError::Validation(format!("Cart payload is not valid: {}", e)))?;
      lines = cart.to_order_lines();
      price = price.or(Some(cart.total_price()));
    }
  }

  Ok(OrderDraft {
    lines,
    price: price.unwrap_or_default(),
    name: req.name,
    address: req.address,
    phone: req.phone,
  })
}

#[instrument(
  name = "handler::create_order",
  skip(app_state, req_payload, principal),
  fields(user = %principal.email)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderRequest>,
  principal: Principal,
) -> Result<HttpResponse, AppError> {
  let draft = draft_from_request(req_payload.into_inner())?;
  info!(lines = draft.lines.len(), price = draft.price, "Order creation requested.");

  let ctx = FlowContext::new(CreateOrderCtxData::new(app_state.get_ref().clone(), principal, draft));

  match app_state.flows.run(ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let order = ctx
        .read()
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Order creation completed without an order.".to_string()))?;
      Ok(HttpResponse::Created().json(OrderView::from(order)))
    }
    Ok(FlowOutcome::Halted { step }) => {
      warn!(%step, "Create-order pipeline halted unexpectedly.");
      Err(AppError::Internal("Order creation was halted.".to_string()))
    }
    Err(app_err) => {
      warn!(error = %app_err, "Order creation failed.");
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::get_order", skip(app_state, principal), fields(user = %principal.email))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  principal: Principal,
) -> Result<HttpResponse, AppError> {
  let order = load_order(app_state.ledger.as_ref(), path.into_inner()).await?;
  ensure_access(&principal, &order)?;
  Ok(HttpResponse::Ok().json(OrderView::from(order)))
}

#[instrument(
  name = "handler::save_shipping",
  skip(app_state, req_payload, principal),
  fields(user = %principal.email)
)]
pub async fn save_shipping_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<ShippingRequest>,
  principal: Principal,
) -> Result<HttpResponse, AppError> {
  let ctx = FlowContext::new(ShippingCtxData {
    app_state: app_state.get_ref().clone(),
    principal,
    order_id: path.into_inner(),
    shipping: req_payload.into_inner(),
    order: None,
  });

  match app_state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let order = ctx
        .read()
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Shipping saved without an order.".to_string()))?;
      Ok(HttpResponse::Ok().json(OrderView::from(order)))
    }
    FlowOutcome::Halted { step } => {
      warn!(%step, "Shipping pipeline halted unexpectedly.");
      Err(AppError::Internal("Saving shipping info was halted.".to_string()))
    }
  }
}

#[instrument(
  name = "handler::change_status",
  skip(app_state, req_payload, principal),
  fields(user = %principal.email, requested = %req_payload.status)
)]
pub async fn change_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<StatusChangeRequest>,
  principal: Principal,
) -> Result<HttpResponse, AppError> {
  let requested: OrderStatus = req_payload
    .status
    .parse()
    .map_err(|e| AppError::Validation(format!("{}", e)))?;

  let ctx = FlowContext::new(StatusChangeCtxData {
    app_state: app_state.get_ref().clone(),
    principal,
    order_id: path.into_inner(),
    requested,
    order: None,
    changed: false,
  });

  match app_state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let (order, changed) = ctx.with(|data| (data.order.clone(), data.changed));
      let order = order.ok_or_else(|| AppError::Internal("Status change completed without an order.".to_string()))?;
      Ok(HttpResponse::Ok().json(json!({
        "changed": changed,
        "order": OrderView::from(order),
      })))
    }
    FlowOutcome::Halted { step } => {
      warn!(%step, "Status change pipeline halted unexpectedly.");
      Err(AppError::Internal("Status change was halted.".to_string()))
    }
  }
}

#[instrument(name = "handler::initiate_payment", skip(app_state, principal), fields(user = %principal.email))]
pub async fn initiate_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  principal: Principal,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let ctx = FlowContext::new(SettlementCtxData::new(
    app_state.get_ref().clone(),
    principal,
    order_id,
    SettlementRoute::Gateway,
  ));

  match app_state.flows.run(ctx.clone()).await {
    Ok(FlowOutcome::Completed) => {
      let redirect_url = ctx
        .with(|data| data.redirect_url())
        .ok_or_else(|| AppError::Internal("Payment initiation completed without a redirect.".to_string()))?;
      info!(%order_id, "Payment initiated.");
      Ok(HttpResponse::Ok().json(json!({ "redirect_url": redirect_url })))
    }
    Ok(FlowOutcome::Halted { step }) => {
      warn!(%order_id, %step, "Payment initiation halted unexpectedly.");
      Err(AppError::Internal("Payment initiation was halted.".to_string()))
    }
    Err(app_err) => {
      warn!(%order_id, error = %app_err, "Payment initiation failed.");
      Err(app_err)
    }
  }
}

#[instrument(name = "handler::confirm_cod", skip(app_state, principal), fields(user = %principal.email))]
pub async fn confirm_cod_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  principal: Principal,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let ctx = FlowContext::new(SettlementCtxData::new(
    app_state.get_ref().clone(),
    principal,
    order_id,
    SettlementRoute::CashOnDelivery,
  ));

  // A halt here means the order was already confirmed; both outcomes succeed.
  let outcome = app_state.flows.run(ctx.clone()).await?;
  let (cod_outcome, order) = ctx.with(|data| (data.cod_outcome(), data.order()));
  let order = order.ok_or_else(|| AppError::Internal("Cash-on-delivery finished without an order.".to_string()))?;
  let cod_outcome =
    cod_outcome.ok_or_else(|| AppError::Internal("Cash-on-delivery finished without an outcome.".to_string()))?;

  info!(%order_id, outcome = ?cod_outcome, completed = outcome.is_completed(), "Cash on delivery processed.");
  let message = match cod_outcome {
    CodOutcome::Confirmed => "Order confirmed for cash on delivery.",
    CodOutcome::AlreadyConfirmed => "Order was already confirmed.",
  };
  Ok(HttpResponse::Ok().json(json!({
    "outcome": cod_outcome,
    "message": message,
    "order": OrderView::from(order),
  })))
}
