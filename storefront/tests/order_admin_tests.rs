// tests/order_admin_tests.rs
mod common;

use alur::FlowContext;
use uuid::Uuid;

use common::*;
use storefront::errors::{AppError, Result as AppResult};
use storefront::models::{Order, OrderStatus, Principal};
use storefront::pipelines::contexts::StatusChangeCtxData;

async fn change_status(h: &Harness, principal: Principal, order_id: Uuid, requested: &str) -> AppResult<(Order, bool)> {
  let requested: OrderStatus = requested.parse().map_err(|e| AppError::Validation(format!("{}", e)))?;
  let ctx = FlowContext::new(StatusChangeCtxData {
    app_state: h.state.clone(),
    principal,
    order_id,
    requested,
    order: None,
    changed: false,
  });
  h.state.flows.run(ctx.clone()).await?;
  let (order, changed) = ctx.with(|data| (data.order.clone(), data.changed));
  Ok((order.expect("status change loads the order"), changed))
}

async fn paid_order(h: &Harness) -> Order {
  let order = h
    .place_order(Principal::customer(BUYER), vec![line("p3", 4, 5_000)], 20_000)
    .await
    .unwrap();
  h.notify(notification(&token_for(order.id), "settlement")).await.unwrap();
  order
}

#[tokio::test]
async fn admin_walks_order_through_fulfilment() {
  let h = Harness::new().await;
  let order = paid_order(&h).await;

  let (shipped, changed) = change_status(&h, Principal::admin(ADMIN), order.id, "Dikirim").await.unwrap();
  assert!(changed);
  assert_eq!(shipped.status, OrderStatus::Shipped);

  let (delivered, _) = change_status(&h, Principal::admin(ADMIN), order.id, "delivered").await.unwrap();
  assert_eq!(delivered.status, OrderStatus::Delivered);
  assert_eq!(h.order(order.id).await.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn admin_cannot_skip_lifecycle_steps() {
  let h = Harness::new().await;
  let order = h
    .place_order(Principal::customer(BUYER), vec![line("p3", 1, 5_000)], 5_000)
    .await
    .unwrap();

  let result = change_status(&h, Principal::admin(ADMIN), order.id, "shipped").await;
  assert!(matches!(result, Err(AppError::InvalidTransition(_))));
  assert_eq!(h.order(order.id).await.status, OrderStatus::AwaitingPayment);
}

#[tokio::test]
async fn admin_may_cancel_and_repeat_requests_change_nothing() {
  let h = Harness::new().await;
  let order = paid_order(&h).await;

  let (cancelled, changed) = change_status(&h, Principal::admin(ADMIN), order.id, "Dibatalkan").await.unwrap();
  assert!(changed);
  assert_eq!(cancelled.status, OrderStatus::Cancelled);

  let (_, changed) = change_status(&h, Principal::admin(ADMIN), order.id, "cancelled").await.unwrap();
  assert!(!changed);
}

#[tokio::test]
async fn customers_cannot_change_status() {
  let h = Harness::new().await;
  let order = paid_order(&h).await;

  let result = change_status(&h, Principal::customer(BUYER), order.id, "shipped").await;
  assert!(matches!(result, Err(AppError::Forbidden(_))));
  assert_eq!(h.order(order.id).await.status, OrderStatus::InProcess);
}

#[tokio::test]
async fn unknown_status_names_are_rejected() {
  let h = Harness::new().await;
  let result = change_status(&h, Principal::admin(ADMIN), Uuid::new_v4(), "lost in transit").await;
  assert!(matches!(result, Err(AppError::Validation(_))));
}
