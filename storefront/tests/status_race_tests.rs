// tests/status_race_tests.rs
mod common;

use alur::{FlowContext, FlowOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use common::*;
use storefront::config::AppConfig;
use storefront::errors::{AppError, Result as AppResult};
use storefront::models::{NewOrder, Order, OrderStatus, Principal, ShippingInfo};
use storefront::pipelines::common_steps::MAX_CAS_ATTEMPTS;
use storefront::pipelines::contexts::{CodOutcome, ReconcileOutcome, SettlementRoute, StatusChangeCtxData};
use storefront::services::{MemoryStore, OrderLedger};

/// Ledger where another writer can get in between a read and the next
/// compare-and-set.
#[derive(Default)]
struct ContendedLedger {
  inner: MemoryStore,
  /// Status a rival writer stores just before the next compare-and-set lands.
  rival: Mutex<Option<OrderStatus>>,
  always_lose: AtomicBool,
  cas_calls: AtomicUsize,
}

impl ContendedLedger {
  fn rival_writes(&self, status: OrderStatus) {
    *self.rival.lock() = Some(status);
  }
}

#[async_trait]
impl OrderLedger for ContendedLedger {
  async fn create(&self, order: NewOrder) -> AppResult<Order> {
    self.inner.create(order).await
  }

  async fn get(&self, order_id: Uuid) -> AppResult<Option<Order>> {
    self.inner.get(order_id).await
  }

  async fn compare_and_set_status(
    &self,
    order_id: Uuid,
    expected: OrderStatus,
    next: OrderStatus,
  ) -> AppResult<Option<Order>> {
    self.cas_calls.fetch_add(1, Ordering::SeqCst);
    if self.always_lose.load(Ordering::SeqCst) {
      return Ok(None);
    }
    let rival = self.rival.lock().take();
    if let Some(status) = rival {
      let won = self.inner.compare_and_set_status(order_id, expected, status).await?;
      assert!(won.is_some(), "rival write should land");
      return Ok(None);
    }
    self.inner.compare_and_set_status(order_id, expected, next).await
  }

  async fn set_external_reference(&self, order_id: Uuid, token: &str) -> AppResult<()> {
    self.inner.set_external_reference(order_id, token).await
  }

  async fn save_shipping(&self, order_id: Uuid, shipping: &ShippingInfo) -> AppResult<Order> {
    self.inner.save_shipping(order_id, shipping).await
  }
}

async fn contended_harness() -> (Harness, Arc<ContendedLedger>) {
  let ledger = Arc::new(ContendedLedger::default());
  let h = Harness::with_ledger(AppConfig::default(), Some(ledger.clone() as Arc<dyn OrderLedger>)).await;
  (h, ledger)
}

async fn fresh_order(h: &Harness) -> Order {
  h.place_order(Principal::customer(BUYER), vec![line("p1", 1, 10_000)], 10_000)
    .await
    .unwrap()
}

#[tokio::test]
async fn settlement_losing_to_a_cancel_is_ignored() {
  let (h, ledger) = contended_harness().await;
  let order = fresh_order(&h).await;
  ledger.rival_writes(OrderStatus::Cancelled);

  let (outcome, ctx) = h.notify(notification(&token_for(order.id), "settlement")).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(ctx.read().outcome, Some(ReconcileOutcome::Ignored));
  assert_eq!(ledger.cas_calls.load(Ordering::SeqCst), 1);
  assert_eq!(h.order(order.id).await.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn cash_on_delivery_losing_to_settlement_is_already_confirmed() {
  let (h, ledger) = contended_harness().await;
  let order = fresh_order(&h).await;
  h.save_shipping(Principal::customer(BUYER), order.id, "Jl. Merdeka 1", "08123456789")
    .await
    .unwrap();
  ledger.rival_writes(OrderStatus::InProcess);

  let (outcome, ctx) = h
    .settle(Principal::customer(BUYER), order.id, SettlementRoute::CashOnDelivery)
    .await
    .unwrap();

  assert_eq!(outcome, FlowOutcome::Halted { step: "settle".to_string() });
  assert_eq!(ctx.read().cod_outcome(), Some(CodOutcome::AlreadyConfirmed));
  assert_eq!(h.order(order.id).await.status, OrderStatus::InProcess);
}

#[tokio::test]
async fn admin_change_racing_a_cancel_does_not_revive_the_order() {
  let (h, ledger) = contended_harness().await;
  let order = fresh_order(&h).await;
  h.notify(notification(&token_for(order.id), "settlement")).await.unwrap();
  ledger.rival_writes(OrderStatus::Cancelled);

  let ctx = FlowContext::new(StatusChangeCtxData {
    app_state: h.state.clone(),
    principal: Principal::admin(ADMIN),
    order_id: order.id,
    requested: OrderStatus::Shipped,
    order: None,
    changed: false,
  });
  let result = h.state.flows.run(ctx.clone()).await;

  assert!(matches!(result, Err(AppError::InvalidTransition(_))));
  assert!(!ctx.read().changed);
  assert_eq!(h.order(order.id).await.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn persistent_contention_gives_up_with_conflict() {
  let (h, ledger) = contended_harness().await;
  let order = fresh_order(&h).await;
  ledger.always_lose.store(true, Ordering::SeqCst);

  let result = h.notify(notification(&token_for(order.id), "settlement")).await;

  assert!(matches!(result, Err(AppError::Conflict(_))));
  assert_eq!(ledger.cas_calls.load(Ordering::SeqCst), MAX_CAS_ATTEMPTS);
  assert_eq!(h.order(order.id).await.status, OrderStatus::AwaitingPayment);
}
