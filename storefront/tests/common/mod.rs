// tests/common/mod.rs
#![allow(dead_code)]

use alur::{FlowContext, FlowOutcome};
use once_cell::sync::Lazy;
use sqlx::types::Json;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

use storefront::config::AppConfig;
use storefront::errors::Result as AppResult;
use storefront::models::{Order, OrderLine, PaymentNotification, Principal, Product, ProductOption, ShippingInfo};
use storefront::pipelines::contexts::{
  CreateOrderCtxData, NotificationCtxData, OrderDraft, SettlementCtxData, SettlementRoute, ShippingCtxData,
};
use storefront::services::{CatalogStore, MemoryStore, MockGateway, OrderLedger};
use storefront::state::AppState;

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub const BUYER: &str = "buyer@example.com";
pub const OTHER_BUYER: &str = "someone.else@example.com";
pub const ADMIN: &str = "admin@example.com";

pub struct Harness {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub gateway: Arc<MockGateway>,
}

impl Harness {
  pub async fn new() -> Self {
    Self::with_config(AppConfig::default()).await
  }

  pub async fn with_config(config: AppConfig) -> Self {
    Self::with_ledger(config, None).await
  }

  /// `ledger` replaces the memory store as order ledger; the catalog stays in memory.
  pub async fn with_ledger(config: AppConfig, ledger: Option<Arc<dyn OrderLedger>>) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(MockGateway::new());
    for p in [product("p1", 10_000, 5), product("p2", 15_000, 2), product("p3", 5_000, 100)] {
      store.insert(p).await.expect("seed product");
    }

    let catalog: Arc<dyn CatalogStore> = store.clone();
    let ledger = ledger.unwrap_or_else(|| store.clone() as Arc<dyn OrderLedger>);
    let state = AppState::new(config, catalog, ledger, gateway.clone());
    Self { state, store, gateway }
  }

  pub async fn stock_of(&self, product_id: &str) -> i32 {
    CatalogStore::get(self.store.as_ref(), product_id)
      .await
      .expect("catalog read")
      .expect("product exists")
      .stock
  }

  pub async fn order(&self, order_id: Uuid) -> Order {
    self
      .state
      .ledger
      .get(order_id)
      .await
      .expect("ledger read")
      .expect("order exists")
  }

  pub async fn place_order(&self, principal: Principal, lines: Vec<OrderLine>, price: i64) -> AppResult<Order> {
    let draft = OrderDraft {
      lines,
      price,
      ..OrderDraft::default()
    };
    let ctx = FlowContext::new(CreateOrderCtxData::new(self.state.clone(), principal, draft));
    self.state.flows.run(ctx.clone()).await?;
    let order = ctx.read().order.clone();
    Ok(order.expect("completed order creation sets the order"))
  }

  pub async fn save_shipping(&self, principal: Principal, order_id: Uuid, address: &str, phone: &str) -> AppResult<Order> {
    let ctx = FlowContext::new(ShippingCtxData {
      app_state: self.state.clone(),
      principal,
      order_id,
      shipping: ShippingInfo {
        address: address.to_string(),
        phone: phone.to_string(),
        name: None,
      },
      order: None,
    });
    self.state.flows.run(ctx.clone()).await?;
    let order = ctx.read().order.clone();
    Ok(order.expect("saved shipping returns the order"))
  }

  pub async fn settle(
    &self,
    principal: Principal,
    order_id: Uuid,
    route: SettlementRoute,
  ) -> AppResult<(FlowOutcome, FlowContext<SettlementCtxData>)> {
    let ctx = FlowContext::new(SettlementCtxData::new(self.state.clone(), principal, order_id, route));
    let outcome = self.state.flows.run(ctx.clone()).await?;
    Ok((outcome, ctx))
  }

  pub async fn notify(&self, notification: PaymentNotification) -> AppResult<(FlowOutcome, FlowContext<NotificationCtxData>)> {
    let ctx = FlowContext::new(NotificationCtxData::new(self.state.clone(), notification));
    let outcome = self.state.flows.run(ctx.clone()).await?;
    Ok((outcome, ctx))
  }
}

pub fn product(id: &str, price: i64, stock: i32) -> Product {
  Product {
    id: id.to_string(),
    title: format!("Product {}", id),
    description: None,
    price,
    stock,
    category: "test".to_string(),
    options: Json(vec![ProductOption {
      title: "Large".to_string(),
      additional_price: 2_000,
    }]),
  }
}

pub fn line(product_id: &str, quantity: i32, unit_price: i64) -> OrderLine {
  OrderLine {
    product_id: product_id.to_string(),
    title: format!("Product {}", product_id),
    unit_price,
    quantity,
    option: None,
  }
}

pub fn notification(token: &str, transaction_status: &str) -> PaymentNotification {
  PaymentNotification {
    order_id: Some(token.to_string()),
    transaction_status: transaction_status.to_string(),
    ..PaymentNotification::default()
  }
}

pub fn token_for(order_id: Uuid) -> String {
  format!("ORDER__{}__1700000000000", order_id)
}
